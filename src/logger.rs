//! 日志模块 - 提供结构化日志、请求追踪和耗时记录
//!
//! 特性：
//! - 支持人类可读、紧凑单行和 JSON 三种格式
//! - 请求追踪 ID，贯穿单次请求的整个回退链
//! - API 密钥脱敏

use std::fmt;
use std::time::Instant;
use tracing::{field, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

/// 日志格式类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// 人类可读格式（带颜色）
    Pretty,
    /// 紧凑单行格式
    Compact,
    /// JSON 结构化格式（适合日志收集系统）
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// 是否启用颜色（仅 Pretty 格式有效）
    pub enable_color: bool,
    pub show_target: bool,
    pub show_file: bool,
    pub show_time: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            enable_color: true,
            show_target: true,
            show_file: false,
            show_time: true,
        }
    }
}

impl LogConfig {
    /// 指定格式，其余使用默认值
    pub fn for_format(format: LogFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - `RUST_LOG`: 日志级别过滤（如 `info`, `debug`, `student_portal=debug,tower_http=info`）
///
/// # 示例
/// ```no_run
/// use student_portal::logger::{init, LogConfig, LogFormat};
///
/// init(LogConfig::for_format(LogFormat::Json));
/// ```
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("student_portal=info,tower_http=info"));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(config.clone()))
                .fmt_fields(PrettyFields);
            subscriber.with(fmt_layer).init();
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(config.show_target)
                .with_file(config.show_file)
                .with_line_number(config.show_file)
                .with_ansi(config.enable_color);
            subscriber.with(fmt_layer).init();
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(config.show_target)
                .with_file(config.show_file)
                .with_line_number(config.show_file)
                .with_current_span(true)
                .with_span_list(true);
            subscriber.with(fmt_layer).init();
        }
    }
}

/// 请求追踪上下文
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// 请求唯一 ID
    pub request_id: String,
    /// 请求开始时间
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// 使用指定 ID 创建请求上下文
    pub fn with_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 创建带有请求 ID 的 span
#[macro_export]
macro_rules! request_span {
    ($ctx:expr, $route:expr) => {
        tracing::info_span!(
            "request",
            request_id = %$ctx.request_id,
            route = $route,
        )
    };
}

/// 耗时计时器 - drop 时记录执行时间
pub struct Timer {
    name: String,
    start: Instant,
    request_id: Option<String>,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            request_id: None,
        }
    }

    /// 关联到请求上下文
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.request_id = Some(ctx.request_id.clone());
        self
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;

        match &self.request_id {
            Some(req_id) => {
                tracing::info!(
                    target: "metrics",
                    request_id = %req_id,
                    operation = %self.name,
                    elapsed_ms = %format!("{:.2}", elapsed_ms),
                    "operation completed"
                );
            }
            None => {
                tracing::info!(
                    target: "metrics",
                    operation = %self.name,
                    elapsed_ms = %format!("{:.2}", elapsed_ms),
                    "operation completed"
                );
            }
        }
    }
}

/// 敏感信息脱敏工具
pub struct Sanitizer;

impl Sanitizer {
    /// 脱敏 API 密钥 - 只保留前 6 位和后 4 位
    pub fn api_key(key: &str) -> String {
        if key.chars().count() <= 16 {
            return "***".to_string();
        }
        let head: String = key.chars().take(6).collect();
        let tail: String = key.chars().skip(key.chars().count() - 4).collect();
        format!("{}...{}", head, tail)
    }

    /// 可选密钥的展示形式
    pub fn optional_key(key: Option<&str>) -> String {
        match key {
            Some(k) if !k.is_empty() => Self::api_key(k),
            _ => "<unset>".to_string(),
        }
    }
}

/// 自定义美观格式器
pub struct PrettyFormatter {
    config: LogConfig,
}

impl PrettyFormatter {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }
}

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if self.config.show_time {
            write!(writer, "{} ", chrono::Local::now().to_rfc3339())?;
        }

        let level = event.metadata().level();
        if self.config.enable_color {
            match *level {
                Level::ERROR => write!(writer, "\x1b[31m[ERROR]\x1b[0m ")?,
                Level::WARN => write!(writer, "\x1b[33m[WARN]\x1b[0m ")?,
                Level::INFO => write!(writer, "\x1b[32m[INFO]\x1b[0m ")?,
                Level::DEBUG => write!(writer, "\x1b[34m[DEBUG]\x1b[0m ")?,
                Level::TRACE => write!(writer, "\x1b[35m[TRACE]\x1b[0m ")?,
            }
        } else {
            write!(writer, "[{}] ", level)?;
        }

        if self.config.show_target {
            write!(writer, "{} ", event.metadata().target())?;
        }

        if self.config.show_file {
            if let Some(file) = event.metadata().file() {
                write!(writer, "({}", file)?;
                if let Some(line) = event.metadata().line() {
                    write!(writer, ":{}", line)?;
                }
                write!(writer, ") ")?;
            }
        }

        // 当前 span 链（request_id 等字段）
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                if self.config.enable_color {
                    write!(writer, "\x1b[90m{}\x1b[0m ", span.name())?;
                } else {
                    write!(writer, "{} ", span.name())?;
                }
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// 自定义字段格式化
pub struct PrettyFields;

impl FormatFields<'_> for PrettyFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: Writer<'_>,
        fields: R,
    ) -> std::fmt::Result {
        let mut visitor = FieldVisitor {
            writer,
            result: Ok(()),
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct FieldVisitor<'a> {
    writer: Writer<'a>,
    result: std::fmt::Result,
}

impl field::Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.result = write!(self.writer, "{:?}", value);
        } else {
            self.result = write!(self.writer, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &field::Field, value: &str) {
        if field.name() == "message" {
            self.result = write!(self.writer, "{}", value);
        } else {
            self.result = write!(self.writer, " {}={}", field.name(), value);
        }
    }

    fn record_u64(&mut self, field: &field::Field, value: u64) {
        self.result = write!(self.writer, " {}={}", field.name(), value);
    }

    fn record_bool(&mut self, field: &field::Field, value: bool) {
        self.result = write!(self.writer, " {}={}", field.name(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_request_context() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.request_id.len(), 36);

        let ctx = RequestContext::with_id("req-123");
        assert_eq!(ctx.request_id, "req-123");
    }

    #[test]
    fn test_sanitizer_api_key() {
        let key = "AIzaSyA1b2C3d4E5f6G7h8I9j0KlmnOP";
        let sanitized = Sanitizer::api_key(key);
        assert!(sanitized.starts_with("AIzaSy"));
        assert!(sanitized.ends_with("mnOP"));
        assert!(sanitized.contains("..."));

        assert_eq!(Sanitizer::api_key("short"), "***");
        assert_eq!(Sanitizer::optional_key(None), "<unset>");
    }

    #[test]
    fn test_timer_with_context() {
        let ctx = RequestContext::with_id("req-1");
        let timer = Timer::new("chat.generic").with_context(&ctx);
        assert_eq!(timer.request_id.as_deref(), Some("req-1"));
        assert_eq!(timer.name, "chat.generic");
    }
}
