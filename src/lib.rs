//! 学生门户后端
//!
//! 为前端页面提供两类能力：
//! - AI 助教聊天代理（多模态模型 + OpenAI 兼容模型回退链）
//! - 学习资料目录（云盘服务账号只读访问）
//!
//! # 架构分层
//!
//! - `domain`: 请求/响应数据结构
//! - `core`: 提示词组装、追问解析、回退链
//! - `infrastructure`: 供应商客户端、认证、Web 服务
//! - `application`: 业务编排

pub mod application;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod logger;

pub use application::{MaterialsService, TutorService, ACCOUNTING_TUTOR_PROMPT};
pub use config::AppConfig;
pub use core::{ChatModel, ChatPrompt, Completion, FallbackChain};
pub use domain::{ChatMessage, ChatReply, ChatRequest, DriveFolder, DriveItem, ImageAttachment};
pub use errors::{DriveError, PortalError, Result, UpstreamError};
pub use infrastructure::web::{create_router, start_web_server, AppState};

/// 服务版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
