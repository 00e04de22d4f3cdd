//! 标准化错误处理
//!
//! 定义门户服务的错误类型，以及它们对应的 HTTP 状态码和面向用户的提示文本。
//! 聊天相关的提示使用希伯来语（前端直接展示），资料目录相关的提示保持英文。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 上游模型调用错误
///
/// `Display` 用于日志，[`UpstreamError::localized`] 用于返回给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// 网络失败、非 2xx 且无法解析出错误信息
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// 供应商明确拒绝了图片输入
    #[error("provider rejected the input image")]
    ImageRejected,

    /// 供应商返回的错误信息
    #[error("provider error: {0}")]
    Provider(String),

    /// 响应体不是合法 JSON
    #[error("malformed response body")]
    MalformedBody,

    /// JSON 结构缺少必要字段
    #[error("unexpected response structure")]
    UnexpectedShape,

    /// 文本为空
    #[error("empty response text")]
    EmptyResponse,
}

impl UpstreamError {
    /// 翻译为前端展示的提示
    pub fn localized(&self) -> String {
        match self {
            UpstreamError::Unavailable(_) => "שגיאה בתקשורת עם מנוע ה-AI".to_string(),
            UpstreamError::ImageRejected => {
                "הקובץ ששלחת אינו נתמך על ידי המנוע. העלה תמונה בפורמט JPG/PNG/WEBP/GIF במקום קבצים כמו PDF."
                    .to_string()
            }
            UpstreamError::Provider(message) => format!("שגיאת AI: {}", message),
            UpstreamError::MalformedBody => "התקבלה תשובה לא תקינה מהשרת".to_string(),
            UpstreamError::UnexpectedShape => "מבנה התשובה מה-AI אינו תקין".to_string(),
            UpstreamError::EmptyResponse => "לא התקבלה תשובה מהשרת".to_string(),
        }
    }
}

/// 云盘目录服务错误
#[derive(Error, Debug)]
pub enum DriveError {
    /// 服务账号未配置
    #[error("missing service account credentials")]
    MissingCredentials,

    /// 凭据换取访问令牌失败
    #[error("token exchange failed: {0}")]
    Auth(String),

    /// Drive API 请求失败
    #[error("drive request failed: {0}")]
    Api(String),

    /// 响应中没有 files 字段
    #[error("no files in drive response")]
    NoFiles,
}

/// 门户主要错误类型
#[derive(Error, Debug)]
pub enum PortalError {
    /// 消息和图片都缺失
    #[error("message or image is required")]
    MissingInput,

    /// 通用聊天缺少 system prompt
    #[error("system prompt is required")]
    MissingSystemPrompt,

    /// 图片不是 base64 data URL
    #[error("image is not a base64 data URL")]
    MalformedImage,

    /// 图片 MIME 类型不在允许列表内
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    /// 请求体无法解析
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 服务端配置错误
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 模型调用失败（回退链耗尽后的最后一个错误）
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// 缺少 folderId 查询参数
    #[error("folder id is required")]
    MissingFolderId,

    /// 云盘目录错误
    #[error("drive error: {0}")]
    Drive(#[from] DriveError),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl PortalError {
    /// HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::MissingInput
            | PortalError::MissingSystemPrompt
            | PortalError::MalformedImage
            | PortalError::UnsupportedImageType(_)
            | PortalError::InvalidRequest(_)
            | PortalError::MissingFolderId => StatusCode::BAD_REQUEST,
            PortalError::Drive(DriveError::NoFiles) => StatusCode::NOT_FOUND,
            PortalError::Configuration(_) | PortalError::Upstream(_) | PortalError::Drive(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回给调用方的错误体
    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            PortalError::MissingInput => ("נדרשת הודעה או תמונה".to_string(), None),
            PortalError::MissingSystemPrompt => ("נדרש system prompt".to_string(), None),
            PortalError::MalformedImage => (
                "קובץ התמונה אינו בפורמט נתמך. אנא העלה תמונה (JPG/PNG/WEBP/GIF).".to_string(),
                None,
            ),
            PortalError::UnsupportedImageType(_) => (
                "סוג הקובץ אינו נתמך. אנא העלה תמונה בפורמט JPG/PNG/WEBP/GIF (לא PDF).".to_string(),
                None,
            ),
            PortalError::InvalidRequest(_) => ("בקשה לא תקינה".to_string(), None),
            PortalError::Configuration(_) => ("שגיאת תצורה בשרת".to_string(), None),
            PortalError::Upstream(err) => (err.localized(), None),
            PortalError::MissingFolderId => ("Folder ID is required".to_string(), None),
            PortalError::Drive(DriveError::MissingCredentials) => (
                "Configuration error".to_string(),
                Some("Missing environment variables".to_string()),
            ),
            PortalError::Drive(DriveError::NoFiles) => ("No files found".to_string(), None),
            PortalError::Drive(err @ DriveError::Auth(_)) | PortalError::Drive(err @ DriveError::Api(_)) => {
                ("Drive API error".to_string(), Some(err.to_string()))
            }
        };
        ErrorBody { error, details }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// 项目结果类型别名
pub type Result<T> = std::result::Result<T, PortalError>;
