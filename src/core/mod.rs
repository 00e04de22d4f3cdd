//! 核心层：提示词组装、回复解析与模型回退
//!
//! 与具体供应商无关，供应商客户端位于 `infrastructure`

pub mod fallback;
pub mod prompt;
pub mod suggestions;

pub use fallback::{ChatModel, Completion, FallbackChain};
pub use prompt::{conversation_context, ChatPrompt, Role, RoleMessage};
pub use suggestions::{split_suggestions, SplitReply, SUGGESTIONS_MARKER, SUGGESTION_COUNT};
