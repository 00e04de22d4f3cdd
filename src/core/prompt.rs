//! 提示词组装
//!
//! 同一轮对话需要渲染成两种供应商格式：
//! - 单次多模态 API：整段文本 + 可选内联图片
//! - OpenAI 兼容 API：system / user / assistant 消息列表

use crate::domain::{ChatMessage, ImageAttachment, IMAGE_MARKER};

/// 一次模型调用的完整输入
#[derive(Debug, Clone, Default)]
pub struct ChatPrompt {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub image: Option<ImageAttachment>,
}

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// 渲染后的单条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMessage {
    pub role: Role,
    pub content: String,
}

impl ChatPrompt {
    pub fn new(system_prompt: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_image(mut self, image: Option<ImageAttachment>) -> Self {
        self.image = image;
        self
    }

    /// 单次 API 使用的完整文本
    pub fn single_shot_text(&self) -> String {
        format!(
            "{}\n\nPrevious conversation:\n{}\n\nשאלת המשתמש: {}",
            self.system_prompt,
            conversation_context(&self.history),
            self.message
        )
    }

    /// OpenAI 兼容 API 使用的消息列表
    ///
    /// 图片本身不会发送，只保留占位标记。
    pub fn role_messages(&self) -> Vec<RoleMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(RoleMessage {
            role: Role::System,
            content: self.system_prompt.clone(),
        });

        for turn in &self.history {
            messages.push(RoleMessage {
                role: if turn.is_user { Role::User } else { Role::Assistant },
                content: render_content(&turn.content, turn.has_image()),
            });
        }

        messages.push(RoleMessage {
            role: Role::User,
            content: render_content(&self.message, self.image.is_some()),
        });
        messages
    }
}

fn render_content(content: &str, has_image: bool) -> String {
    if has_image {
        format!("{}\n{}", content, IMAGE_MARKER)
    } else {
        content.to_string()
    }
}

/// 把历史对话渲染为 `User: ...` / `AI: ...` 文本，轮次之间空一行
pub fn conversation_context(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = if turn.is_user { "User" } else { "AI" };
            format!("{}: {}", speaker, render_content(&turn.content, turn.has_image()))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::assistant("שלום! במה אפשר לעזור?"),
            ChatMessage::user("תסביר את התרגיל").with_image("data:image/png;base64,AAAA"),
        ]
    }

    #[test]
    fn test_conversation_context() {
        let context = conversation_context(&history());
        assert_eq!(
            context,
            "AI: שלום! במה אפשר לעזור?\n\nUser: תסביר את התרגיל\n[Image uploaded]"
        );
    }

    #[test]
    fn test_empty_history_renders_empty_context() {
        assert_eq!(conversation_context(&[]), "");
    }

    #[test]
    fn test_single_shot_text_layout() {
        let prompt = ChatPrompt::new("You are a tutor", "מה זה מאזן?").with_history(history());
        let text = prompt.single_shot_text();

        assert!(text.starts_with("You are a tutor\n\nPrevious conversation:\nAI: "));
        assert!(text.ends_with("\n\nשאלת המשתמש: מה זה מאזן?"));
    }

    #[test]
    fn test_role_messages_order() {
        let image = ImageAttachment {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        };
        let prompt = ChatPrompt::new("sys", "and this one?")
            .with_history(history())
            .with_image(Some(image));
        let messages = prompt.role_messages();

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User, Role::User]);
        assert_eq!(messages[0].content, "sys");
        assert!(messages[2].content.ends_with(IMAGE_MARKER));
        assert_eq!(messages[3].content, "and this one?\n[Image uploaded]");
    }
}
