//! Chat request and reply shapes exchanged with the browser

use serde::{Deserialize, Serialize};

use super::section_action::SectionAction;

/// One prior turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatMessage {
    /// A turn written by the student
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
            image: None,
        }
    }

    /// A turn written by the tutor
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether the turn carried an attachment
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// Body of `POST /api/chat` and `POST /api/chat/generic`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Ordinance reader action; wraps `message` in a fixed question template
    #[serde(default)]
    pub action: Option<SectionAction>,
}

impl ChatRequest {
    /// Drop empty fields so that `""` behaves like a missing value.
    ///
    /// Whitespace is content: `"   "` is still forwarded to the model.
    pub fn normalized(mut self) -> Self {
        self.message = self.message.filter(|m| !m.is_empty());
        self.image = self.image.filter(|i| !i.is_empty());
        self.system_prompt = self.system_prompt.filter(|p| !p.is_empty());
        if let (Some(action), Some(message)) = (self.action, self.message.as_ref()) {
            self.message = Some(action.question(message));
        }
        self
    }
}

/// Successful chat reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_questions: Option<Vec<String>>,
}
