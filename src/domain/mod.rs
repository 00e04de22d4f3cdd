//! Domain Layer
//!
//! Transient request/response shapes; nothing here is persisted

pub mod chat;
pub mod drive;
pub mod image;
pub mod section_action;

pub use chat::{ChatMessage, ChatReply, ChatRequest};
pub use drive::{DriveFile, DriveFolder, DriveItem, ItemKind, FOLDER_MIME_TYPE};
pub use image::{ImageAttachment, ALLOWED_IMAGE_TYPES, IMAGE_MARKER};
pub use section_action::SectionAction;
