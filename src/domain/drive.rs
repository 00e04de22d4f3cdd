//! Study material listings
//!
//! Items are owned by the cloud drive; the portal only reshapes them.

use serde::{Deserialize, Serialize};

/// MIME type the drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Raw file entry as returned by the drive API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Item kind shown in the materials browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    File,
}

/// Entry of `GET /api/drive-items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub mime_type: String,
}

impl From<DriveFile> for DriveItem {
    fn from(file: DriveFile) -> Self {
        let kind = if file.is_folder() {
            ItemKind::Folder
        } else {
            ItemKind::File
        };
        Self {
            id: file.id,
            name: file.name,
            kind,
            mime_type: file.mime_type,
        }
    }
}

/// Entry of `GET /api/drive-folders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFolder {
    pub id: String,
    pub name: String,
    pub folder_id: String,
}

impl From<DriveFile> for DriveFolder {
    fn from(file: DriveFile) -> Self {
        Self {
            folder_id: file.id.clone(),
            id: file.id,
            name: file.name,
        }
    }
}
