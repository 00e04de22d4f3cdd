//! 学习资料目录服务

use tracing::info;

use crate::domain::{DriveFolder, DriveItem};
use crate::errors::{DriveError, PortalError, Result};
use crate::infrastructure::drive::DriveClient;

/// 学习资料目录
#[derive(Clone)]
pub struct MaterialsService {
    drive: Option<DriveClient>,
    root_folder_id: String,
}

impl MaterialsService {
    /// `drive` 为 `None` 表示服务账号未配置
    pub fn new(drive: Option<DriveClient>, root_folder_id: impl Into<String>) -> Self {
        Self {
            drive,
            root_folder_id: root_folder_id.into(),
        }
    }

    fn drive(&self) -> Result<&DriveClient> {
        self.drive
            .as_ref()
            .ok_or(PortalError::Drive(DriveError::MissingCredentials))
    }

    /// 资料根目录下的课程文件夹
    pub async fn list_folders(&self) -> Result<Vec<DriveFolder>> {
        let files = self.drive()?.list_children(&self.root_folder_id, true).await?;
        info!(count = files.len(), "listed material folders");
        Ok(files.into_iter().map(DriveFolder::from).collect())
    }

    /// 指定文件夹下的全部条目
    pub async fn list_items(&self, folder_id: Option<&str>) -> Result<Vec<DriveItem>> {
        let folder_id = folder_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PortalError::MissingFolderId)?;

        let files = self.drive()?.list_children(folder_id, false).await?;
        Ok(files.into_iter().map(DriveItem::from).collect())
    }
}
