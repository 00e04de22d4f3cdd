//! 云盘目录客户端（Drive v3 `files.list`）

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::auth::AccessTokenSource;
use crate::domain::{DriveFile, FOLDER_MIME_TYPE};
use crate::errors::DriveError;

const PAGE_SIZE: &str = "1000";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// 单次列举最多翻页数
const MAX_PAGES: usize = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    files: Option<Vec<DriveFile>>,
    next_page_token: Option<String>,
}

/// 云盘客户端
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl DriveClient {
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// 列出 `parent` 下的直接子项，按名称排序，自动翻页
    pub async fn list_children(
        &self,
        parent: &str,
        folders_only: bool,
    ) -> Result<Vec<DriveFile>, DriveError> {
        let query = children_query(parent, folders_only);
        let token = self.tokens.access_token().await?;

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let mut params = vec![
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("orderBy", "name"),
                ("pageSize", PAGE_SIZE),
            ];
            if let Some(page) = page_token.as_deref() {
                params.push(("pageToken", page));
            }

            let response = self
                .http
                .get(format!("{}/files", self.base_url))
                .bearer_auth(&token)
                .query(&params)
                .send()
                .await
                .map_err(|e| DriveError::Api(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| DriveError::Api(e.to_string()))?;

            if !status.is_success() {
                error!(%status, body = %body, "drive files.list failed");
                return Err(DriveError::Api(api_error_message(status, &body)));
            }

            let page: FileList = serde_json::from_str(&body)
                .map_err(|e| DriveError::Api(format!("invalid files.list response: {}", e)))?;

            match page.files {
                Some(batch) => files.extend(batch),
                None if page_number == 1 => return Err(DriveError::NoFiles),
                None => {}
            }

            match page.next_page_token {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    warn!(parent = %parent, page_token = %next, "drive repeated page token, stopping");
                    break;
                }
                Some(next) if !next.is_empty() => {
                    if page_number == MAX_PAGES {
                        warn!(parent = %parent, max_pages = MAX_PAGES, "drive listing truncated");
                    }
                    page_token = Some(next);
                }
                _ => break,
            }
        }

        debug!(parent = %parent, count = files.len(), "listed drive children");
        Ok(files)
    }
}

/// 构造 `files.list` 查询条件
pub fn children_query(parent: &str, folders_only: bool) -> String {
    let parent = parent.replace('\\', "\\\\").replace('\'', "\\'");
    if folders_only {
        format!("'{}' in parents and mimeType='{}'", parent, FOLDER_MIME_TYPE)
    } else {
        format!("'{}' in parents", parent)
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_query() {
        assert_eq!(children_query("abc123", false), "'abc123' in parents");
        assert_eq!(
            children_query("abc123", true),
            "'abc123' in parents and mimeType='application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn test_children_query_escapes_quotes() {
        assert_eq!(children_query("a' or 'b", false), r"'a\' or \'b' in parents");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":404,"message":"File not found: xyz."}}"#;
        assert_eq!(
            api_error_message(reqwest::StatusCode::NOT_FOUND, body),
            "File not found: xyz."
        );
        assert_eq!(
            api_error_message(reqwest::StatusCode::BAD_GATEWAY, "oops"),
            "HTTP 502 Bad Gateway"
        );
    }
}
