//! 服务账号认证
//!
//! 用服务账号私钥签发 RS256 JWT，向令牌端点换取访问令牌（JWT bearer grant），
//! 并在过期前缓存令牌。

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::errors::DriveError;

/// 只读云盘权限
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// 断言有效期（秒）
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// 令牌在到期前多少秒视为失效
const EXPIRY_MARGIN_SECS: i64 = 60;

/// 访问令牌来源
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, DriveError>;
}

/// 固定令牌（本地调试和测试用）
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, DriveError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// 服务账号凭据
pub struct ServiceAccountAuth {
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    scope: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// 从客户端邮箱和 PEM 私钥创建
    ///
    /// 环境变量里的私钥通常把换行写成字面量 `\n`，这里会还原。
    pub fn new(
        http: reqwest::Client,
        client_email: impl Into<String>,
        private_key: &str,
        token_uri: impl Into<String>,
    ) -> Result<Self, DriveError> {
        let pem = private_key.replace("\\n", "\n");
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| DriveError::Auth(format!("invalid private key: {}", e)))?;

        Ok(Self {
            client_email: client_email.into(),
            encoding_key,
            token_uri: token_uri.into(),
            scope: DRIVE_READONLY_SCOPE.to_string(),
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// 签发换取令牌用的断言
    pub fn signed_assertion(&self, now: i64) -> Result<String, DriveError> {
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| DriveError::Auth(format!("failed to sign assertion: {}", e)))
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, DriveError> {
        let assertion = self.signed_assertion(now)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "token exchange rejected");
            return Err(DriveError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::Auth(format!("invalid token response: {}", e)))?;

        debug!(expires_in = token.expires_in, "obtained drive access token");
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, DriveError> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken("ya29.test".into());
        assert_eq!(source.access_token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn test_rejects_garbage_key() {
        let result = ServiceAccountAuth::new(
            reqwest::Client::new(),
            "svc@example.iam.gserviceaccount.com",
            "not a key",
            "https://oauth2.googleapis.com/token",
        );
        assert!(matches!(result, Err(DriveError::Auth(_))));
    }
}
