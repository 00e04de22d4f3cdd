//! Web 服务器模块
//!
//! 提供聊天代理和学习资料目录的 HTTP API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Instrument};

use crate::application::{MaterialsService, TutorService};
use crate::config::AppConfig;
use crate::domain::{ChatReply, ChatRequest, DriveFolder, DriveItem};
use crate::errors::PortalError;
use crate::infrastructure::auth::ServiceAccountAuth;
use crate::infrastructure::drive::DriveClient;
use crate::logger::{RequestContext, Timer};
use crate::request_span;

// ==================== 状态 ====================

#[derive(Clone)]
pub struct AppState {
    pub tutor: TutorService,
    pub materials: MaterialsService,
}

impl AppState {
    /// 按配置创建全部服务
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("student-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tutor = TutorService::from_config(config, http.clone());

        let drive = match config.service_account() {
            Some((email, key)) => {
                let auth = ServiceAccountAuth::new(http.clone(), email, key, &config.google_token_uri)?;
                info!(client_email = %auth.client_email(), "drive service account configured");
                Some(DriveClient::new(http, &config.drive_base_url, Arc::new(auth)))
            }
            None => {
                warn!("GOOGLE_CLIENT_EMAIL / GOOGLE_PRIVATE_KEY not set, materials endpoints disabled");
                None
            }
        };
        let materials = MaterialsService::new(drive, &config.materials_root_folder_id);

        Ok(Self { tutor, materials })
    }
}

// ==================== 请求类型 ====================

#[derive(Deserialize)]
pub struct DriveItemsQuery {
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
}

fn parse_body(payload: Result<Json<ChatRequest>, JsonRejection>) -> Result<ChatRequest, PortalError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| PortalError::InvalidRequest(rejection.body_text()))
}

fn log_failure(error: &PortalError) {
    if error.status().is_server_error() {
        warn!(error = %error, "request failed");
    } else {
        info!(error = %error, "request rejected");
    }
}

// ==================== 处理器 ====================

/// 健康检查
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 通用聊天
async fn generic_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, PortalError> {
    let ctx = RequestContext::new();
    let _timer = Timer::new("chat.generic").with_context(&ctx);

    async move {
        let request = parse_body(payload)?;
        state.tutor.generic_chat(request).await.map(Json)
    }
    .instrument(request_span!(ctx, "/api/chat/generic"))
    .await
    .inspect_err(log_failure)
}

/// 会计助教聊天
async fn tutor_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, PortalError> {
    let ctx = RequestContext::new();
    let _timer = Timer::new("chat.tutor").with_context(&ctx);

    async move {
        let request = parse_body(payload)?;
        state.tutor.tutor_chat(request).await.map(Json)
    }
    .instrument(request_span!(ctx, "/api/chat"))
    .await
    .inspect_err(log_failure)
}

/// 课程文件夹列表
async fn list_drive_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriveFolder>>, PortalError> {
    let ctx = RequestContext::new();

    async move { state.materials.list_folders().await.map(Json) }
        .instrument(request_span!(ctx, "/api/drive-folders"))
        .await
        .inspect_err(log_failure)
}

/// 文件夹内容
async fn list_drive_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DriveItemsQuery>,
) -> Result<Json<Vec<DriveItem>>, PortalError> {
    let ctx = RequestContext::new();

    async move {
        state
            .materials
            .list_items(query.folder_id.as_deref())
            .await
            .map(Json)
    }
    .instrument(request_span!(ctx, "/api/drive-items"))
    .await
    .inspect_err(log_failure)
}

// ==================== 路由 ====================

pub fn create_router(state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat", post(tutor_chat))
        .route("/api/chat/generic", post(generic_chat))
        .route("/api/drive-folders", get(list_drive_folders))
        .route("/api/drive-items", get(list_drive_items))
        .layer(middleware)
        .with_state(state)
}

// ==================== 服务器启动 ====================

pub async fn start_web_server(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Web server started on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
    }
}
