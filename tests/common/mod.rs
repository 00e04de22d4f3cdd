//! 集成测试公共工具
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::{json, Value};

use student_portal::infrastructure::auth::StaticToken;
use student_portal::infrastructure::drive::DriveClient;
use student_portal::infrastructure::llm::{GeminiModel, OpenAiCompatibleModel};
use student_portal::{create_router, AppState, ChatModel, FallbackChain, MaterialsService, TutorService};

pub const GEMINI_KEY: &str = "test-gemini-key";
pub const PRIMARY: &str = "gemini-2.5-flash-lite";
pub const FALLBACK: &str = "gemma-3-12b-it";
pub const TERTIARY: &str = "gpt-4o-mini";
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

/// 启动测试服务器，返回基础地址
pub async fn spawn_app(state: AppState) -> String {
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn gemini_path(model: &str) -> String {
    format!("/models/{}:generateContent", model)
}

pub fn gemini(server: &MockServer, model: &str) -> Arc<dyn ChatModel> {
    Arc::new(GeminiModel::new(
        reqwest::Client::new(),
        server.base_url(),
        GEMINI_KEY,
        model,
    ))
}

pub fn openai(server: &MockServer) -> Arc<dyn ChatModel> {
    Arc::new(OpenAiCompatibleModel::new(
        reqwest::Client::new(),
        server.base_url(),
        "sk-test",
        TERTIARY,
    ))
}

/// Gemini 成功响应体
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Gemini 错误响应体
pub fn gemini_error(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message, "status": "UNAVAILABLE" } })
}

/// 两条链都只用 Gemini（主模型 → 备用模型）
pub fn tutor_with_gemini(server: &MockServer, delay: Duration) -> TutorService {
    let generic = FallbackChain::new(delay)
        .then(gemini(server, PRIMARY))
        .then(gemini(server, FALLBACK));
    TutorService::new(generic.clone(), generic)
}

/// 未配置云盘的资料服务
pub fn no_materials() -> MaterialsService {
    MaterialsService::new(None, "root-folder")
}

/// 使用固定令牌访问 mock 云盘
pub fn materials_with(server: &MockServer) -> MaterialsService {
    let drive = DriveClient::new(
        reqwest::Client::new(),
        server.base_url(),
        Arc::new(StaticToken("ya29.static".to_string())),
    );
    MaterialsService::new(Some(drive), "root-folder")
}

pub fn chat_state(server: &MockServer, delay: Duration) -> AppState {
    AppState {
        tutor: tutor_with_gemini(server, delay),
        materials: no_materials(),
    }
}
