use anyhow::Result;
use clap::Parser;
use tracing::info;

use student_portal::logger::{self, LogConfig, Sanitizer};
use student_portal::{start_web_server, AppConfig, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cfg = AppConfig::parse();
    logger::init(LogConfig::for_format(cfg.log_format));
    cfg.validate()?;

    info!(
        version = VERSION,
        gemini_key = %Sanitizer::optional_key(cfg.gemini_api_key.as_deref()),
        openai_key = %Sanitizer::optional_key(cfg.openai_api_key.as_deref()),
        primary = %cfg.primary_model,
        fallback = %cfg.fallback_model,
        "starting student portal"
    );

    start_web_server(cfg).await
}
