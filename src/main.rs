use anyhow::Result;
use scan_tutor::utils::logging;
use scan_tutor::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    logging::init(config.verbose_logging);

    let stats = App::initialize(config).await?.run().await?;
    if stats.failed > 0 {
        tracing::warn!("⚠️ 有 {} 个扫描文本处理失败", stats.failed);
    }

    Ok(())
}
