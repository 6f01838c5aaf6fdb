use anyhow::Result;
use tracing_subscriber::EnvFilter;
use vid_server::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let ax = vid_server::build(&settings).await?;

    ax.listen(settings.addr()).await?;

    Ok(())
}
