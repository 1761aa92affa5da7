use anyhow::Result;

use finnews_crawler::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let config = Config::from_env();
    let app = App::initialize(config).await?;
    let stats = app.run().await?;

    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
