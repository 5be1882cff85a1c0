use bot_server::{BotServer, Config};
use bot_server::utils::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("Order notification bot starting...");

    let config = Config::from_env();
    let server = BotServer::initialize(config)?;
    server.run().await?;

    Ok(())
}
