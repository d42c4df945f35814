use nutrichat::config::Config;
use nutrichat::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    server::run_server(config).await
}
