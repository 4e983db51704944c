/// GridQuery View Server
///
/// Standalone server that lets a data-grid frontend load tables, request
/// filtered/sorted/aggregated views and edit cells over WebSocket.

use gridquery::config::ServerConfig;
use gridquery::server::run_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    run_server(config).await
}
