use timewarp::config::Config;
use timewarp::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config_path = std::env::args().nth(1);
    let cfg = Config::load(config_path.as_deref())?;

    tracing::info!("Starting HTTP time travel proxy as {}", cfg.server_name);

    tokio::select! {
        res = server::listener::run(cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
