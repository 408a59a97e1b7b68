use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::proxy::TimeTravelProxy;

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!(
        "Listening on {} (target date {}, closest-snapshot lookup {})",
        cfg.listen_addr,
        cfg.target_date,
        if cfg.lookup_closest_snapshot { "on" } else { "off" }
    );

    let proxy = Arc::new(TimeTravelProxy::new(cfg)?);
    serve(listener, proxy).await
}

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, proxy: Arc<TimeTravelProxy>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Error accepting connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let proxy = proxy.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, proxy);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
