use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use crate::{dispatcher::CommandDispatcher, handlers::AppState, session::handle_connection};

/// Accepts clients until `shutdown` resolves, running one task per connection.
///
/// With `server.max_connections` set, a connection is only accepted once a
/// slot is free; otherwise the loop never waits on the client count.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F)
where
    F: Future<Output = ()>,
{
    let limit = state
        .settings
        .server
        .max_connections
        .map(|n| Arc::new(Semaphore::new(n)));
    let dispatcher = CommandDispatcher::new(state);
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    loop {
        let permit = match &limit {
            Some(semaphore) => tokio::select! {
                _ = &mut shutdown => break,
                permit = Arc::clone(semaphore).acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => break,
                },
            },
            None => None,
        };

        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!("Accepted connection from {}", addr);
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) = handle_connection(stream, addr.to_string(), dispatcher).await {
                            debug!("Session task for {} finished with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
        }
    }

    warn!("Shutdown requested; no longer accepting connections");
}
