// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight ones

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop on `listener` until `shutdown` is notified.
///
/// After shutdown the listener is closed first, so no new connection is
/// admitted while the active ones get up to the connection timeout to finish.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_info(&format!("Stopped accepting connections on {local_addr}"));
                break;
            }
        }
    }

    drop(listener);

    let performance = &state.config.performance;
    let grace = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));
    drain_connections(&active_connections, grace).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::server::create_reusable_listener;
    use std::sync::atomic::Ordering;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn roundtrip(addr: std::net::SocketAddr, raw_request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        // A rejected connection may be reset under us; the bytes read so far tell
        let _ = stream.write_all(raw_request.as_bytes()).await;
        let mut response = Vec::new();
        let _ = stream.read_to_end(&mut response).await;
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_over_tcp_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let state = Arc::new(AppState::new(&config).unwrap());
        let listener = create_reusable_listener(config.get_socket_addr().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let active = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run(
            listener,
            state,
            Arc::clone(&active),
            Arc::clone(&shutdown),
        ));

        let response = roundtrip(
            addr,
            "GET /add/2/3 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.ends_with("2 + 3 = 5"), "{response}");

        let response = roundtrip(
            addr,
            "GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
        assert!(response.ends_with("Hello World"), "{response}");

        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server stops")
            .unwrap()
            .unwrap();
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_excess() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.performance.max_connections = Some(0);
        let state = Arc::new(AppState::new(&config).unwrap());
        let listener = create_reusable_listener(config.get_socket_addr().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(run(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&shutdown),
        ));

        let response = roundtrip(
            addr,
            "GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.is_empty(), "{response}");

        shutdown.notify_one();
        server.await.unwrap().unwrap();
    }
}
