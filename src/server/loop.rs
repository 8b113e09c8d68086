// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the action service
///
/// Runs until `shutdown` is notified. The listener is closed first so no new
/// connections arrive, then in-flight connections get up to
/// `performance.write_timeout` seconds to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
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

            _ = shutdown.notified() => {
                logger::log_info("Shutdown requested, closing listener");
                break;
            }
        }
    }

    drop(listener);

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    drain_connections(&active_connections, grace).await;
    Ok(())
}

/// Wait for the connection counter to reach zero, up to `grace`
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_info("All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {remaining} connection(s) still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::bind_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_state(max_connections: Option<u64>) -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/kopi-config").unwrap();
        cfg.logging.access_log = false;
        cfg.performance.max_connections = max_connections;
        cfg.performance.write_timeout = 2;
        Arc::new(AppState::new(&cfg))
    }

    async fn raw_post(addr: std::net::SocketAddr, path: &str, body: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_action_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let listener = bind_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
                let addr = listener.local_addr().unwrap();
                let shutdown = Arc::new(Notify::new());
                let counter = Arc::new(AtomicUsize::new(0));

                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    test_state(None),
                    Arc::clone(&counter),
                    Arc::clone(&shutdown),
                ));

                let event = r#"{"actionGroup":"coffee","apiPath":"/stock","httpMethod":"GET","parameters":[{"name":"item","value":"Latte"}]}"#;
                let response = raw_post(addr, "/invoke", event).await;
                assert!(response.starts_with("HTTP/1.1 200 OK"), "got: {response}");
                assert!(response.contains(r#"\"item\":\"Latte\""#));
                assert!(response.contains(r#""httpStatusCode":200"#));

                let response = raw_post(addr, "/invoke", "[oops").await;
                assert!(response.starts_with("HTTP/1.1 400"), "got: {response}");

                shutdown.notify_one();
                server.await.unwrap().unwrap();
                assert_eq!(counter.load(Ordering::SeqCst), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_rejects_over_connection_limit() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let listener = bind_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
                let addr = listener.local_addr().unwrap();
                let shutdown = Arc::new(Notify::new());
                let counter = Arc::new(AtomicUsize::new(0));

                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    test_state(Some(0)),
                    Arc::clone(&counter),
                    Arc::clone(&shutdown),
                ));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                let mut buf = Vec::new();
                let read = stream.read_to_end(&mut buf).await.unwrap_or(0);
                assert_eq!(read, 0);
                assert_eq!(counter.load(Ordering::SeqCst), 0);

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
