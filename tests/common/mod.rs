//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use treemux::config::ServerConfig;
use treemux::http::HttpServer;
use treemux::lifecycle::Shutdown;
use treemux::routing::Dispatcher;

/// Serve `dispatcher` on an ephemeral port. Returns the bound address and
/// the coordinator that stops the server.
pub async fn start_server(dispatcher: Dispatcher) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ServerConfig {
        bind_address: addr.to_string(),
        request_timeout_secs: 5,
    };
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
