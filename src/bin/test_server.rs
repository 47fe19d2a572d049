// Standalone mock guidance backend with a demo passport form
//
//   cargo run --bin test-server --features test-server -- 5000
//   formaid --api-url http://127.0.0.1:5000/api help http://127.0.0.1:5000/form "#gender"

use std::net::SocketAddr;
use tracing::{Level, info};

// Include the shared test server module
include!("../../tests/test_server_app.rs");

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let app = create_app().await;

    // Parse port from args or use default
    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    info!("Mock guidance backend listening on http://{}/api", addr);
    info!("Demo form at http://{}/form", addr);

    axum::serve(listener, app).await.expect("Server failed");
}
