//! Test fixtures for integration tests.

use std::time::Duration;

use chat_relay_rs::{ServerConfig, run_server};

/// A relay server running on a per-test port.
pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Start a server on the given port and wait until it accepts connections.
    ///
    /// Uploads go to a per-port directory under the system temp dir.
    pub async fn start(port: u16) -> Self {
        let upload_dir = std::env::temp_dir().join(format!("chat-relay-test-{port}"));
        tokio::spawn(async move {
            if let Err(e) = run_server(ServerConfig { port, upload_dir }).await {
                eprintln!("test server error: {e}");
            }
        });
        Self::wait_until_ready(port).await;
        Self { port }
    }

    async fn wait_until_ready(port: u16) {
        for _ in 0..100 {
            if tokio::net::TcpStream::connect(("127.0.0.1", port))
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server on port {port} did not become ready");
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    #[allow(dead_code)] // ws_url is only used by the chat flow tests
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}
