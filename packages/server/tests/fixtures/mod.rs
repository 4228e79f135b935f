//! Shared test harness: a coordinator running on a background task.

#![allow(dead_code)]

use std::time::Duration;

use tokio::net::TcpStream;

pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Start a coordinator on the given port and wait until it accepts
    /// connections. Each test uses its own fixed port so tests can run in
    /// parallel.
    pub async fn start(port: u16) -> Self {
        tokio::spawn(async move {
            if let Err(e) = banter_server::run_server("127.0.0.1", port).await {
                eprintln!("test server on port {port} failed: {e}");
            }
        });

        for _ in 0..100 {
            if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
                return Self { port };
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("test server did not start listening on port {port}");
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}
