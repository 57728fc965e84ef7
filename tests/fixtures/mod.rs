//! Shared fixtures for integration tests.

use std::time::Duration;

use dealer_assist_rs::ui::{ServerConfig, run_with_config};

/// A test server running the real application on a dedicated port.
///
/// Each test uses its own port so tests can run in parallel.
pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Spawn the server in the background.
    pub fn start(port: u16) -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            anthropic_api_key: None,
        };
        tokio::spawn(async move {
            if let Err(e) = run_with_config(config).await {
                eprintln!("Test server error: {e}");
            }
        });
        Self { port }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://127.0.0.1:{}{}", self.port, path)
    }

    /// Wait until the health endpoint answers.
    pub async fn ready(&self) {
        let client = reqwest::Client::new();
        let url = format!("{}/api/health", self.base_url());
        for _ in 0..100 {
            if let Ok(response) = client.get(&url).send().await
                && response.status().is_success()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Test server on port {} did not become ready", self.port);
    }
}
