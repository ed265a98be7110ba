//! Client for the dashboard backend HTTP API.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Reply              |
//! |--------|------------------------|--------------------|
//! | GET    | `/api/metrics`         | [`MetricsSnapshot`] |
//! | GET    | `/api/topology`        | [`TopologySnapshot`] |
//! | GET    | `/api/traffic-status`  | [`TrafficStatus`]  |
//! | GET    | `/api/start-traffic`   | [`CommandStatus`]  |
//! | GET    | `/api/stop`            | [`CommandStatus`]  |
//! | GET    | `/api/congest`         | [`CommandStatus`]  |
//! | GET    | `/api/mode/:mode`      | [`ModeChange`]     |
//! | POST   | `/api/save-charts`     | [`SavedCharts`]    |

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use sdnwatch_types::{
    CommandStatus, MetricsSnapshot, ModeChange, OperatingMode, SavedCharts, TopologySnapshot,
    TrafficStatus,
};

use crate::ClientError;

/// A rendered chart ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    /// File name the backend should use, e.g. `throughput.png`.
    pub file_name: String,
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
}

/// HTTP client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    endpoint: String,
}

impl BackendClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> BackendClientBuilder {
        BackendClientBuilder::default()
    }

    /// Base URL every path is joined onto.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the latest metrics snapshot.
    pub async fn metrics(&self) -> Result<MetricsSnapshot, ClientError> {
        self.get_json("/api/metrics").await
    }

    /// Fetch the current topology.
    pub async fn topology(&self) -> Result<TopologySnapshot, ClientError> {
        self.get_json("/api/topology").await
    }

    /// Ask whether a traffic generator is already running.
    pub async fn traffic_status(&self) -> Result<TrafficStatus, ClientError> {
        self.get_json("/api/traffic-status").await
    }

    /// Start the background traffic generator.
    pub async fn start_traffic(&self) -> Result<CommandStatus, ClientError> {
        self.get_json("/api/start-traffic").await
    }

    /// Stop the background traffic generator.
    pub async fn stop_traffic(&self) -> Result<CommandStatus, ClientError> {
        self.get_json("/api/stop").await
    }

    /// Launch the congestion-inducing UDP flows.
    pub async fn congest(&self) -> Result<CommandStatus, ClientError> {
        self.get_json("/api/congest").await
    }

    /// Switch the controller between baseline and proposed routing.
    pub async fn set_mode(&self, mode: OperatingMode) -> Result<ModeChange, ClientError> {
        self.get_json(&format!("/api/mode/{}", mode.as_str())).await
    }

    /// Upload rendered charts. The backend stores them under `results/`.
    pub async fn save_charts(&self, charts: Vec<ChartImage>) -> Result<SavedCharts, ClientError> {
        let form = build_chart_form(charts)?;
        let url = self.url("/api/save-charts");
        debug!(%url, "POST");
        let response = self.client.post(&url).multipart(form).send().await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

fn build_chart_form(charts: Vec<ChartImage>) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (idx, chart) in charts.into_iter().enumerate() {
        let part = Part::bytes(chart.png)
            .file_name(chart.file_name)
            .mime_str("image/png")
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        form = form.part(format!("file{}", idx), part);
    }
    Ok(form)
}

/// Builder for [`BackendClient`].
#[derive(Debug, Default)]
pub struct BackendClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl BackendClientBuilder {
    /// Set the backend base URL (e.g., "http://127.0.0.1:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<BackendClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(5));

        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(BackendClient { client, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_builder_defaults() {
        let client = BackendClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = BackendClient::builder()
            .endpoint("http://controller.local:5000/")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://controller.local:5000");
        assert_eq!(client.url("/api/stop"), "http://controller.local:5000/api/stop");
    }

    #[test]
    fn test_chart_form_accepts_png_parts() {
        let charts = vec![
            ChartImage {
                file_name: "throughput.png".to_string(),
                png: vec![0x89, b'P', b'N', b'G'],
            },
            ChartImage {
                file_name: "ewma.png".to_string(),
                png: vec![0x89, b'P', b'N', b'G'],
            },
        ];
        assert!(build_chart_form(charts).is_ok());
    }

    #[tokio::test]
    async fn test_metrics_request() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"throughput_baseline": 3.5, "state": "CONGESTED"}"#).await;
        let client = BackendClient::builder().endpoint(endpoint).build().unwrap();

        let metrics = client.metrics().await.unwrap();
        assert_eq!(metrics.throughput_baseline, Some(3.5));
        assert_eq!(metrics.state, Some(sdnwatch_types::BackendState::Congested));

        let request_line = server.await.unwrap();
        assert_eq!(request_line, "GET /api/metrics HTTP/1.1");
    }

    #[tokio::test]
    async fn test_set_mode_path() {
        let (endpoint, server) = serve_once("200 OK", r#"{"mode": "proposed"}"#).await;
        let client = BackendClient::builder().endpoint(endpoint).build().unwrap();

        let change = client.set_mode(OperatingMode::Proposed).await.unwrap();
        assert_eq!(change.mode, OperatingMode::Proposed);
        assert_eq!(server.await.unwrap(), "GET /api/mode/proposed HTTP/1.1");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (endpoint, _server) = serve_once("500 Internal Server Error", "{}").await;
        let client = BackendClient::builder().endpoint(endpoint).build().unwrap();

        match client.stop_traffic().await {
            Err(ClientError::Status(500)) => {}
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let (endpoint, _server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = BackendClient::builder().endpoint(endpoint).build().unwrap();

        match client.topology().await {
            Err(ClientError::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = BackendClient::builder()
            .endpoint(format!("http://{}", addr))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        match client.traffic_status().await {
            Err(ClientError::Connection(_)) | Err(ClientError::Http(_)) => {}
            other => panic!("expected connection error, got {:?}", other),
        }
    }
}
