//! Mutual TLS client for the participation API

use anyhow::{Context, Result};
use channeld::constants::urls;
use channeld::types::JoinBySnapshotRequest;
use reqwest::{header, Certificate, Client, Identity, Response};
use rustls::pki_types::CertificateDer;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AdminClient {
    base_url: String,
    http: Client,
}

impl AdminClient {
    /// Client trusting only `ca_certs` and authenticating with `identity`
    pub fn new(
        node_address: &str,
        ca_certs: &[CertificateDer<'static>],
        identity: Identity,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .connect_timeout(CONNECT_TIMEOUT)
            .identity(identity);
        for cert in ca_certs {
            builder = builder.add_root_certificate(
                Certificate::from_der(cert.as_ref()).context("adding ca-file PEM to cert pool")?,
            );
        }

        Ok(Self {
            base_url: format!("https://{}", node_address),
            http: builder.build().context("building HTTPS client")?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn join(&self, config_block: Vec<u8>) -> reqwest::Result<Response> {
        let url = self.url(urls::CHANNELS);
        debug!("POST {} ({} bytes)", url, config_block.len());
        self.http
            .post(url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(config_block)
            .send()
            .await
    }

    pub async fn list_all_channels(&self) -> reqwest::Result<Response> {
        self.get(urls::CHANNELS).await
    }

    pub async fn list_single_channel(&self, channel_id: &str) -> reqwest::Result<Response> {
        self.get(&urls::channel_url(channel_id)).await
    }

    pub async fn remove(&self, channel_id: &str) -> reqwest::Result<Response> {
        let url = self.url(&urls::channel_url(channel_id));
        debug!("DELETE {}", url);
        self.http.delete(url).send().await
    }

    pub async fn join_by_snapshot(&self, snapshot_path: &str) -> reqwest::Result<Response> {
        let url = self.url(urls::SNAPSHOT_JOIN);
        debug!("POST {} ({})", url, snapshot_path);
        self.http
            .post(url)
            .json(&JoinBySnapshotRequest {
                snapshot_path: snapshot_path.to_string(),
            })
            .send()
            .await
    }

    pub async fn join_by_snapshot_status(&self) -> reqwest::Result<Response> {
        self.get(urls::SNAPSHOT_STATUS).await
    }

    async fn get(&self, path: &str) -> reqwest::Result<Response> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.http.get(url).send().await
    }
}
