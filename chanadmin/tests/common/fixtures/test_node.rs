//! A channeld admin endpoint running in-process on an ephemeral port

use channeld::web::tls::server_config_from_pem;
use channeld::web::{AdminServer, AppState};
use channeld::{ChannelManager, FileLedgerManager, LocalMembership};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::oneshot;

use super::pki::TestPki;

const MAX_BODY: usize = 1024 * 1024;

pub struct TestNode {
    pub address: SocketAddr,
    pub manager: ChannelManager,
    ledger_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestNode {
    /// Node presenting the certificate issued by the server root CA
    pub async fn start(pki: &TestPki) -> Self {
        Self::start_with_certificate(pki, &pki.server_cert, &pki.server_key).await
    }

    pub async fn start_with_certificate(pki: &TestPki, cert: &Path, key: &Path) -> Self {
        let tls_config = server_config_from_pem(
            &std::fs::read(cert).unwrap(),
            &std::fs::read(key).unwrap(),
            &[std::fs::read(&pki.client_ca).unwrap()],
        )
        .unwrap();

        let ledger_dir = TempDir::new().unwrap();
        let ledgers = FileLedgerManager::new(ledger_dir.path().join("ledgers"))
            .await
            .unwrap();
        let manager = ChannelManager::new(
            Arc::new(ledgers),
            Arc::new(LocalMembership::new()),
            Arc::new(|_: &str| {}),
        );

        let server = AdminServer::bind_with_tls(
            "127.0.0.1:0",
            tls_config,
            AppState::new(Arc::new(manager.clone()), MAX_BODY),
        )
        .await
        .unwrap();
        let address = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server.serve_with_shutdown(async move {
            let _ = rx.await;
        }));

        Self {
            address,
            manager,
            ledger_dir,
            shutdown: Some(tx),
        }
    }

    /// Scratch space on the node's filesystem
    pub fn scratch_dir(&self) -> PathBuf {
        self.ledger_dir.path().join("scratch")
    }

    /// Connection flags for an admin trusting `ca_file` and presenting `cert`/`key`
    pub fn flags(&self, ca_file: &Path, cert: &Path, key: &Path) -> Vec<OsString> {
        vec![
            "--node-address".into(),
            self.address.to_string().into(),
            "--ca-file".into(),
            ca_file.into(),
            "--client-cert".into(),
            cert.into(),
            "--client-key".into(),
            key.into(),
        ]
    }

    /// Connection flags of the legitimate admin
    pub fn admin_flags(&self, pki: &TestPki) -> Vec<OsString> {
        self.flags(&pki.server_ca, &pki.client_cert, &pki.client_key)
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
