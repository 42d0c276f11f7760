//! Throwaway certificate authorities and leaf certificates

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Authority {
    cert: Certificate,
    key: KeyPair,
}

fn authority(common_name: &str, issuer: Option<&Authority>) -> Authority {
    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key = KeyPair::generate().unwrap();
    let cert = match issuer {
        Some(issuer) => params.signed_by(&key, &issuer.cert, &issuer.key).unwrap(),
        None => params.self_signed(&key).unwrap(),
    };
    Authority { cert, key }
}

fn leaf(
    common_name: &str,
    names: &[&str],
    usage: ExtendedKeyUsagePurpose,
    issuer: &Authority,
) -> (Certificate, KeyPair) {
    let mut params =
        CertificateParams::new(names.iter().map(|n| n.to_string()).collect::<Vec<_>>()).unwrap();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params.extended_key_usages = vec![usage];
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    (cert, key)
}

/// Every PEM file a test node and its admin client need
pub struct TestPki {
    dir: TempDir,
    /// Root CA of the node's TLS certificate
    pub server_ca: PathBuf,
    /// Root CA followed by the intermediate CA
    pub server_ca_with_intermediate: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
    /// Node certificate issued by the intermediate, without the chain
    pub intermediate_server_cert: PathBuf,
    pub intermediate_server_key: PathBuf,
    pub client_ca: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    /// Client credentials issued by a CA the node does not trust
    pub untrusted_client_cert: PathBuf,
    pub untrusted_client_key: PathBuf,
}

impl TestPki {
    pub fn generate() -> Self {
        let dir = TempDir::new().unwrap();
        let write = |name: &str, contents: String| -> PathBuf {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).unwrap();
            path
        };

        let server_root = authority("Node Root CA", None);
        let server_intermediate = authority("Node Intermediate CA", Some(&server_root));
        let client_root = authority("Admin Client CA", None);
        let rogue_root = authority("Rogue CA", None);

        let server_names = ["127.0.0.1", "localhost"];
        let (server_cert, server_key) = leaf(
            "node",
            &server_names,
            ExtendedKeyUsagePurpose::ServerAuth,
            &server_root,
        );
        let (intermediate_cert, intermediate_key) = leaf(
            "node",
            &server_names,
            ExtendedKeyUsagePurpose::ServerAuth,
            &server_intermediate,
        );
        let (client_cert, client_key) = leaf(
            "admin",
            &["admin"],
            ExtendedKeyUsagePurpose::ClientAuth,
            &client_root,
        );
        let (rogue_cert, rogue_key) = leaf(
            "intruder",
            &["intruder"],
            ExtendedKeyUsagePurpose::ClientAuth,
            &rogue_root,
        );

        Self {
            server_ca: write("server-ca.pem", server_root.cert.pem()),
            server_ca_with_intermediate: write(
                "server-ca-bundle.pem",
                format!("{}{}", server_root.cert.pem(), server_intermediate.cert.pem()),
            ),
            server_cert: write("server.pem", server_cert.pem()),
            server_key: write("server.key", server_key.serialize_pem()),
            intermediate_server_cert: write("server-intermediate.pem", intermediate_cert.pem()),
            intermediate_server_key: write(
                "server-intermediate.key",
                intermediate_key.serialize_pem(),
            ),
            client_ca: write("client-ca.pem", client_root.cert.pem()),
            client_cert: write("client.pem", client_cert.pem()),
            client_key: write("client.key", client_key.serialize_pem()),
            untrusted_client_cert: write("intruder.pem", rogue_cert.pem()),
            untrusted_client_key: write("intruder.key", rogue_key.serialize_pem()),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
