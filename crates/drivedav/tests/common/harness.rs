//! Test server harness for namespace integration tests.
//!
//! Provides a `TestServer` that builds a namespace from temporary
//! directories acting as volumes, bootstraps a self-signed certificate and
//! serves everything over HTTPS with basic auth, along with HTTP
//! convenience methods.

use drivedav::{
    tls, BasicAuth, Namespace, ServerConfig, StaticVolumeSource, VolumeDescriptor, VolumeSource,
    WebDavServer,
};
use reqwest::{Client, Method, Response, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Test credentials used by every request helper.
pub const TEST_USER: &str = "root";
pub const TEST_PASSWORD: &str = "123456!";

/// Lock request body (exclusive write lock).
const LOCK_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:lockinfo xmlns:D="DAV:">
  <D:lockscope><D:exclusive/></D:lockscope>
  <D:locktype><D:write/></D:locktype>
  <D:owner><D:href>drivedav-tests</D:href></D:owner>
</D:lockinfo>"#;

/// Test server with HTTP client and automatic cleanup.
pub struct TestServer {
    /// The running WebDAV server.
    server: WebDavServer,
    /// HTTP client for making requests.
    client: Client,
    /// Base URL for the server.
    pub base_url: String,
    /// Temporary directory holding volume roots and the certificate pair.
    temp_dir: TempDir,
}

impl TestServer {
    /// Start a server with one temporary directory per volume identifier.
    pub async fn with_volumes(identifiers: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut descriptors = Vec::new();
        for id in identifiers {
            let root = temp_dir.path().join("volumes").join(id);
            std::fs::create_dir_all(&root).expect("Failed to create volume root");
            descriptors.push(VolumeDescriptor::probed(*id, root));
        }

        Self::start(descriptors, temp_dir).await
    }

    /// Start a server with explicit descriptors (for unready/collision
    /// scenarios).
    pub async fn with_descriptors(descriptors: Vec<VolumeDescriptor>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self::start(descriptors, temp_dir).await
    }

    async fn start(descriptors: Vec<VolumeDescriptor>, temp_dir: TempDir) -> Self {
        let descriptors = StaticVolumeSource::new(descriptors)
            .discover()
            .expect("static discovery cannot fail");
        let namespace = Namespace::build(&descriptors);

        let cert = temp_dir.path().join("webdav.crt");
        let key = temp_dir.path().join("webdav.key");
        tls::ensure_server_cert(&cert, &key, "localhost").expect("Failed to bootstrap cert");
        let acceptor = tls::build_acceptor(&cert, &key).expect("Failed to build acceptor");

        let server = WebDavServer::start(
            namespace,
            BasicAuth::new(TEST_USER, TEST_PASSWORD),
            acceptor,
            ServerConfig::default(),
        )
        .await
        .expect("Failed to start WebDAV server");

        let base_url = server.url();

        // Self-signed certificate: trust nothing, verify nothing.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let test_server = Self {
            server,
            client,
            base_url,
            temp_dir,
        };

        test_server.wait_ready().await;

        test_server
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_ready(&self) {
        for _ in 0..50 {
            if let Ok(resp) = self
                .client
                .request(Method::from_bytes(b"PROPFIND").unwrap(), &self.base_url)
                .basic_auth(TEST_USER, Some(TEST_PASSWORD))
                .header("Depth", "0")
                .send()
                .await
            {
                if resp.status().is_success() || resp.status() == StatusCode::MULTI_STATUS {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready in time");
    }

    /// Build a full URL from a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The backing directory of a volume created by `with_volumes`.
    pub fn volume_root(&self, identifier: &str) -> PathBuf {
        self.temp_dir.path().join("volumes").join(identifier)
    }

    // ========== HTTP Convenience Methods ==========

    /// GET a file's contents.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET without credentials (for auth-gate tests).
    pub async fn get_unauthenticated(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET with explicit credentials.
    pub async fn get_with_credentials(&self, path: &str, user: &str, pass: &str) -> Response {
        self.client
            .get(self.url(path))
            .basic_auth(user, Some(pass))
            .send()
            .await
            .expect("GET request failed")
    }

    /// PUT file contents.
    pub async fn put(&self, path: &str, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .put(self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// PUT file contents and assert success.
    pub async fn put_ok(&self, path: &str, body: impl Into<reqwest::Body>) {
        let resp = self.put(path, body).await;
        let status = resp.status();
        assert!(
            status.is_success() || status == StatusCode::CREATED || status == StatusCode::NO_CONTENT,
            "PUT {} failed with status {}: {}",
            path,
            status,
            resp.text().await.unwrap_or_default()
        );
    }

    /// PUT with a lock token in the `If` header.
    pub async fn put_with_token(
        &self,
        path: &str,
        body: impl Into<reqwest::Body>,
        token: &str,
    ) -> Response {
        self.client
            .put(self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .header("If", format!("(<{token}>)"))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// MKCOL (create directory).
    pub async fn mkcol(&self, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"MKCOL").unwrap(), self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .send()
            .await
            .expect("MKCOL request failed")
    }

    /// PROPFIND (list directory or get properties).
    pub async fn propfind(&self, path: &str, depth: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .header("Depth", depth)
            .send()
            .await
            .expect("PROPFIND request failed")
    }

    /// PROPFIND and return body as string.
    pub async fn propfind_body(&self, path: &str, depth: &str) -> (StatusCode, String) {
        let resp = self.propfind(path, depth).await;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (status, body)
    }

    /// LOCK a resource with an exclusive write lock.
    pub async fn lock(&self, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"LOCK").unwrap(), self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .header("Depth", "0")
            .header("Timeout", "Second-3600")
            .body(LOCK_BODY)
            .send()
            .await
            .expect("LOCK request failed")
    }

    /// LOCK and return the granted lock token.
    pub async fn lock_ok(&self, path: &str) -> String {
        let resp = self.lock(path).await;
        let status = resp.status();
        assert!(
            status.is_success(),
            "LOCK {path} failed with status {status}"
        );
        lock_token(&resp).expect("LOCK response carried no Lock-Token header")
    }

    /// UNLOCK a resource.
    pub async fn unlock(&self, path: &str, token: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"UNLOCK").unwrap(), self.url(path))
            .basic_auth(TEST_USER, Some(TEST_PASSWORD))
            .header("Lock-Token", format!("<{token}>"))
            .send()
            .await
            .expect("UNLOCK request failed")
    }

    /// Stop the server explicitly (otherwise happens on drop).
    pub async fn stop(self) {
        self.server.stop().await;
    }
}

/// Extract the lock token from a LOCK response's `Lock-Token` header.
pub fn lock_token(resp: &Response) -> Option<String> {
    resp.headers()
        .get("Lock-Token")?
        .to_str()
        .ok()
        .map(|v| v.trim_matches(['<', '>']).to_string())
}
