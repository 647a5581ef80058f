//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use skillshare::config::ServerConfig;
use skillshare::http::{HttpServer, ServerError};
use skillshare::lifecycle::Shutdown;
use skillshare_sdk::SkillShareClient;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const INDEX_HTML: &str = "<!doctype html><title>Skill Sharing</title>";

/// A server bound to an ephemeral port, with its files in a temp dir.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServerError>>,
    pub dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn client(&self) -> SkillShareClient {
        SkillShareClient::new(&self.url("/")).unwrap()
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.dir.path().join("glossary.json")
    }

    /// Trigger shutdown and wait for `run` to return.
    pub async fn stop(self) -> (Result<(), ServerError>, TempDir) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked");
        (result, self.dir)
    }
}

/// Config pointing storage and static files into `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    let public = dir.join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), INDEX_HTML).unwrap();

    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.storage.glossary_path = dir.join("glossary.json").to_string_lossy().into_owned();
    config.static_files.root = public.to_string_lossy().into_owned();
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// Start a server with the default test config in a fresh temp dir.
pub async fn spawn_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    spawn_server_in(dir, config).await
}

/// Start a server with `config`, keeping `dir` alive for its lifetime.
pub async fn spawn_server_in(dir: TempDir, config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
        dir,
    }
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
