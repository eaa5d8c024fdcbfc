//! Dev server spawn protocol tests.
//!
//! - opting out (None) never leads to a port/pid lookup
//! - a reported port must be connectable before start() resolves
//! - a dead port is a contract violation, not a builder error
//! - at most one running instance per entrypoint
//! - stop() terminates the tracked pid

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use slipway_artifact::{File, FileBlob, Files, Lambda};
use slipway_builder::{
    allocate_port, wait_until_ready, BuildOptions, BuildResultV3, Builder, BuilderV3, DevServer,
    DevServerRegistry, Error, StartDevServerOptions,
};
use slipway_config::Config;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

fn dev_options() -> BuildOptions {
    let mut files = Files::default();
    files.insert(
        "server.js".to_string(),
        File::from(FileBlob::new("export default app;")),
    );
    BuildOptions::new(files, "server.js", "/tmp/work", Config::default()).unwrap()
}

fn lambda() -> Lambda {
    Lambda::new(Files::default(), "index.handler", "nodejs20.x")
}

/// Uses the default `start_dev_server`, i.e. always declines.
struct DecliningBuilder;

#[async_trait]
impl BuilderV3 for DecliningBuilder {
    async fn build(&self, _options: &BuildOptions) -> anyhow::Result<BuildResultV3> {
        Ok(BuildResultV3::new(lambda()))
    }
}

/// Binds a real listener before resolving, as compliant builders must.
/// Reports its own pid; the tests below never stop this one.
struct ListeningBuilder {
    listener: Mutex<Option<TcpListener>>,
}

impl ListeningBuilder {
    fn new() -> Self {
        Self {
            listener: Mutex::new(None),
        }
    }
}

#[async_trait]
impl BuilderV3 for ListeningBuilder {
    async fn build(&self, _options: &BuildOptions) -> anyhow::Result<BuildResultV3> {
        Ok(BuildResultV3::new(lambda()))
    }

    async fn start_dev_server(
        &self,
        _options: &StartDevServerOptions,
    ) -> anyhow::Result<Option<DevServer>> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        *self.listener.lock().await = Some(listener);
        Ok(Some(DevServer {
            port,
            pid: std::process::id(),
        }))
    }
}

/// Reports a port nothing listens on - a contract violation.
struct DeadPortBuilder;

#[async_trait]
impl BuilderV3 for DeadPortBuilder {
    async fn build(&self, _options: &BuildOptions) -> anyhow::Result<BuildResultV3> {
        Ok(BuildResultV3::new(lambda()))
    }

    async fn start_dev_server(
        &self,
        _options: &StartDevServerOptions,
    ) -> anyhow::Result<Option<DevServer>> {
        let port = allocate_port().await?;
        Ok(Some(DevServer {
            port,
            pid: std::process::id(),
        }))
    }
}

/// Keeps a listener alive for the handshake but hands back the pid of a
/// real child process, so stop() has something safe to terminate.
struct ChildBuilder {
    listener: Mutex<Option<TcpListener>>,
}

impl ChildBuilder {
    fn new() -> Self {
        Self {
            listener: Mutex::new(None),
        }
    }
}

#[async_trait]
impl BuilderV3 for ChildBuilder {
    async fn build(&self, _options: &BuildOptions) -> anyhow::Result<BuildResultV3> {
        Ok(BuildResultV3::new(lambda()))
    }

    async fn start_dev_server(
        &self,
        _options: &StartDevServerOptions,
    ) -> anyhow::Result<Option<DevServer>> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        *self.listener.lock().await = Some(listener);

        let child = tokio::process::Command::new("sleep").arg("30").spawn()?;
        let pid = child.id().expect("sleep child has a pid");
        Ok(Some(DevServer { port, pid }))
    }
}

#[tokio::test]
async fn declining_builder_yields_none_and_nothing_is_tracked() {
    let registry = DevServerRegistry::new();
    let builder = Builder::V3(Arc::new(DecliningBuilder));
    let options = dev_options();

    let result = registry.start(&builder, &options).await.unwrap();
    assert!(result.is_none());
    assert!(registry.get("server.js").is_none());
}

#[tokio::test]
async fn v2_builders_always_decline() {
    use slipway_builder::{BuildResultV2, BuilderV2};

    struct Static;
    #[async_trait]
    impl BuilderV2 for Static {
        async fn build(&self, _options: &BuildOptions) -> anyhow::Result<BuildResultV2> {
            Ok(BuildResultV2::new())
        }
    }

    let registry = DevServerRegistry::new();
    let builder = Builder::V2(Arc::new(Static));
    let result = registry.start(&builder, &dev_options()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn reported_port_is_connectable_before_start_resolves() {
    let registry = DevServerRegistry::new();
    let builder = Builder::V3(Arc::new(ListeningBuilder::new()));

    let server = registry
        .start(&builder, &dev_options())
        .await
        .unwrap()
        .expect("builder spawns a server");

    // start() already verified liveness; this is the caller's view.
    assert!(wait_until_ready(server.port, Duration::from_millis(500)).await);
    assert_eq!(registry.get("server.js"), Some(server));
}

#[tokio::test]
async fn dead_port_is_a_contract_violation() {
    let registry = DevServerRegistry::new();
    let builder = Builder::V3(Arc::new(DeadPortBuilder));

    let err = registry.start(&builder, &dev_options()).await.unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)), "{err}");
    assert!(registry.get("server.js").is_none());
}

#[tokio::test]
async fn second_start_for_the_same_entrypoint_is_a_caller_error() {
    let registry = DevServerRegistry::new();
    let builder = Builder::V3(Arc::new(ListeningBuilder::new()));
    let options = dev_options();

    registry.start(&builder, &options).await.unwrap();
    let err = registry.start(&builder, &options).await.unwrap_err();
    assert!(matches!(
        err,
        Error::DevServerAlreadyRunning { entrypoint } if entrypoint == "server.js"
    ));
}

#[tokio::test]
async fn spawning_onto_a_bound_port_is_a_conflict() {
    use slipway_builder::spawn_dev_command;

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let err = spawn_dev_command(
        "sleep",
        &["5".to_string()],
        std::path::Path::new("."),
        &slipway_config::Env::default(),
        port,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::DevServerPortConflict { port: p } if p == port));
}

#[tokio::test]
async fn spawn_failure_is_reported() {
    use slipway_builder::spawn_dev_command;

    let port = allocate_port().await.unwrap();
    let err = spawn_dev_command(
        "slipway-definitely-not-a-real-command",
        &[],
        std::path::Path::new("."),
        &slipway_config::Env::default(),
        port,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::DevServerSpawnFailed { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn stop_terminates_the_tracked_pid() {
    let registry = DevServerRegistry::new();
    let builder = Builder::V3(Arc::new(ChildBuilder::new()));
    let options = dev_options();

    let started = registry
        .start(&builder, &options)
        .await
        .unwrap()
        .expect("builder spawns a server");

    let stopped = registry.stop("server.js").unwrap();
    assert_eq!(stopped, Some(started));
    assert!(registry.get("server.js").is_none());

    // Stopping again is a no-op, not an error.
    assert_eq!(registry.stop("server.js").unwrap(), None);
}
