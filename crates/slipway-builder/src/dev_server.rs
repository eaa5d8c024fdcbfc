//! The dev server spawn protocol.
//!
//! A version-3 builder may run a long-lived local process in place of
//! exporting a function artifact. The handshake is small: `Some(DevServer
//! { port, pid })` on success, `None` to opt out, a rejected call on
//! failure. The orchestrator proxies matching requests to the port and
//! terminates the process via the pid; *when* to terminate (shutdown,
//! rebuild invalidation, idle timeout) is the orchestrator's policy, not
//! part of the contract.
//!
//! [`DevServerRegistry`] is the orchestrator-side bookkeeping: it verifies
//! the reported port is actually accepting connections before trusting it,
//! and tracks at most one running instance per entrypoint.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use slipway_config::Env;
use tokio::net::{TcpListener, TcpStream};

use crate::contract::Builder;
use crate::error::{Error, Result};
use crate::options::StartDevServerOptions;

/// How long the registry waits for a freshly-reported port to accept
/// connections before declaring the builder non-compliant.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

const PROBE_INTERVAL: Duration = Duration::from_millis(50);

/// A running dev server: the handshake value a builder returns.
///
/// The port is assumed reachable on the local host. The pid is what the
/// orchestrator uses to shut the process down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevServer {
    pub port: u16,
    pub pid: u32,
}

/// Tracks running dev servers, one per entrypoint at most.
#[derive(Debug, Default)]
pub struct DevServerRegistry {
    running: Mutex<HashMap<String, DevServer>>,
}

impl DevServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the builder for a dev server for this entrypoint.
    ///
    /// Returns `Ok(None)` when the builder opts out; the caller falls back
    /// to the packaged-function execution path and must not attempt any
    /// port or pid lookup. On `Some`, the reported port is probed until it
    /// accepts a connection; a server that reported success without a live
    /// listener is a contract violation, surfaced distinctly from a
    /// builder error.
    ///
    /// Calls are issued one at a time per entrypoint; starting a second
    /// server before stopping the first is a caller error.
    pub async fn start(
        &self,
        builder: &Builder,
        options: &StartDevServerOptions,
    ) -> Result<Option<DevServer>> {
        let entrypoint = options.entrypoint.clone();
        if self.get(&entrypoint).is_some() {
            return Err(Error::DevServerAlreadyRunning { entrypoint });
        }

        let Some(server) = builder.start_dev_server(options).await? else {
            tracing::debug!(entrypoint = %entrypoint, "builder declined to spawn a dev server");
            return Ok(None);
        };

        if !wait_until_ready(server.port, READY_TIMEOUT).await {
            return Err(Error::ContractViolation(format!(
                "dev server for `{entrypoint}` reported port {} but nothing is listening",
                server.port
            )));
        }

        tracing::info!(
            entrypoint = %entrypoint,
            port = server.port,
            pid = server.pid,
            "dev server running"
        );
        self.running
            .lock()
            .expect("dev server registry poisoned")
            .insert(entrypoint, server);
        Ok(Some(server))
    }

    /// The running server for an entrypoint, if any.
    pub fn get(&self, entrypoint: &str) -> Option<DevServer> {
        self.running
            .lock()
            .expect("dev server registry poisoned")
            .get(entrypoint)
            .copied()
    }

    /// Stop the tracked server for an entrypoint by terminating its pid.
    /// Returns the handshake value of the stopped server, or `None` when
    /// nothing was running.
    pub fn stop(&self, entrypoint: &str) -> Result<Option<DevServer>> {
        let removed = self
            .running
            .lock()
            .expect("dev server registry poisoned")
            .remove(entrypoint);

        if let Some(server) = removed {
            terminate(server.pid)?;
            tracing::info!(entrypoint = %entrypoint, pid = server.pid, "dev server stopped");
            return Ok(Some(server));
        }
        Ok(None)
    }

    /// Stop every tracked server. Termination errors are logged, not
    /// propagated: shutdown keeps going.
    pub fn stop_all(&self) {
        let drained: Vec<(String, DevServer)> = {
            let mut running = self.running.lock().expect("dev server registry poisoned");
            running.drain().collect()
        };
        for (entrypoint, server) in drained {
            if let Err(err) = terminate(server.pid) {
                tracing::warn!(
                    entrypoint = %entrypoint,
                    pid = server.pid,
                    error = %err,
                    "failed to terminate dev server"
                );
            }
        }
    }
}

#[cfg(unix)]
fn terminate(pid: u32) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|errno| Error::Io(std::io::Error::from_raw_os_error(errno as i32)))
}

#[cfg(not(unix))]
fn terminate(pid: u32) -> Result<()> {
    tracing::warn!(pid, "dev server termination by pid is not supported on this platform");
    Ok(())
}

/// Probe `127.0.0.1:port` until it accepts a connection or the timeout
/// elapses. Builders should use this to block `start_dev_server` until
/// their child's listener is ready, and the registry uses it to verify
/// the handshake.
pub async fn wait_until_ready(port: u16, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(_) => return true,
            Err(_) if tokio::time::Instant::now() < deadline => {
                tokio::time::sleep(PROBE_INTERVAL).await;
            }
            Err(_) => return false,
        }
    }
}

/// Reserve an ephemeral port on the loopback interface.
///
/// The listener is dropped before returning, so a race with another
/// process is possible but unlikely; builders that cannot tolerate it
/// should bind the port themselves and pass it to their child directly.
pub async fn allocate_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    Ok(listener.local_addr()?.port())
}

/// Spawn a dev command as a detached child, handing it the chosen port
/// via the `PORT` environment variable.
///
/// Refuses to spawn when `port` is already bound by another listener
/// ([`Error::DevServerPortConflict`]): the child would either fail to
/// bind or the orchestrator would proxy to the wrong process. The caller
/// is expected to follow up with [`wait_until_ready`] before resolving
/// its `start_dev_server` call.
pub async fn spawn_dev_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &Env,
    port: u16,
) -> Result<DevServer> {
    if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
        return Err(Error::DevServerPortConflict { port });
    }

    let child = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env.iter())
        .env("PORT", port.to_string())
        .spawn()
        .map_err(|source| Error::DevServerSpawnFailed { source })?;

    let pid = child
        .id()
        .ok_or_else(|| Error::DevServerSpawnFailed {
            source: std::io::Error::other("child exited before a pid could be observed"),
        })?;

    tracing::debug!(program, pid, port, "spawned dev command");
    // The child is intentionally left running when the handle drops; the
    // orchestrator owns termination via the pid.
    Ok(DevServer { port, pid })
}
