//! Staged process supervision.
//!
//! Start order is fixed: tracing sink, optional proxy, MCP server, then
//! the foreground client. Each stage is gated on the previous stage's
//! readiness; any failure after the first spawn funnels through the
//! shutdown coordinator so no orphaned children survive the run.

use std::time::Duration;
use tokio::process::Command;
use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};
use url::Url;

use devstack_core::{EffectiveConfig, Environment, ResolvedRun, Transport, is_host_only_url};

use crate::error::SupervisorError;
use crate::probe::{ProbePolicy, probe_once, wait_port};
use crate::shutdown::shutdown_all;
use crate::signal::wait_for_signal;
use crate::types::{ProcessHandle, Stage};

/// Readiness policies for the three probed gates plus the stdio grace
/// period. Overridable so tests do not sit through ~20 s deadlines.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    pub tracing: ProbePolicy,
    pub proxy: ProbePolicy,
    pub mcp_http: ProbePolicy,
    pub stdio_grace: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            tracing: ProbePolicy::tracing(),
            proxy: ProbePolicy::proxy(),
            mcp_http: ProbePolicy::mcp_http(),
            stdio_grace: Duration::from_millis(500),
        }
    }
}

/// Drives one `up` invocation: ordered startup, readiness gates, the
/// blocking wait on the client, and shutdown on every exit path.
pub struct Supervisor {
    cfg: EffectiveConfig,
    run: ResolvedRun,
    env: Environment,
    probes: ProbeSettings,
    handles: Vec<ProcessHandle>,
}

impl Supervisor {
    #[must_use]
    pub fn new(cfg: EffectiveConfig, run: ResolvedRun, env: Environment) -> Self {
        Self {
            cfg,
            run,
            env,
            probes: ProbeSettings::default(),
            handles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_probes(mut self, probes: ProbeSettings) -> Self {
        self.probes = probes;
        self
    }

    /// Run the pipeline to completion and return the orchestrator's exit
    /// code: the client's own code on a clean run, 1 on any startup
    /// failure, `128 + signo` when a shutdown signal arrives first.
    pub async fn run(mut self) -> i32 {
        let code = tokio::select! {
            res = Self::drive(&self.cfg, &self.run, &self.env, &self.probes, &mut self.handles) => {
                match res {
                    Ok(code) => code,
                    Err(e) => {
                        error!("{e}");
                        1
                    }
                }
            }
            signo = wait_for_signal() => {
                info!(signal = signo, "Received shutdown signal");
                128 + signo
            }
        };

        shutdown_all(&mut self.handles).await;
        code
    }

    async fn drive(
        cfg: &EffectiveConfig,
        run: &ResolvedRun,
        env: &Environment,
        probes: &ProbeSettings,
        handles: &mut Vec<ProcessHandle>,
    ) -> Result<i32, SupervisorError> {
        Self::start_tracing(cfg, env, probes, handles).await?;
        if cfg.proxy.active() {
            Self::start_proxy(cfg, run, env, probes, handles).await?;
        }
        Self::start_mcp_server(run, env, probes, handles).await?;
        Self::run_client(run, env, handles).await
    }

    async fn start_tracing(
        cfg: &EffectiveConfig,
        env: &Environment,
        probes: &ProbeSettings,
        handles: &mut Vec<ProcessHandle>,
    ) -> Result<(), SupervisorError> {
        let tracing_cfg = &cfg.tracing_api;
        let argv = tracing_cfg.cmd.clone().unwrap_or_else(|| {
            vec![
                "uv".to_string(),
                "run".to_string(),
                "uvicorn".to_string(),
                "src.api.api:app".to_string(),
                "--host".to_string(),
                tracing_cfg.host.clone(),
                "--port".to_string(),
                tracing_cfg.port.to_string(),
            ]
        });

        spawn(Stage::Tracing, &argv, env, handles)?;
        gate_on_port(
            Stage::Tracing,
            &tracing_cfg.host,
            tracing_cfg.port,
            &probes.tracing,
            handles,
        )
        .await
    }

    async fn start_proxy(
        cfg: &EffectiveConfig,
        run: &ResolvedRun,
        env: &Environment,
        probes: &ProbeSettings,
        handles: &mut Vec<ProcessHandle>,
    ) -> Result<(), SupervisorError> {
        let target = run
            .reverse_target
            .as_deref()
            .ok_or_else(|| SupervisorError::InvalidReverseTarget("(none)".to_string()))?;
        // Re-checked here even though resolution already validated it: the
        // target goes into the proxy's command line as a reverse-mode base.
        if !is_host_only_url(target) {
            return Err(SupervisorError::InvalidReverseTarget(target.to_string()));
        }

        let proxy_cfg = &cfg.proxy;
        let argv = proxy_cfg.cmd.clone().unwrap_or_else(|| {
            vec![
                "mitmdump".to_string(),
                "-s".to_string(),
                proxy_cfg.script.clone(),
                "--mode".to_string(),
                format!("reverse:{target}"),
                "--listen-host".to_string(),
                proxy_cfg.listen_host.clone(),
                "--listen-port".to_string(),
                proxy_cfg.listen_port.to_string(),
            ]
        });

        spawn(Stage::Proxy, &argv, env, handles)?;
        gate_on_port(
            Stage::Proxy,
            &proxy_cfg.listen_host,
            proxy_cfg.listen_port,
            &probes.proxy,
            handles,
        )
        .await
    }

    async fn start_mcp_server(
        run: &ResolvedRun,
        env: &Environment,
        probes: &ProbeSettings,
        handles: &mut Vec<ProcessHandle>,
    ) -> Result<(), SupervisorError> {
        match run.transport {
            Transport::Stdio => {
                let Some(argv) = run.server.cmd.as_ref().filter(|cmd| !cmd.is_empty()) else {
                    info!("No stdio MCP server command configured, skipping spawn");
                    return Ok(());
                };
                spawn(Stage::McpServer, argv, env, handles)?;
                // A stdio server has no socket to poll; give it a short
                // grace period, then confirm it is still alive.
                sleep(probes.stdio_grace).await;
                if let Some(handle) = handles.last_mut()
                    && let Ok(Some(status)) = handle.child.try_wait()
                {
                    return Err(SupervisorError::EarlyExit {
                        stage: Stage::McpServer,
                        status,
                    });
                }
                Ok(())
            }
            Transport::Http => {
                let url_raw =
                    run.server
                        .url
                        .as_deref()
                        .ok_or_else(|| SupervisorError::InvalidServerUrl {
                            url: "(none)".to_string(),
                            reason: "missing 'url' in server definition".to_string(),
                        })?;
                let (host, port) = endpoint_of(url_raw)?;

                if let Some(argv) = run.server.cmd.as_ref().filter(|cmd| !cmd.is_empty()) {
                    spawn(Stage::McpServer, argv, env, handles)?;
                    gate_on_port(Stage::McpServer, &host, port, &probes.mcp_http, handles).await
                } else {
                    // Externally managed server: probe only.
                    info!(%host, port, "No MCP server command configured, probing external endpoint");
                    if wait_port(&host, port, &probes.mcp_http).await {
                        Ok(())
                    } else {
                        Err(SupervisorError::ReadinessTimeout {
                            stage: Stage::McpServer,
                            host,
                            port,
                            deadline: probes.mcp_http.deadline,
                        })
                    }
                }
            }
        }
    }

    async fn run_client(
        run: &ResolvedRun,
        env: &Environment,
        handles: &mut Vec<ProcessHandle>,
    ) -> Result<i32, SupervisorError> {
        let mut argv = run.client.cmd.clone();
        argv.extend(run.client.args.iter().cloned());
        spawn(Stage::Client, &argv, env, handles)?;

        let Some(handle) = handles.last_mut() else {
            return Ok(1);
        };
        let status = handle
            .child
            .wait()
            .await
            .map_err(|e| SupervisorError::SpawnFailed {
                stage: Stage::Client,
                reason: e.to_string(),
            })?;
        info!(code = ?status.code(), "Client exited");
        // A signal-killed client has no code; report failure.
        Ok(status.code().unwrap_or(1))
    }
}

/// Spawn one stage process with the projected environment and record its
/// handle in start order.
fn spawn(
    stage: Stage,
    argv: &[String],
    env: &Environment,
    handles: &mut Vec<ProcessHandle>,
) -> Result<(), SupervisorError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(SupervisorError::EmptyCommand { stage });
    };
    let child = Command::new(program)
        .args(args)
        .envs(env)
        .spawn()
        .map_err(|e| SupervisorError::SpawnFailed {
            stage,
            reason: format!("{program}: {e}"),
        })?;
    info!(stage = %stage, pid = child.id(), command = %program, "Spawned process");
    handles.push(ProcessHandle::new(stage, child));
    Ok(())
}

/// Gate on the most recently spawned process opening `host:port`, polling
/// its liveness between attempts so a crashed process fails fast instead
/// of burning the whole deadline.
async fn gate_on_port(
    stage: Stage,
    host: &str,
    port: u16,
    policy: &ProbePolicy,
    handles: &mut [ProcessHandle],
) -> Result<(), SupervisorError> {
    let deadline = Instant::now() + policy.deadline;
    loop {
        if let Some(handle) = handles.last_mut()
            && handle.stage == stage
            && let Ok(Some(status)) = handle.child.try_wait()
        {
            return Err(SupervisorError::EarlyExit { stage, status });
        }
        if probe_once(host, port, policy.attempt_timeout).await {
            info!(stage = %stage, %host, port, "Stage is ready");
            return Ok(());
        }
        if Instant::now() >= deadline {
            warn!(stage = %stage, %host, port, "Readiness deadline elapsed");
            return Err(SupervisorError::ReadinessTimeout {
                stage,
                host: host.to_string(),
                port,
                deadline: policy.deadline,
            });
        }
        sleep(policy.interval).await;
    }
}

/// Extract the probeable host:port from an advertised server URL.
fn endpoint_of(raw: &str) -> Result<(String, u16), SupervisorError> {
    let url = Url::parse(raw).map_err(|e| SupervisorError::InvalidServerUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    let host = url
        .host_str()
        .ok_or_else(|| SupervisorError::InvalidServerUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        })?
        .to_string();
    let port = url
        .port_or_known_default()
        .ok_or_else(|| SupervisorError::InvalidServerUrl {
            url: raw.to_string(),
            reason: "missing port".to_string(),
        })?;
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_extraction() {
        assert_eq!(
            endpoint_of("http://127.0.0.1:8833/mcp").unwrap(),
            ("127.0.0.1".to_string(), 8833)
        );
        // Scheme default ports apply when none is written.
        assert_eq!(
            endpoint_of("https://tools.internal").unwrap(),
            ("tools.internal".to_string(), 443)
        );
        assert!(endpoint_of("not a url").is_err());
    }

    #[test]
    fn default_probe_settings_match_stage_deadlines() {
        let probes = ProbeSettings::default();
        assert_eq!(probes.tracing.deadline, Duration::from_secs(20));
        assert_eq!(probes.proxy.deadline, Duration::from_secs(20));
        assert_eq!(probes.mcp_http.deadline, Duration::from_secs(25));
        assert_eq!(probes.stdio_grace, Duration::from_millis(500));
    }
}
