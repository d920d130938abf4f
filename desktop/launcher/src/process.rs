//! Server process manager backed by a configured command.

use crate::browser;

use sl_config::Config;
use sl_core::{
    DatabaseMode, OutputSink, PortAssignment, ProcessError, ProcessManager, ProcessResult,
};

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const ENV_WEB_PORT: &str = "SL_WEB_PORT";
pub const ENV_DATA_PORT: &str = "SL_DATA_PORT";
pub const ENV_DATABASE_MODE: &str = "SL_DATABASE_MODE";

const READY_REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

/// Runs `server.command` as a child process.
///
/// Responsibilities:
/// - Pass ports and database mode through the environment
/// - Copy the child's stdout and stderr into the output sink, line by line
/// - Poll the web port until the server answers
/// - Stop with SIGTERM first, then kill after the grace period
pub struct CommandProcessManager {
    program: Option<String>,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    ready_path: String,
    poll_interval: Duration,
    grace_period: Duration,
    browser_path: String,
    client: reqwest::Client,
    output: OutputSink,
    child: Mutex<Option<Child>>,
}

impl CommandProcessManager {
    pub fn new(config: &Config, config_dir: &Path, output: OutputSink) -> ProcessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(READY_REQUEST_TIMEOUT)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| ProcessError::other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            program: config.server.command.clone(),
            args: config.server.args.clone(),
            working_dir: config
                .server
                .working_dir
                .as_ref()
                .map(|dir| config_dir.join(dir)),
            ready_path: config.server.ready_path.clone(),
            poll_interval: Duration::from_millis(config.server.ready_poll_interval_ms),
            grace_period: config.lifecycle.stop_timeout() / 2,
            browser_path: config.launcher.browser_path.clone(),
            client,
            output,
            child: Mutex::new(None),
        })
    }

    pub async fn is_running(&self) -> bool {
        self.child.lock().await.is_some()
    }

    fn spawn(&self, ports: PortAssignment, mode: DatabaseMode) -> ProcessResult<Child> {
        let program = self.program.as_deref().ok_or(ProcessError::NotConfigured)?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args)
            .env(ENV_WEB_PORT, ports.web_port.to_string())
            .env(ENV_DATA_PORT, ports.data_port.to_string())
            .env(ENV_DATABASE_MODE, mode.as_env_value())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if let Some(stdout) = child.stdout.take() {
            self.forward(stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            self.forward(stderr);
        }

        info!(
            "Spawned server process {} with PID {:?}",
            program,
            child.id()
        );

        Ok(child)
    }

    fn forward<R>(&self, stream: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let output = self.output.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stream);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if line.last() != Some(&b'\n') {
                            line.push(b'\n');
                        }
                        // Non-UTF-8 bytes become U+FFFD; later lines are still read.
                        output.write(&String::from_utf8_lossy(&line));
                    }
                    Err(e) => {
                        warn!("Server output stream closed: {e}");
                        break;
                    }
                }
            }
        });
    }

    /// Poll until the web port answers or the child goes away.
    async fn wait_ready(&self, web_port: u16) -> ProcessResult<()> {
        let url = format!("http://127.0.0.1:{web_port}{}", self.ready_path);

        loop {
            {
                let mut guard = self.child.lock().await;
                let Some(child) = guard.as_mut() else {
                    return Err(ProcessError::other("Server process was stopped while starting"));
                };
                if let Some(status) = child.try_wait()? {
                    guard.take();
                    return Err(ProcessError::ExitedEarly {
                        status: status.to_string(),
                    });
                }
            }

            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Server answered on {url}");
                    return Ok(());
                }
                Ok(response) => debug!("Readiness check: HTTP {}", response.status()),
                Err(e) => debug!("Readiness check: {e}"),
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn terminate(&self, mut child: Child) -> ProcessResult<()> {
        let pid = child.id();

        #[cfg(unix)]
        {
            if let Some(pid) = pid {
                use nix::sys::signal::{Signal, kill};
                use nix::unistd::Pid;

                info!("Sending SIGTERM to server process {pid}");
                match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                    Ok(()) => match tokio::time::timeout(self.grace_period, child.wait()).await {
                        Ok(status) => {
                            info!("Server process exited: {}", status?);
                            return Ok(());
                        }
                        Err(_) => warn!(
                            "Server process {pid} still running after {}s, killing",
                            self.grace_period.as_secs()
                        ),
                    },
                    Err(e) => warn!("SIGTERM to server process {pid} failed: {e}"),
                }
            }
        }

        child.kill().await.map_err(|e| ProcessError::Signal {
            pid: pid.unwrap_or_default(),
            message: e.to_string(),
        })?;
        info!("Server process killed");
        Ok(())
    }
}

#[async_trait]
impl ProcessManager for CommandProcessManager {
    async fn start(&self, ports: PortAssignment, mode: DatabaseMode) -> ProcessResult<()> {
        {
            let mut guard = self.child.lock().await;
            if guard.is_some() {
                return Err(ProcessError::other("Server process is already running"));
            }
            *guard = Some(self.spawn(ports, mode)?);
        }

        self.wait_ready(ports.web_port).await
    }

    async fn stop(&self) -> ProcessResult<()> {
        let child = self.child.lock().await.take();
        match child {
            Some(child) => self.terminate(child).await,
            None => {
                debug!("Stop requested with no server process");
                Ok(())
            }
        }
    }

    async fn exit(&self) -> ProcessResult<()> {
        self.stop().await
    }

    async fn launch_browser(&self, web_port: u16) -> ProcessResult<()> {
        let url = browser::app_url(web_port, &self.browser_path);
        info!("Opening {url}");

        tokio::task::spawn_blocking(move || browser::open_url(&url))
            .await
            .map_err(|e| ProcessError::other(format!("Browser launch task failed: {e}")))?
    }
}
