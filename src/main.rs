use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubedeck_k8s::{KubeClient, KubeError};
use kubedeck_tui::{Controller, ControllerConfig, EventHandler, Message, Settings, Tui, render};
use kubedeck_types::{AppError, Severity};

/// Kubedeck - browse Kubernetes contexts, namespaces, pods and deployments,
/// and tail container logs
#[derive(Parser, Debug)]
#[command(name = "kubedeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kubeconfig to read and update (default: $KUBECONFIG, then ~/.kube/config)
    #[arg(long, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Number of historical log lines to fetch when tailing a pod
    #[arg(long)]
    tail_lines: Option<i64>,

    /// Length of each watch window in seconds
    #[arg(long, value_name = "SECS")]
    watch_timeout: Option<u32>,

    /// Settings file (default: <config dir>/kubedeck/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Tracing filter directives
    #[arg(long, default_value = "info")]
    log_filter: String,
}

impl Args {
    /// Command-line values win over the settings file
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.kubeconfig {
            settings.kubeconfig = Some(path.clone());
        }
        if let Some(tail_lines) = self.tail_lines {
            settings.tail_lines = tail_lines;
        }
        if let Some(secs) = self.watch_timeout {
            settings.watch_timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref(), &args.log_filter)?;

    let mut settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    // Run the application
    let result = run_app(settings).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// The terminal belongs to the UI, so diagnostics go to a file or nowhere
fn init_tracing(log_file: Option<&Path>, filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }

    Ok(())
}

async fn run_app(settings: Settings) -> Result<()> {
    let (client, startup_error) = connect(&settings).await;

    // Initialize TUI
    let mut tui = Tui::new().context("failed to initialise terminal")?;
    let size = tui.size().context("failed to read terminal size")?;

    let mut controller = Controller::new(client, ControllerConfig::from(&settings), size);
    if let Some(err) = startup_error {
        controller.raise(err);
    }
    controller.init().await;

    // Initialize event handler
    let mut events = EventHandler::new(settings.tick_rate());

    while controller.is_running() {
        tui.terminal()
            .draw(|frame| render(frame, &mut controller))
            .context("failed to draw")?;

        let message = tokio::select! {
            event = events.next() => match event {
                Some(event) => Message::from(event),
                None => break,
            },
            message = controller.next_message() => message,
        };

        controller.update(message).await;
    }

    info!("shutting down");
    controller.shutdown().await;
    events.shutdown().await;
    tui.restore().context("failed to restore terminal")?;

    Ok(())
}

/// Connect to the current context, or fall back to an offline client and
/// the banner explaining why
async fn connect(settings: &Settings) -> (KubeClient, Option<AppError>) {
    let timeout = settings.watch_timeout_secs;

    let Some(path) = settings.kubeconfig_path() else {
        let reason = "no kubeconfig found; pass --kubeconfig or set $KUBECONFIG";
        return (
            KubeClient::offline(PathBuf::new(), timeout, reason),
            Some(AppError::new(Severity::Fatal, reason)),
        );
    };

    match KubeClient::connect(path.clone(), timeout).await {
        Ok(client) => (client, None),
        Err(err) => {
            let severity = match err {
                KubeError::ReadKubeconfig { .. } => Severity::Fatal,
                _ => Severity::Error,
            };
            let banner = AppError::new(severity, "Not connected to a cluster").with_detail(&err);
            (KubeClient::offline(path, timeout, err.to_string()), Some(banner))
        }
    }
}
