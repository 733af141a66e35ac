// # syncipd - DNS A record sync daemon
//
// Thin integration layer: all sync logic lives in syncip-core.
//
// The syncipd daemon is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and building the discovery, resolver and provider clients
// 4. Running the scheduler next to the health and metrics servers until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// export DNS_ZONE_NAME=example.com
// export DNS_RECORD_NAME=home
// export CLOUDFLARE_API_TOKEN=your_token
//
// syncipd --refresh-interval 1m
// ```

mod config;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use syncip_core::scheduler::shutdown_channel;
use syncip_core::{DnsProvider, ProviderRegistry, Reconciler, Scheduler, SyncConfig, SyncMetrics};
use syncip_ip_http::HttpIpDiscovery;
use syncip_resolver::HickoryHostResolver;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Time allowed for tasks to stop after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SyncipExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncipExitCode> for ExitCode {
    fn from(code: SyncipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Everything built before the first cycle runs
struct Daemon {
    scheduler: Scheduler,
    metrics: Arc<SyncMetrics>,
    health_listener: TcpListener,
    metrics_listener: TcpListener,
}

fn main() -> ExitCode {
    let args = match config::Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors
            return if e.use_stderr() {
                SyncipExitCode::ConfigError.into()
            } else {
                SyncipExitCode::CleanShutdown.into()
            };
        }
    };

    let log_level = match config::parse_log_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncipExitCode::ConfigError.into();
        }
    };

    let config = match args.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncipExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncipExitCode::ConfigError.into();
    }

    info!("Starting syncipd daemon");
    info!(
        "Syncing {} every {:?} via {}",
        config.fqdn(),
        config.interval,
        config.provider.type_name()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncipExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let daemon = match start_daemon(config).await {
            Ok(daemon) => daemon,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return SyncipExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(daemon).await {
            error!("Daemon error: {:#}", e);
            SyncipExitCode::RuntimeError
        } else {
            SyncipExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build clients and bind listeners; any failure here is a startup error
async fn start_daemon(config: SyncConfig) -> Result<Daemon> {
    let registry = ProviderRegistry::new();
    info!("Registering Cloudflare provider");
    syncip_provider_cloudflare::register(&registry);

    let provider: Arc<dyn DnsProvider> = Arc::from(
        registry
            .create_provider(&config.provider, &config.zone_name)
            .await
            .context("failed to initialize DNS provider")?,
    );

    let discovery =
        HttpIpDiscovery::with_timeout(config.ip_service_url.clone(), config.http_timeout)
            .context("failed to build IP discovery client")?;
    let resolver = HickoryHostResolver::with_timeout(config.resolver_addr, config.resolver_timeout);
    info!("Using resolver {}", resolver.nameserver());

    let health_listener = TcpListener::bind(config.healthz_addr)
        .await
        .with_context(|| format!("failed to bind health endpoint on {}", config.healthz_addr))?;
    let metrics_listener = TcpListener::bind(config.metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on {}", config.metrics_addr))?;

    let metrics = Arc::new(SyncMetrics::new());
    let reconciler = Reconciler::new(
        Arc::new(discovery),
        Arc::new(resolver),
        provider,
        Arc::new(config),
    );

    Ok(Daemon {
        scheduler: Scheduler::new(reconciler, metrics.clone()),
        metrics,
        health_listener,
        metrics_listener,
    })
}

/// Run until a shutdown signal or an unexpected task exit
async fn run_daemon(daemon: Daemon) -> Result<()> {
    let Daemon {
        scheduler,
        metrics,
        health_listener,
        metrics_listener,
    } = daemon;
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let mut tasks = JoinSet::new();
    tasks.spawn(server::serve(
        "health endpoint",
        health_listener,
        server::health_router(),
        shutdown_rx.clone(),
    ));
    tasks.spawn(server::serve(
        "metrics endpoint",
        metrics_listener,
        server::metrics_router(metrics),
        shutdown_rx.clone(),
    ));
    tasks.spawn(async move {
        scheduler.run_until(shutdown_rx).await?;
        Ok::<(), anyhow::Error>(())
    });

    info!("Daemon initialized successfully");

    let outcome = tokio::select! {
        signal = wait_for_shutdown() => signal.map(|signal| {
            info!("Received shutdown signal: {}", signal);
        }),
        Some(joined) = tasks.join_next() => Err(match joined {
            Ok(Ok(())) => anyhow::anyhow!("daemon task exited before shutdown"),
            Ok(Err(e)) => e,
            Err(e) => anyhow::anyhow!("daemon task panicked: {}", e),
        }),
    };

    info!("Shutting down daemon");
    shutdown_tx.send_replace(true);

    let drain = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Task failed during shutdown: {:#}", e),
                Err(e) => warn!("Task panicked during shutdown: {}", e),
            }
        }
    })
    .await;

    if drain.is_err() {
        warn!("Shutdown timeout after {:?}, aborting remaining tasks", SHUTDOWN_TIMEOUT);
        tasks.abort_all();
    }

    outcome
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
