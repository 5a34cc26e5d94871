// # porkdnsctl
//
// Thin command-line host for porkdns. All reconciliation logic lives in
// porkdns-core; this binary only:
//
// 1. Parses flags (with environment fallbacks)
// 2. Resolves credentials and opens a session (one ping)
// 3. Loads the tracked-state file and the manifest
// 4. Drives the ReconcileEngine and prints its report
//
// ## Example
//
// ```bash
// export PORKBUN_API_KEY=pk1_...
// export PORKBUN_SECRET_API_KEY=sk1_...
//
// porkdnsctl apply --manifest dns.json
// porkdnsctl import record www example.com/106926659
// porkdnsctl show nameservers example.com
// porkdnsctl restore-state
// ```

mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use porkdns_core::config::{Credentials, DesiredState, ProviderConfig};
use porkdns_core::engine::{ApplyReport, ReconcileEngine};
use porkdns_core::reconcile::Session;
use porkdns_core::registry::GatewayRegistry;
use porkdns_core::state::FileStateStore;
use porkdns_core::traits::NameServerReconciler;
use porkdns_core::{Error, ErrorKind};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, GlobalOptions, ImportCommand, ShowCommand};

/// Exit codes for different termination scenarios
///
/// - 0: Every resource converged
/// - 1: Configuration or setup error; nothing was changed
/// - 2: Runtime error, or at least one resource failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtlExitCode {
    Clean = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl CtlExitCode {
    /// Classify a top-level failure
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<Error>().map(Error::kind) {
            Some(ErrorKind::Setup | ErrorKind::Validation) => CtlExitCode::ConfigError,
            Some(_) => CtlExitCode::RuntimeError,
            // Errors raised by the binary itself (unreadable manifest, ...)
            None => CtlExitCode::ConfigError,
        }
    }

    fn for_report(report: &ApplyReport) -> Self {
        if report.has_failures() {
            CtlExitCode::RuntimeError
        } else {
            CtlExitCode::Clean
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.global.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CtlExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli).await {
            Ok(code) => code,
            Err(e) => {
                error!("{:#}", e);
                CtlExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

async fn run(cli: Cli) -> Result<CtlExitCode> {
    // Works on the local state file only; no credentials needed
    if matches!(cli.command, Command::RestoreState) {
        return restore_state(&cli.global).await;
    }

    let session = connect(&cli.global).await?;

    match cli.command {
        Command::Ping => {
            println!("{}: credentials accepted", session.provider_name());
            Ok(CtlExitCode::Clean)
        }
        Command::Apply { manifest, refresh } => {
            let raw = tokio::fs::read_to_string(&manifest)
                .await
                .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
            let desired = DesiredState::from_json(&raw)?;

            let engine = open_engine(&session, &cli.global).await?;
            if refresh {
                let report = engine.refresh().await?;
                print_report(&report);
                if report.has_failures() {
                    return Ok(CtlExitCode::RuntimeError);
                }
            }

            let report = engine.apply(&desired).await?;
            print_report(&report);
            Ok(CtlExitCode::for_report(&report))
        }
        Command::Refresh => {
            let report = open_engine(&session, &cli.global).await?.refresh().await?;
            print_report(&report);
            Ok(CtlExitCode::for_report(&report))
        }
        Command::Destroy => {
            let report = open_engine(&session, &cli.global).await?.destroy().await?;
            print_report(&report);
            Ok(CtlExitCode::for_report(&report))
        }
        Command::RestoreState => restore_state(&cli.global).await,
        Command::Import(ImportCommand::Record { address, id }) => {
            let engine = open_engine(&session, &cli.global).await?;
            let record = engine.import_record(&address, &id).await?;
            println!("{}: imported {}", address, record.composite_id());
            Ok(CtlExitCode::Clean)
        }
        Command::Import(ImportCommand::Nameservers { address, domain }) => {
            let engine = open_engine(&session, &cli.global).await?;
            let set = engine.import_nameservers(&address, &domain).await?;
            println!("{}: imported nameservers of {}", address, set.domain);
            Ok(CtlExitCode::Clean)
        }
        Command::Show(ShowCommand::Record { domain, id }) => {
            let record = session.records().lookup(&domain, &id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(CtlExitCode::Clean)
        }
        Command::Show(ShowCommand::Nameservers { domain }) => {
            let set = session.nameservers().read(&domain).await?;
            for ns in set.wire_order() {
                println!("{}", ns);
            }
            Ok(CtlExitCode::Clean)
        }
    }
}

/// Resolve credentials, build the gateway and ping it once
async fn connect(options: &GlobalOptions) -> Result<Session> {
    let credentials =
        Credentials::resolve(options.api_key.clone(), options.secret_api_key.clone())?;

    let config = ProviderConfig::Porkbun {
        credentials,
        base_url: options.base_url.clone(),
        timeout_secs: options.timeout_secs,
    };

    let registry = GatewayRegistry::new();
    register_gateways(&registry);
    info!("Available gateways: {:?}", registry.list_gateways());

    let gateway = registry.create_gateway(&config)?;
    info!(
        "Using {} gateway (timeout {:?})",
        gateway.provider_name(),
        Duration::from_secs(options.timeout_secs)
    );

    Ok(Session::establish(Arc::from(gateway)).await?)
}

#[cfg(feature = "porkbun")]
fn register_gateways(registry: &GatewayRegistry) {
    porkdns_provider_porkbun::register(registry);
}

#[cfg(not(feature = "porkbun"))]
fn register_gateways(_registry: &GatewayRegistry) {}

async fn restore_state(options: &GlobalOptions) -> Result<CtlExitCode> {
    let restored = FileStateStore::restore_backup(&options.state).await?;
    println!(
        "{}: restored {} tracked resource(s) from backup",
        options.state.display(),
        restored
    );
    Ok(CtlExitCode::Clean)
}

async fn open_engine(session: &Session, options: &GlobalOptions) -> Result<ReconcileEngine> {
    let store = FileStateStore::new(&options.state).await.with_context(|| {
        format!("Failed to open state file {}", options.state.display())
    })?;
    Ok(ReconcileEngine::from_session(session, Box::new(store)))
}

fn print_report(report: &ApplyReport) {
    for event in &report.events {
        println!("{}", event);
    }

    let failures = report.failures().len();
    if failures > 0 {
        println!("{} of {} resource(s) failed", failures, report.events.len());
    }
}
