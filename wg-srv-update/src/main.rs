mod config;
mod error;
mod lookup;
mod tunnel;

use std::io::Write;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use shared::types::Endpoint;
use crate::config::{Cli, Settings, Verbosity};
use crate::error::ReconcileError;
use crate::lookup::{Fallback, HickorySrvSource, SrvSource};
use crate::tunnel::{Outcome, TunnelControl, WgControl};

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.directive()))
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load(Cli::parse())?;
    init_tracing(settings.verbosity);

    let zone = settings.zone.as_deref().ok_or_else(|| anyhow!("No zone specified!"))?;

    // Checked before any lookup so a bad fallback never hides behind a good SRV answer
    let fallback = Fallback::from_setting(settings.fallback.as_deref())
        .context("Cannot parse fallback endpoint")?;

    if settings.interface.is_none() {
        tracing::info!("No WireGuard interface specified, performing (dry-run) lookup only.");
    }

    let endpoint = match HickorySrvSource::from_system_conf() {
        Ok(source) => discover(&source, zone, fallback).await?,
        Err(e) => {
            tracing::error!("Cannot create DNS resolver: {}", e);
            fallback_or_fail(fallback)?
        }
    };

    let backend = settings.backend;
    apply_endpoint(
        settings.interface.as_deref(),
        &endpoint,
        settings.json,
        || WgControl::connect(backend),
        &mut std::io::stdout().lock(),
    )
    .await?;

    Ok(())
}

/// Print the endpoint when no interface is given, otherwise reconcile the
/// interface against it. The control handle is only opened in the latter case.
async fn apply_endpoint<C, F, W>(
    interface: Option<&str>,
    endpoint: &Endpoint,
    json: bool,
    connect: F,
    out: &mut W,
) -> Result<()>
where
    C: TunnelControl,
    F: FnOnce() -> Result<C, ReconcileError>,
    W: Write,
{
    let Some(interface) = interface else {
        print_dry_run(endpoint, json, out)?;
        tracing::info!("Dry run completed.");
        return Ok(());
    };

    tracing::info!("Reconfiguring interface {}...", interface);
    match tunnel::reconcile(connect, interface, endpoint).await {
        Ok(Outcome::NoChange) => {
            tracing::info!("Interface {} already points at {}", interface, endpoint);
        }
        Ok(Outcome::Updated { from, to }) => {
            let from = from.map(|addr| addr.to_string()).unwrap_or_else(|| "none".to_string());
            tracing::info!("Peer endpoint on {} changed from {} to {}", interface, from, to);
        }
        Err(e) => {
            tracing::error!(
                "Error reconfiguring interface {} with endpoint {}: {}",
                interface,
                endpoint,
                e
            );
            return Err(e).with_context(|| format!("Failed to reconfigure interface {}", interface));
        }
    }

    Ok(())
}

/// SRV lookup with fallback substitution
async fn discover<S: SrvSource>(
    source: &S,
    zone: &str,
    fallback: Option<Fallback>,
) -> Result<Endpoint> {
    tracing::info!("Looking up WireGuard endpoint for {:?}...", zone);
    match lookup::resolve(source, zone).await {
        Ok(endpoint) => {
            tracing::info!("Retrieved WireGuard endpoint: {}", endpoint);
            Ok(endpoint)
        }
        Err(e) => {
            tracing::error!("Error during SRV lookup: {}", e);
            fallback_or_fail(fallback)
        }
    }
}

fn fallback_or_fail(fallback: Option<Fallback>) -> Result<Endpoint> {
    match fallback {
        Some(Fallback(endpoint)) => {
            tracing::info!("Using fallback: {}", endpoint);
            Ok(endpoint)
        }
        None => Err(anyhow!("No fallback provided.")),
    }
}

fn print_dry_run<W: Write>(endpoint: &Endpoint, json: bool, out: &mut W) -> Result<()> {
    if json {
        let line = serde_json::to_string(endpoint).context("Failed to serialize endpoint")?;
        writeln!(out, "{}", line)?;
    } else {
        writeln!(out, "{}", endpoint)?;
    }
    Ok(())
}
