use std::path::{Path, PathBuf};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::{ENV_CONFIG, ENV_FALLBACK, ENV_IFACE, ENV_ZONE};

/// Point a WireGuard peer at the endpoint advertised in DNS SRV records.
#[derive(Debug, Parser)]
#[command(name = "wg-srv-update", version)]
pub struct Cli {
    /// Zone to query for _wireguard._udp SRV records
    #[arg(short = 'z', long, env = ENV_ZONE)]
    pub zone: Option<String>,

    /// WireGuard interface to (re)configure; omit for a dry-run lookup
    #[arg(short = 'i', long = "interface", env = ENV_IFACE)]
    pub interface: Option<String>,

    /// Fallback endpoint (host:port), configured when lookup fails
    #[arg(long, env = ENV_FALLBACK)]
    pub fallback: Option<String>,

    /// Verbose output (use multiple times to get debug output)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// TOML file providing defaults for the options above
    #[arg(short = 'c', long, env = ENV_CONFIG)]
    pub config: Option<String>,

    /// WireGuard implementation backing the interface
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Print the dry-run result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Kernel,
    Userspace,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub interface: InterfaceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupConfig {
    pub zone: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceConfig {
    pub name: Option<String>,
    #[serde(default)]
    pub backend: BackendKind,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

/// Diagnostic level selected with `-v`. Never affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Warn,
    Info,
    Debug,
}

impl Verbosity {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Warn,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }

    /// Filter directive scoped to this crate
    pub fn directive(self) -> String {
        let level = match self {
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        };
        format!("wg_srv_update={}", level)
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub zone: Option<String>,
    pub interface: Option<String>,
    pub fallback: Option<String>,
    pub backend: BackendKind,
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Settings {
    /// Flags and environment win over the file. Empty values count as unset.
    pub fn merge(file: FileConfig, cli: Cli) -> Self {
        Self {
            zone: non_empty(cli.zone).or_else(|| non_empty(file.lookup.zone)),
            interface: non_empty(cli.interface).or_else(|| non_empty(file.interface.name)),
            fallback: non_empty(cli.fallback).or_else(|| non_empty(file.lookup.fallback)),
            backend: cli.backend.unwrap_or(file.interface.backend),
            verbosity: Verbosity::from_count(cli.verbose),
            json: cli.json,
        }
    }

    pub fn load(cli: Cli) -> Result<Self> {
        let file = match non_empty(cli.config.clone()).map(PathBuf::from) {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, cli))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
