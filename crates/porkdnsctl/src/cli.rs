//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use porkdns_core::config::{API_KEY_ENV, DEFAULT_TIMEOUT_SECS, SECRET_API_KEY_ENV};
use tracing::Level;

/// Reconcile Porkbun DNS records and nameservers against a declared manifest
#[derive(Debug, Parser)]
#[command(name = "porkdnsctl", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Porkbun API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Porkbun secret API key
    #[arg(long, global = true, env = SECRET_API_KEY_ENV, hide_env_values = true)]
    pub secret_api_key: Option<String>,

    /// Tracked-state file
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = "porkdns.state.json",
        env = "PORKDNS_STATE"
    )]
    pub state: PathBuf,

    /// Override the API endpoint
    #[arg(long, global = true, value_name = "URL", env = "PORKDNS_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        env = "PORKDNS_TIMEOUT_SECS"
    )]
    pub timeout_secs: u64,

    /// Set the log level
    #[arg(
        value_enum,
        long,
        global = true,
        value_name = "LEVEL",
        default_value_t = LogLevel::Info,
        env = "PORKDNS_LOG_LEVEL"
    )]
    pub log_level: LogLevel,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the credentials are accepted
    Ping,

    /// Converge remote state to a manifest
    Apply {
        /// JSON manifest with `records` and `nameservers` maps
        #[arg(long, short = 'm', value_name = "FILE")]
        manifest: PathBuf,

        /// Re-read tracked resources before applying
        #[arg(long, default_value_t = false, action)]
        refresh: bool,
    },

    /// Re-read every tracked resource from the registrar
    Refresh,

    /// Delete every tracked record and reset every tracked nameserver set
    Destroy,

    /// Replace a corrupted state file with its last good backup
    RestoreState,

    /// Adopt an existing resource into tracked state
    #[command(subcommand)]
    Import(ImportCommand),

    /// Print remote state without touching tracked state
    #[command(subcommand)]
    Show(ShowCommand),
}

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Import a DNS record
    Record {
        /// Address to track the record under
        address: String,
        /// `<domain>/<record-id>`
        id: String,
    },

    /// Import the nameserver set of a domain
    Nameservers {
        /// Address to track the set under
        address: String,
        /// Domain name
        domain: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// Show one DNS record
    Record { domain: String, id: String },

    /// Show the nameservers of a domain
    Nameservers { domain: String },
}

/// Used to set the log level
// tracing::Level does not derive ValueEnum
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_record() {
        let cli = Cli::try_parse_from([
            "porkdnsctl",
            "--state",
            "/tmp/state.json",
            "import",
            "record",
            "www",
            "example.com/106926659",
        ])
        .unwrap();

        assert_eq!(cli.global.state, PathBuf::from("/tmp/state.json"));
        match cli.command {
            Command::Import(ImportCommand::Record { address, id }) => {
                assert_eq!(address, "www");
                assert_eq!(id, "example.com/106926659");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_apply_with_global_after_subcommand() {
        let cli = Cli::try_parse_from([
            "porkdnsctl",
            "apply",
            "--manifest",
            "dns.json",
            "--refresh",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.global.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Command::Apply { refresh: true, .. }));
    }

    #[test]
    fn test_parse_restore_state() {
        let cli = Cli::try_parse_from(["porkdnsctl", "restore-state", "--state", "dns.state.json"])
            .unwrap();
        assert!(matches!(cli.command, Command::RestoreState));
        assert_eq!(cli.global.state, PathBuf::from("dns.state.json"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["porkdnsctl", "--log-level", "verbose", "ping"]).is_err());
    }
}
