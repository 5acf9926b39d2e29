// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing.
//!
//! Exactly one mode flag is required:
//!
//! - `-d <discoveryServerUrl>`: discovery report
//! - `-b <serverUrl>`: walk the Objects folder
//! - `-g <serverUrl> <item>`: read one value
//! - `-s <serverUrl> <item> <value>`: write one value

use std::time::Duration;

use clap::{ArgGroup, Parser};
use uaprobe_opcua::{NodeId, OpcUaConfig, SecurityMode, SecurityPolicy, DEFAULT_MAX_DEPTH};

use crate::error::BinResult;

/// Usage text printed when no arguments are given.
pub const USAGE: &str = "\
simple opc/ua client test routines
-d discoveryServer-Url - search for opc/ua Servers with discoveryServer.
-b Server-Url - list all Items from Server.
-g Server-Url ItemName - get Value of Item.
-s Server-Url ItemName Value - set Value of Item.
";

// =============================================================================
// Main CLI Structure
// =============================================================================

/// uaprobe - simple opc/ua client test routines
#[derive(Parser, Debug)]
#[command(
    name = "uaprobe",
    author = "Sylvex <contact@sylvex.io>",
    version = crate::VERSION,
    about = "simple opc/ua client test routines",
    long_about = None,
    group(ArgGroup::new("mode").required(true).args(["discover", "browse", "get", "set"]))
)]
pub struct Cli {
    /// Search for OPC UA servers with a discovery server
    #[arg(short = 'd', long, value_name = "DISCOVERY_URL")]
    pub discover: Option<String>,

    /// List all items below the Objects folder
    #[arg(short = 'b', long, value_name = "SERVER_URL")]
    pub browse: Option<String>,

    /// Get the value of an item
    #[arg(short = 'g', long, num_args = 2, value_names = ["SERVER_URL", "ITEM"])]
    pub get: Option<Vec<String>>,

    /// Set the value of an item
    #[arg(short = 's', long, num_args = 3, value_names = ["SERVER_URL", "ITEM", "VALUE"])]
    pub set: Option<Vec<String>>,

    /// Output format for browse, get and set
    #[arg(short = 'o', long, default_value = "tsv")]
    pub output: OutputFormat,

    /// Browse depth ceiling
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Message security mode (none, sign, sign-and-encrypt)
    #[arg(long, default_value = "none", env = "UAPROBE_SECURITY_MODE")]
    pub security_mode: SecurityMode,

    /// Security policy (None, Basic256Sha256, ...)
    #[arg(long, default_value = "none", env = "UAPROBE_SECURITY_POLICY")]
    pub security_policy: SecurityPolicy,

    /// User name for session activation (anonymous when absent)
    #[arg(short = 'u', long, env = "UAPROBE_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for session activation
    #[arg(short = 'p', long, env = "UAPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "10", env = "UAPROBE_TIMEOUT")]
    pub timeout: u64,

    /// PKI directory for client and trusted server certificates
    #[arg(long, default_value = "./pki", env = "UAPROBE_PKI_DIR")]
    pub pki_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "UAPROBE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "UAPROBE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

// =============================================================================
// Mode
// =============================================================================

/// The operation selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Discovery report against a discovery server.
    Discover {
        /// Discovery server URL.
        url: String,
    },
    /// Walk the Objects folder.
    Browse {
        /// Server URL.
        url: String,
    },
    /// Read one value.
    Get {
        /// Server URL.
        url: String,
        /// Item node id text.
        item: String,
    },
    /// Write one value.
    Set {
        /// Server URL.
        url: String,
        /// Item node id text.
        item: String,
        /// Value text.
        value: String,
    },
}

impl Mode {
    /// Returns the command name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Discover { .. } => "discover",
            Self::Browse { .. } => "browse",
            Self::Get { .. } => "get",
            Self::Set { .. } => "set",
        }
    }

    /// Returns the server or discovery URL.
    pub fn url(&self) -> &str {
        match self {
            Self::Discover { url }
            | Self::Browse { url }
            | Self::Get { url, .. }
            | Self::Set { url, .. } => url,
        }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab separated lines
    #[default]
    Tsv,
    /// One JSON object per line
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Returns the selected mode.
    ///
    /// Clap enforces that exactly one mode flag is present and that each
    /// carries its full argument count.
    pub fn mode(&self) -> Option<Mode> {
        if let Some(url) = &self.discover {
            return Some(Mode::Discover { url: url.clone() });
        }
        if let Some(url) = &self.browse {
            return Some(Mode::Browse { url: url.clone() });
        }
        if let Some([url, item]) = self.get.as_deref() {
            return Some(Mode::Get {
                url: url.clone(),
                item: item.clone(),
            });
        }
        if let Some([url, item, value]) = self.set.as_deref() {
            return Some(Mode::Set {
                url: url.clone(),
                item: item.clone(),
                value: value.clone(),
            });
        }
        None
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Builds the client configuration for `endpoint`.
    pub fn opcua_config(&self, endpoint: &str) -> BinResult<OpcUaConfig> {
        let mut builder = OpcUaConfig::builder()
            .endpoint(endpoint)
            .security_mode(self.security_mode)
            .security_policy(self.security_policy)
            .request_timeout(Duration::from_secs(self.timeout))
            .pki_dir(self.pki_dir.clone());

        builder = match (&self.username, &self.password) {
            (Some(user), Some(password)) => builder.username(user.clone(), password.clone()),
            _ => builder.anonymous(),
        };

        Ok(builder.build()?)
    }
}

/// Parses an item argument into a node id.
pub fn parse_item(item: &str) -> BinResult<NodeId> {
    Ok(item.parse::<NodeId>()?)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_discover_mode() {
        let cli = Cli::parse_from(["uaprobe", "-d", "opc.tcp://lds:4840"]);
        assert_eq!(
            cli.mode(),
            Some(Mode::Discover {
                url: "opc.tcp://lds:4840".into()
            })
        );
    }

    #[test]
    fn test_browse_mode() {
        let cli = Cli::parse_from(["uaprobe", "-b", "opc.tcp://plc:4840", "--max-depth", "5"]);
        assert_eq!(cli.mode().map(|m| m.url().to_string()), Some("opc.tcp://plc:4840".into()));
        assert_eq!(cli.max_depth, 5);
        assert_eq!(cli.output, OutputFormat::Tsv);
    }

    #[test]
    fn test_get_mode() {
        let cli = Cli::parse_from(["uaprobe", "-g", "opc.tcp://plc:4840", "ns=2;s=Temperature"]);
        assert_eq!(
            cli.mode(),
            Some(Mode::Get {
                url: "opc.tcp://plc:4840".into(),
                item: "ns=2;s=Temperature".into()
            })
        );
    }

    #[test]
    fn test_set_mode() {
        let cli = Cli::parse_from(["uaprobe", "-s", "opc.tcp://plc:4840", "ns=2;i=1000", "42"]);
        assert!(matches!(cli.mode(), Some(Mode::Set { value, .. }) if value == "42"));
    }

    #[test]
    fn test_mode_required() {
        let err = Cli::try_parse_from(["uaprobe", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_modes_conflict() {
        let args = ["uaprobe", "-b", "opc.tcp://a:4840", "-d", "opc.tcp://b:4840"];
        let err = Cli::try_parse_from(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_set_needs_three_values() {
        assert!(Cli::try_parse_from(["uaprobe", "-s", "opc.tcp://plc:4840", "ns=2;i=1"]).is_err());
    }

    #[test]
    fn test_security_options() {
        let cli = Cli::parse_from([
            "uaprobe",
            "-b",
            "opc.tcp://plc:4840",
            "--security-mode",
            "sign-and-encrypt",
            "--security-policy",
            "Basic256Sha256",
            "-u",
            "operator",
            "-p",
            "secret",
        ]);
        assert_eq!(cli.security_mode, SecurityMode::SignAndEncrypt);
        let config = cli.opcua_config("opc.tcp://plc:4840").unwrap();
        assert!(config.uses_security());
        assert!(!config.user_token.is_anonymous());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let cli = Cli::parse_from(["uaprobe", "-b", "http://plc:4840"]);
        assert!(cli.opcua_config("http://plc:4840").is_err());
    }

    #[test]
    fn test_log_levels() {
        let cli = Cli::parse_from(["uaprobe", "-q", "-b", "opc.tcp://plc:4840"]);
        assert_eq!(cli.effective_log_level(), "error");
        let cli = Cli::parse_from(["uaprobe", "-v", "-b", "opc.tcp://plc:4840"]);
        assert_eq!(cli.effective_log_level(), "debug");
        let cli = Cli::parse_from(["uaprobe", "-b", "opc.tcp://plc:4840"]);
        assert_eq!(cli.effective_log_level(), "warn");
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("ns=2;i=1000").unwrap(), NodeId::numeric(2, 1000));
        assert!(parse_item("ns=2;s=").is_err());
    }

    #[test]
    fn test_usage_text() {
        let lines: Vec<&str> = USAGE.lines().collect();
        assert_eq!(
            lines,
            [
                "simple opc/ua client test routines",
                "-d discoveryServer-Url - search for opc/ua Servers with discoveryServer.",
                "-b Server-Url - list all Items from Server.",
                "-g Server-Url ItemName - get Value of Item.",
                "-s Server-Url ItemName Value - set Value of Item.",
            ]
        );
        assert!(USAGE.ends_with(".\n"));
    }
}
