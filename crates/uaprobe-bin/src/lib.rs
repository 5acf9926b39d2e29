// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uaprobe-bin
//!
//! Command line front end for `uaprobe-opcua`.
//!
//! - CLI argument parsing with clap
//! - Logging initialization (stderr only)
//! - Command implementations (discover, browse, get, set)
//! - Exit codes derived from OPC UA status codes
//!
//! ## Architecture
//!
//! ```text
//!            main.rs
//!               │
//!            cli.rs ──────── logging.rs
//!               │
//!          commands/
//!   ┌────────┬──┴─────┬────────┐
//! discover browse    get      set
//!   │        │        │        │
//!   └────────┴────┬───┴────────┘
//!           uaprobe-opcua
//! ```
//!
//! ## Usage
//!
//! ```bash
//! uaprobe -d opc.tcp://localhost:4840
//! uaprobe -b opc.tcp://localhost:4840
//! uaprobe -g opc.tcp://localhost:4840 "ns=2;s=Temperature"
//! uaprobe -s opc.tcp://localhost:4840 "ns=2;i=1000" 42
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, LogFormat, Mode, OutputFormat};
pub use error::{BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
