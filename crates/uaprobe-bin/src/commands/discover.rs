// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Discovery report (`-d`).

use std::io::Write;

use tracing::{info, warn};
use uaprobe_opcua::RealDiscoveryTransport;

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints servers, applications and endpoints known to `url`.
pub async fn discover(cli: &Cli, url: &str) -> BinResult<()> {
    let transport = RealDiscoveryTransport::new(cli.opcua_config(url)?);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = uaprobe_opcua::discover(&transport, url, &mut out).await?;
    out.flush()?;

    if let Some(status) = summary.endpoints_aborted {
        warn!(status = %status, "Endpoint listing stopped early");
    }
    info!(
        servers_on_network = ?summary.servers_on_network,
        applications = summary.applications,
        endpoint_listings = summary.endpoint_listings,
        skipped = summary.skipped_without_url,
        "Discovery complete"
    );
    Ok(())
}
