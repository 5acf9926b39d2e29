// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Discovery report.
//!
//! Asks a discovery server which servers it knows about, first through
//! FindServersOnNetwork and then through FindServers, and lists the
//! endpoints of every server that published a discovery URL.
//!
//! ```text
//! FindServersOnNetwork ──► Server[i]: name / RecordID / Discovery URL / Capabilities
//! FindServers          ──► Server[i]: uri / Name / URIs / Type / Discovery URLs
//! GetEndpoints (each)  ──► Endpoints for Server[i] / Endpoint[j]: ...
//! ```

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::client::DiscoveryTransport;
use crate::error::{OpcUaError, OpcUaResult};
use crate::types::StatusCode;

// =============================================================================
// Discovery Types
// =============================================================================

/// A server registered with a discovery server's multicast subnet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerOnNetwork {
    /// Record id assigned by the discovery server.
    pub record_id: u32,

    /// Server name.
    pub server_name: String,

    /// Discovery URL of the server.
    pub discovery_url: String,

    /// Capability identifiers (e.g. "DA", "LDS").
    pub server_capabilities: Vec<String>,
}

/// Kind of OPC UA application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    /// Server.
    Server,
    /// Client.
    Client,
    /// Both client and server.
    ClientAndServer,
    /// Discovery server.
    DiscoveryServer,
    /// Value outside the defined range.
    Unknown(u32),
}

impl ApplicationType {
    /// Creates from the OPC UA enumeration value.
    pub fn from_value(value: u32) -> Self {
        match value {
            0 => Self::Server,
            1 => Self::Client,
            2 => Self::ClientAndServer,
            3 => Self::DiscoveryServer,
            other => Self::Unknown(other),
        }
    }

    /// Returns the label printed in the report.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Client => "Client",
            Self::ClientAndServer => "Client and Server",
            Self::DiscoveryServer => "Discovery Server",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Application description returned by FindServers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescription {
    /// Application URI.
    pub application_uri: String,

    /// Product URI.
    pub product_uri: String,

    /// Application name text.
    pub application_name: String,

    /// Application type.
    pub application_type: ApplicationType,

    /// Discovery URLs, in server order.
    pub discovery_urls: Vec<String>,
}

/// Message security mode of an endpoint as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSecurityMode {
    /// Invalid (0).
    Invalid,
    /// No security.
    None,
    /// Signed.
    Sign,
    /// Signed and encrypted.
    SignAndEncrypt,
    /// Value outside the defined range.
    Unknown(u32),
}

impl MessageSecurityMode {
    /// Creates from the OPC UA enumeration value.
    pub fn from_value(value: u32) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::None,
            2 => Self::Sign,
            3 => Self::SignAndEncrypt,
            other => Self::Unknown(other),
        }
    }

    /// Returns the label printed in the report.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::None => "None",
            Self::Sign => "Sign",
            Self::SignAndEncrypt => "Sign and Encrypt",
            Self::Unknown(_) => "No valid security mode",
        }
    }
}

/// Endpoint description returned by GetEndpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescription {
    /// Endpoint URL.
    pub endpoint_url: String,

    /// Transport profile URI.
    pub transport_profile_uri: String,

    /// Message security mode.
    pub security_mode: MessageSecurityMode,

    /// Security policy URI.
    pub security_policy_uri: String,

    /// Relative security level assigned by the server.
    pub security_level: u8,
}

// =============================================================================
// DiscoverySummary
// =============================================================================

/// What a discovery run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Servers listed by FindServersOnNetwork, `None` when the service is
    /// unsupported.
    pub servers_on_network: Option<usize>,

    /// Applications listed by FindServers.
    pub applications: usize,

    /// Servers whose endpoints were listed.
    pub endpoint_listings: usize,

    /// Servers skipped because they published no discovery URL.
    pub skipped_without_url: usize,

    /// Status of the GetEndpoints call that stopped the endpoint listing.
    pub endpoints_aborted: Option<StatusCode>,
}

// =============================================================================
// discover
// =============================================================================

/// Runs the discovery report against `discovery_url`, writing it to `out`.
///
/// FindServersOnNetwork and FindServers failures are terminal and carry the
/// service status, except that an unsupported FindServersOnNetwork only
/// skips that listing. A GetEndpoints failure stops the endpoint listing
/// without failing the report.
pub async fn discover<D, W>(
    discovery: &D,
    discovery_url: &str,
    out: &mut W,
) -> OpcUaResult<DiscoverySummary>
where
    D: DiscoveryTransport + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = DiscoverySummary::default();

    match discovery.find_servers_on_network(discovery_url).await {
        Ok(servers) => {
            debug!(count = servers.len(), "FindServersOnNetwork returned");
            for (i, server) in servers.iter().enumerate() {
                write_server_on_network(out, i, server)?;
            }
            summary.servers_on_network = Some(servers.len());
        }
        Err(e) if e.status_code() == StatusCode::BAD_SERVICE_UNSUPPORTED => {
            warn!(url = discovery_url, "FindServersOnNetwork is not supported, skipping");
        }
        Err(e) => {
            log_service_failure("FindServersOnNetwork", &e);
            return Err(e);
        }
    }

    let applications = match discovery.find_servers(discovery_url).await {
        Ok(applications) => applications,
        Err(e) => {
            log_service_failure("FindServers", &e);
            return Err(e);
        }
    };
    debug!(count = applications.len(), "FindServers returned");
    summary.applications = applications.len();

    for (i, application) in applications.iter().enumerate() {
        write_application(out, i, application)?;
    }

    writeln!(out, "-------- Server Endpoints --------")?;

    for (i, application) in applications.iter().enumerate() {
        let Some(url) = application.discovery_urls.first() else {
            info!(
                server = %application.application_uri,
                "[GetEndpoints] Server did not provide any discovery urls. Skipping."
            );
            summary.skipped_without_url += 1;
            continue;
        };

        write!(
            out,
            "\nEndpoints for Server[{}]: {}\n",
            i, application.application_uri
        )?;

        let endpoints = match discovery.get_endpoints(url).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!(
                    url = %url,
                    status = %e.status_code(),
                    "GetEndpoints failed, stopping endpoint listing"
                );
                summary.endpoints_aborted = Some(e.status_code());
                break;
            }
        };

        for (j, endpoint) in endpoints.iter().enumerate() {
            write_endpoint(out, j, endpoint)?;
        }
        summary.endpoint_listings += 1;
    }

    writeln!(out)?;
    out.flush()?;

    Ok(summary)
}

fn log_service_failure(service: &str, e: &OpcUaError) {
    error!(
        status = %e.status_code(),
        "Could not call {} service. Is the discovery server started?",
        service
    );
}

fn write_server_on_network<W: Write + ?Sized>(
    out: &mut W,
    index: usize,
    server: &ServerOnNetwork,
) -> std::io::Result<()> {
    write!(out, "Server[{}]: {}", index, server.server_name)?;
    write!(out, "\n\tRecordID: {}", server.record_id)?;
    write!(out, "\n\tDiscovery URL: {}", server.discovery_url)?;
    write!(out, "\n\tCapabilities: ")?;
    for capability in &server.server_capabilities {
        write!(out, "{},", capability)?;
    }
    write!(out, "\n\n")
}

fn write_application<W: Write + ?Sized>(
    out: &mut W,
    index: usize,
    application: &ApplicationDescription,
) -> std::io::Result<()> {
    write!(out, "Server[{}]: {}", index, application.application_uri)?;
    write!(out, "\n\tName: {}", application.application_name)?;
    write!(out, "\n\tApplication URI: {}", application.application_uri)?;
    write!(out, "\n\tProduct URI: {}", application.product_uri)?;
    write!(out, "\n\tType: {}", application.application_type)?;
    write!(out, "\n\tDiscovery URLs:")?;
    for (j, url) in application.discovery_urls.iter().enumerate() {
        write!(out, "\n\t\t[{}]: {}", j, url)?;
    }
    write!(out, "\n\n")
}

fn write_endpoint<W: Write + ?Sized>(
    out: &mut W,
    index: usize,
    endpoint: &EndpointDescription,
) -> std::io::Result<()> {
    write!(out, "\n\tEndpoint[{}]:", index)?;
    write!(out, "\n\t\tEndpoint URL: {}", endpoint.endpoint_url)?;
    write!(out, "\n\t\tTransport profile URI: {}", endpoint.transport_profile_uri)?;
    write!(out, "\n\t\tSecurity Mode: {}", endpoint.security_mode.label())?;
    write!(out, "\n\t\tSecurity profile URI: {}", endpoint.security_policy_uri)?;
    write!(out, "\n\t\tSecurity Level: {}", endpoint.security_level)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_type_labels() {
        assert_eq!(ApplicationType::from_value(0).label(), "Server");
        assert_eq!(ApplicationType::from_value(2).label(), "Client and Server");
        assert_eq!(ApplicationType::from_value(3).to_string(), "Discovery Server");
        assert_eq!(ApplicationType::from_value(9), ApplicationType::Unknown(9));
        assert_eq!(ApplicationType::from_value(9).label(), "Unknown");
    }

    #[test]
    fn test_security_mode_labels() {
        assert_eq!(MessageSecurityMode::from_value(0).label(), "Invalid");
        assert_eq!(MessageSecurityMode::from_value(3).label(), "Sign and Encrypt");
        assert_eq!(MessageSecurityMode::from_value(7).label(), "No valid security mode");
    }

    #[test]
    fn test_write_server_on_network() {
        let server = ServerOnNetwork {
            record_id: 4,
            server_name: "Boiler".into(),
            discovery_url: "opc.tcp://boiler:4840".into(),
            server_capabilities: vec!["DA".into(), "HD".into()],
        };
        let mut out = Vec::new();
        write_server_on_network(&mut out, 0, &server).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Server[0]: Boiler\n\tRecordID: 4\n\tDiscovery URL: opc.tcp://boiler:4840\n\tCapabilities: DA,HD,\n\n"
        );
    }

    #[test]
    fn test_write_endpoint() {
        let endpoint = EndpointDescription {
            endpoint_url: "opc.tcp://boiler:4840".into(),
            transport_profile_uri:
                "http://opcfoundation.org/UA-Profile/Transport/uatcp-uasc-uabinary".into(),
            security_mode: MessageSecurityMode::None,
            security_policy_uri: "http://opcfoundation.org/UA/SecurityPolicy#None".into(),
            security_level: 0,
        };
        let mut out = Vec::new();
        write_endpoint(&mut out, 1, &endpoint).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\n\tEndpoint[1]:\n\t\tEndpoint URL: opc.tcp://boiler:4840"));
        assert!(text.contains("\n\t\tSecurity Mode: None"));
        assert!(text.ends_with("\n\t\tSecurity Level: 0"));
    }
}
