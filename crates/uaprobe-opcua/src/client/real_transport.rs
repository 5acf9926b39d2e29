// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transports backed by the `opcua` crate client.
//!
//! The `opcua` client is synchronous and drives its own runtime, so every
//! call into it runs on tokio's blocking pool and is bounded by the
//! configured request timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use uaprobe_opcua::client::RealOpcUaTransport;
//! use uaprobe_opcua::types::OpcUaConfig;
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//!
//! let mut transport = RealOpcUaTransport::new(config);
//! transport.connect().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use opcua::client::prelude::*;
use opcua::sync::RwLock as OpcUaRwLock;

use crate::client::transport::{
    DiscoveryTransport, OpcUaTransport, OpcUaValue, ReadResult, ReferenceDescription,
    TransportState, WriteResult,
};
use crate::discovery::{
    ApplicationDescription, ApplicationType, EndpointDescription, MessageSecurityMode,
    ServerOnNetwork,
};
use crate::error::{
    BrowseError, ConnectionError, ConversionError, DiscoveryError, OpcUaError, OpcUaResult,
    OperationError,
};
use crate::types::{
    NodeClass, NodeId, NodeIdentifier, OpcUaConfig, QualifiedName, SecurityMode, SecurityPolicy,
    StatusCode, UserTokenType,
};

/// Browse result mask requesting every field of a reference description.
const BROWSE_RESULT_MASK_ALL: u32 = 0x3F;

// =============================================================================
// Shared Helpers
// =============================================================================

/// Runs a synchronous `opcua` call on the blocking pool, bounded by `timeout`.
async fn run_blocking<T, F>(endpoint: &str, timeout: Duration, call: F) -> OpcUaResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> OpcUaResult<T> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(call)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(OpcUaError::connection(ConnectionError::client_setup(
            format!("client task failed: {}", join_error),
        ))),
        Err(_) => Err(OpcUaError::connection(ConnectionError::timed_out(
            endpoint, timeout,
        ))),
    }
}

/// Builds an `opcua` client from configuration.
fn build_client(config: &OpcUaConfig) -> OpcUaResult<Client> {
    let builder = ClientBuilder::new()
        .application_name(config.application_name.as_str())
        .application_uri(config.effective_application_uri().as_str())
        .create_sample_keypair(config.uses_security())
        .trust_server_certs(config.trust_all_certificates)
        .session_retry_limit(0)
        .session_timeout(u32::try_from(config.session_timeout.as_millis()).unwrap_or(u32::MAX))
        .pki_dir(config.pki_dir.as_str());

    builder.client().ok_or_else(|| {
        OpcUaError::connection(ConnectionError::client_setup(format!(
            "invalid client configuration for '{}'",
            config.endpoint
        )))
    })
}

fn from_opcua_status(status: opcua::types::StatusCode) -> StatusCode {
    StatusCode::new(status.bits())
}

fn to_opcua_security_policy(policy: SecurityPolicy) -> opcua::crypto::SecurityPolicy {
    match policy {
        SecurityPolicy::None => opcua::crypto::SecurityPolicy::None,
        SecurityPolicy::Basic128Rsa15 => opcua::crypto::SecurityPolicy::Basic128Rsa15,
        SecurityPolicy::Basic256 => opcua::crypto::SecurityPolicy::Basic256,
        SecurityPolicy::Basic256Sha256 => opcua::crypto::SecurityPolicy::Basic256Sha256,
        SecurityPolicy::Aes128Sha256RsaOaep => opcua::crypto::SecurityPolicy::Aes128Sha256RsaOaep,
        SecurityPolicy::Aes256Sha256RsaPss => opcua::crypto::SecurityPolicy::Aes256Sha256RsaPss,
    }
}

fn to_opcua_security_mode(mode: SecurityMode) -> opcua::types::MessageSecurityMode {
    match mode {
        SecurityMode::None => opcua::types::MessageSecurityMode::None,
        SecurityMode::Sign => opcua::types::MessageSecurityMode::Sign,
        SecurityMode::SignAndEncrypt => opcua::types::MessageSecurityMode::SignAndEncrypt,
    }
}

fn identity_token(user_token: &UserTokenType) -> IdentityToken {
    match user_token {
        UserTokenType::Anonymous => IdentityToken::Anonymous,
        UserTokenType::UserName { username, password } => {
            IdentityToken::UserName(username.clone(), password.clone())
        }
    }
}

fn to_opcua_node_id(node_id: &NodeId) -> opcua::types::NodeId {
    let ns = node_id.namespace_index;
    match &node_id.identifier {
        NodeIdentifier::Numeric(v) => opcua::types::NodeId::new(ns, *v),
        NodeIdentifier::String(v) => opcua::types::NodeId::new(ns, v.clone()),
        NodeIdentifier::Guid(v) => {
            opcua::types::NodeId::new(ns, opcua::types::Guid::from_bytes(*v.as_bytes()))
        }
        NodeIdentifier::Opaque(v) => {
            opcua::types::NodeId::new(ns, opcua::types::ByteString::from(v.clone()))
        }
    }
}

fn from_opcua_node_id(node_id: &opcua::types::NodeId) -> NodeId {
    let ns = node_id.namespace;
    match &node_id.identifier {
        opcua::types::Identifier::Numeric(v) => NodeId::numeric(ns, *v),
        opcua::types::Identifier::String(v) => NodeId::string(ns, v.as_ref()),
        opcua::types::Identifier::Guid(v) => {
            NodeId::guid(ns, uuid::Uuid::from_bytes(*v.as_bytes()))
        }
        opcua::types::Identifier::ByteString(v) => {
            NodeId::opaque(ns, v.value.clone().unwrap_or_default())
        }
    }
}

fn from_opcua_reference(reference: &opcua::types::ReferenceDescription) -> ReferenceDescription {
    ReferenceDescription {
        node_id: from_opcua_node_id(&reference.node_id.node_id),
        reference_type: Some(from_opcua_node_id(&reference.reference_type_id)),
        is_forward: reference.is_forward,
        node_class: NodeClass::from_value(reference.node_class as u32).unwrap_or_default(),
        browse_name: QualifiedName::new(
            reference.browse_name.namespace_index,
            reference.browse_name.name.as_ref(),
        ),
        display_name: reference.display_name.text.as_ref().to_string(),
    }
}

fn from_opcua_datetime(dt: &opcua::types::DateTime) -> chrono::DateTime<chrono::Utc> {
    dt.as_chrono()
}

fn from_opcua_variant(variant: &opcua::types::Variant) -> OpcUaValue {
    use opcua::types::Variant;

    match variant {
        Variant::Empty => OpcUaValue::Null,
        Variant::Boolean(v) => OpcUaValue::Boolean(*v),
        Variant::SByte(v) => OpcUaValue::SByte(*v),
        Variant::Byte(v) => OpcUaValue::Byte(*v),
        Variant::Int16(v) => OpcUaValue::Int16(*v),
        Variant::UInt16(v) => OpcUaValue::UInt16(*v),
        Variant::Int32(v) => OpcUaValue::Int32(*v),
        Variant::UInt32(v) => OpcUaValue::UInt32(*v),
        Variant::Int64(v) => OpcUaValue::Int64(*v),
        Variant::UInt64(v) => OpcUaValue::UInt64(*v),
        Variant::Float(v) => OpcUaValue::Float(*v),
        Variant::Double(v) => OpcUaValue::Double(*v),
        Variant::String(v) => OpcUaValue::String(v.as_ref().to_string()),
        Variant::DateTime(v) => OpcUaValue::DateTime(from_opcua_datetime(v)),
        Variant::Guid(v) => OpcUaValue::Guid(uuid::Uuid::from_bytes(*v.as_bytes())),
        Variant::ByteString(v) => OpcUaValue::ByteString(v.value.clone().unwrap_or_default()),
        Variant::Array(array) => {
            OpcUaValue::Array(array.values.iter().map(from_opcua_variant).collect())
        }
        // Structured and node-valued variants are shown in their debug form.
        other => OpcUaValue::String(format!("{:?}", other)),
    }
}

fn to_opcua_variant(value: &OpcUaValue) -> OpcUaResult<opcua::types::Variant> {
    use opcua::types::Variant;

    let variant = match value {
        OpcUaValue::Null => Variant::Empty,
        OpcUaValue::Boolean(v) => Variant::Boolean(*v),
        OpcUaValue::SByte(v) => Variant::SByte(*v),
        OpcUaValue::Byte(v) => Variant::Byte(*v),
        OpcUaValue::Int16(v) => Variant::Int16(*v),
        OpcUaValue::UInt16(v) => Variant::UInt16(*v),
        OpcUaValue::Int32(v) => Variant::Int32(*v),
        OpcUaValue::UInt32(v) => Variant::UInt32(*v),
        OpcUaValue::Int64(v) => Variant::Int64(*v),
        OpcUaValue::UInt64(v) => Variant::UInt64(*v),
        OpcUaValue::Float(v) => Variant::Float(*v),
        OpcUaValue::Double(v) => Variant::Double(*v),
        OpcUaValue::String(v) => Variant::String(opcua::types::UAString::from(v.as_str())),
        OpcUaValue::DateTime(v) => Variant::DateTime(Box::new(opcua::types::DateTime::from(*v))),
        OpcUaValue::Guid(v) => {
            Variant::Guid(Box::new(opcua::types::Guid::from_bytes(*v.as_bytes())))
        }
        OpcUaValue::ByteString(v) => Variant::ByteString(opcua::types::ByteString::from(v.clone())),
        OpcUaValue::Array(_) => {
            return Err(ConversionError::unsupported_type(value.type_name()).into());
        }
    };
    Ok(variant)
}

fn has_continuation(point: &opcua::types::ByteString) -> bool {
    point.value.as_ref().is_some_and(|bytes| !bytes.is_empty())
}

// =============================================================================
// RealOpcUaTransport
// =============================================================================

/// Session transport using the `opcua` crate.
pub struct RealOpcUaTransport {
    /// Configuration for the transport.
    config: OpcUaConfig,

    /// Current connection state.
    state: RwLock<TransportState>,

    /// The active session.
    session: RwLock<Option<Arc<OpcUaRwLock<Session>>>>,
}

impl RealOpcUaTransport {
    /// Creates a transport for the configured endpoint.
    pub fn new(config: OpcUaConfig) -> Self {
        Self {
            config,
            state: RwLock::new(TransportState::Disconnected),
            session: RwLock::new(None),
        }
    }

    async fn set_state(&self, state: TransportState) {
        *self.state.write().await = state;
    }

    async fn get_session(&self) -> OpcUaResult<Arc<OpcUaRwLock<Session>>> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(OpcUaError::not_connected)
    }

    fn open_session(config: &OpcUaConfig) -> OpcUaResult<Arc<OpcUaRwLock<Session>>> {
        let mut client = build_client(config)?;

        let endpoints = client
            .get_server_endpoints_from_url(config.endpoint.as_str())
            .map_err(|s| ConnectionError::failed(&config.endpoint, from_opcua_status(s)))?;

        let policy = to_opcua_security_policy(config.security_policy);
        let mode = to_opcua_security_mode(config.security_mode);

        let endpoint = endpoints
            .into_iter()
            .find(|e| e.security_policy_uri.as_ref() == policy.to_uri() && e.security_mode == mode)
            .ok_or_else(|| {
                ConnectionError::no_suitable_endpoint(
                    &config.endpoint,
                    config.security_mode.name(),
                    config.security_policy.name(),
                )
            })?;

        debug!(
            endpoint_url = %endpoint.endpoint_url,
            security_policy = %endpoint.security_policy_uri,
            security_mode = ?endpoint.security_mode,
            "Found matching endpoint"
        );

        client
            .connect_to_endpoint(endpoint, identity_token(&config.user_token))
            .map_err(|s| ConnectionError::failed(&config.endpoint, from_opcua_status(s)).into())
    }
}

#[async_trait]
impl OpcUaTransport for RealOpcUaTransport {
    async fn connect(&mut self) -> OpcUaResult<()> {
        self.set_state(TransportState::Connecting).await;
        info!(endpoint = %self.config.endpoint, "Connecting to OPC UA server");

        let config = self.config.clone();
        let result = run_blocking(&self.config.endpoint, self.config.request_timeout, move || {
            Self::open_session(&config)
        })
        .await;

        match result {
            Ok(session) => {
                *self.session.write().await = Some(session);
                self.set_state(TransportState::Connected).await;
                info!(endpoint = %self.config.endpoint, "Connected to OPC UA server");
                Ok(())
            }
            Err(e) => {
                self.set_state(TransportState::Failed).await;
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        let session = self.session.write().await.take();

        if let Some(session) = session {
            info!(endpoint = %self.config.endpoint, "Disconnecting from OPC UA server");
            let result = run_blocking(&self.config.endpoint, self.config.request_timeout, move || {
                session.read().disconnect();
                Ok(())
            })
            .await;
            if let Err(e) = result {
                warn!(error = %e, "Session did not close cleanly");
            }
        }

        self.set_state(TransportState::Disconnected).await;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    fn state(&self) -> TransportState {
        self.state
            .try_read()
            .map(|state| *state)
            .unwrap_or(TransportState::Disconnected)
    }

    async fn browse(&self, node_id: &NodeId) -> OpcUaResult<Vec<ReferenceDescription>> {
        let session = self.get_session().await?;
        let target = node_id.clone();

        trace!(node_id = %node_id, "Browsing node");

        run_blocking(&self.config.endpoint, self.config.request_timeout, move || {
            let id = target.to_opc_string();
            let description = opcua::types::BrowseDescription {
                node_id: to_opcua_node_id(&target),
                browse_direction: opcua::types::BrowseDirection::Forward,
                reference_type_id: opcua::types::NodeId::null(),
                include_subtypes: true,
                node_class_mask: 0,
                result_mask: BROWSE_RESULT_MASK_ALL,
            };

            let session = session.read();
            let mut result = session
                .browse(&[description])
                .map_err(|s| BrowseError::service_fault(&id, from_opcua_status(s)))?
                .and_then(|results| results.into_iter().next())
                .ok_or_else(|| BrowseError::no_result(&id))?;

            let mut references = Vec::new();
            loop {
                if result.status_code.is_bad() {
                    let status = from_opcua_status(result.status_code);
                    return Err(BrowseError::bad_status(&id, status).into());
                }
                references.extend(result.references.iter().flatten().map(from_opcua_reference));

                if !has_continuation(&result.continuation_point) {
                    break;
                }
                result = session
                    .browse_next(false, &[result.continuation_point.clone()])
                    .map_err(|s| BrowseError::service_fault(&id, from_opcua_status(s)))?
                    .and_then(|results| results.into_iter().next())
                    .ok_or_else(|| BrowseError::no_result(&id))?;
            }

            Ok(references)
        })
        .await
    }

    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult> {
        let session = self.get_session().await?;
        let target = node_id.clone();

        trace!(node_id = %node_id, "Reading node value");

        run_blocking(&self.config.endpoint, self.config.request_timeout, move || {
            let read_value_id = opcua::types::ReadValueId {
                node_id: to_opcua_node_id(&target),
                attribute_id: opcua::types::AttributeId::Value as u32,
                index_range: opcua::types::UAString::null(),
                data_encoding: opcua::types::QualifiedName::null(),
            };

            let results = session
                .read()
                .read(&[read_value_id], opcua::types::TimestampsToReturn::Source, 0.0)
                .map_err(|s| {
                    OperationError::read_failed(target.to_opc_string(), from_opcua_status(s))
                })?;

            let Some(data_value) = results.into_iter().next() else {
                return Ok(ReadResult::failure(target, StatusCode::BAD_NOTHING_TO_DO));
            };

            let status = data_value.status.map(from_opcua_status).unwrap_or(StatusCode::GOOD);
            if status.is_bad() {
                return Ok(ReadResult::failure(target, status));
            }

            let value = data_value
                .value
                .as_ref()
                .map(from_opcua_variant)
                .unwrap_or(OpcUaValue::Null);
            let mut result = ReadResult::success(target, value);
            result.status = status;
            Ok(result)
        })
        .await
    }

    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult> {
        let session = self.get_session().await?;
        let target = node_id.clone();
        let variant = to_opcua_variant(&value)?;

        trace!(node_id = %node_id, value = %value, "Writing node value");

        run_blocking(&self.config.endpoint, self.config.request_timeout, move || {
            let write_value = opcua::types::WriteValue {
                node_id: to_opcua_node_id(&target),
                attribute_id: opcua::types::AttributeId::Value as u32,
                index_range: opcua::types::UAString::null(),
                value: opcua::types::DataValue::value_only(variant),
            };

            let results = session
                .read()
                .write(&[write_value])
                .map_err(|s| {
                    OperationError::write_failed(target.to_opc_string(), from_opcua_status(s))
                })?;

            Ok(match results.first() {
                Some(status) if status.is_good() => WriteResult::success(target),
                Some(status) => WriteResult::failure(target, from_opcua_status(*status)),
                None => WriteResult::failure(target, StatusCode::BAD_NOTHING_TO_DO),
            })
        })
        .await
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

// =============================================================================
// RealDiscoveryTransport
// =============================================================================

/// Discovery transport using the `opcua` crate.
///
/// Each call builds a fresh client; discovery services need no session.
pub struct RealDiscoveryTransport {
    config: OpcUaConfig,
}

impl RealDiscoveryTransport {
    /// Creates a discovery transport. The configuration's endpoint is only
    /// used to label errors; each call names its own URL.
    pub fn new(config: OpcUaConfig) -> Self {
        Self { config }
    }
}

fn from_opcua_application(app: opcua::types::ApplicationDescription) -> ApplicationDescription {
    ApplicationDescription {
        application_uri: app.application_uri.as_ref().to_string(),
        product_uri: app.product_uri.as_ref().to_string(),
        application_name: app.application_name.text.as_ref().to_string(),
        application_type: ApplicationType::from_value(app.application_type as u32),
        discovery_urls: app
            .discovery_urls
            .unwrap_or_default()
            .iter()
            .map(|url| url.as_ref().to_string())
            .collect(),
    }
}

fn from_opcua_endpoint(endpoint: opcua::types::EndpointDescription) -> EndpointDescription {
    EndpointDescription {
        endpoint_url: endpoint.endpoint_url.as_ref().to_string(),
        transport_profile_uri: endpoint.transport_profile_uri.as_ref().to_string(),
        security_mode: MessageSecurityMode::from_value(endpoint.security_mode as u32),
        security_policy_uri: endpoint.security_policy_uri.as_ref().to_string(),
        security_level: endpoint.security_level,
    }
}

#[async_trait]
impl DiscoveryTransport for RealDiscoveryTransport {
    async fn find_servers_on_network(
        &self,
        discovery_url: &str,
    ) -> OpcUaResult<Vec<ServerOnNetwork>> {
        // The `opcua` client exposes no FindServersOnNetwork call.
        Err(DiscoveryError::service_failed(
            "FindServersOnNetwork",
            discovery_url,
            StatusCode::BAD_SERVICE_UNSUPPORTED,
        )
        .into())
    }

    async fn find_servers(&self, discovery_url: &str) -> OpcUaResult<Vec<ApplicationDescription>> {
        let config = self.config.clone();
        let url = discovery_url.to_string();

        trace!(url = %url, "Calling FindServers");

        run_blocking(discovery_url, self.config.request_timeout, move || {
            let mut client = build_client(&config)?;
            let servers = client
                .find_servers(url.as_str())
                .map_err(|s| {
                    DiscoveryError::service_failed("FindServers", &url, from_opcua_status(s))
                })?;
            Ok(servers.into_iter().map(from_opcua_application).collect())
        })
        .await
    }

    async fn get_endpoints(&self, server_url: &str) -> OpcUaResult<Vec<EndpointDescription>> {
        let config = self.config.clone();
        let url = server_url.to_string();

        trace!(url = %url, "Calling GetEndpoints");

        run_blocking(server_url, self.config.request_timeout, move || {
            let client = build_client(&config)?;
            let endpoints = client
                .get_server_endpoints_from_url(url.as_str())
                .map_err(|s| {
                    DiscoveryError::service_failed("GetEndpoints", &url, from_opcua_status(s))
                })?;
            Ok(endpoints.into_iter().map(from_opcua_endpoint).collect())
        })
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_conversion() {
        let ids = [
            NodeId::numeric(0, 85),
            NodeId::string(3, "Temperature"),
            NodeId::guid(1, uuid::Uuid::from_bytes([7; 16])),
            NodeId::opaque(4, vec![1, 2, 3]),
        ];
        for id in ids {
            assert_eq!(from_opcua_node_id(&to_opcua_node_id(&id)), id);
        }
    }

    #[test]
    fn test_variant_conversion() {
        let values = [
            OpcUaValue::Boolean(true),
            OpcUaValue::UInt16(7),
            OpcUaValue::Double(25.5),
            OpcUaValue::String("hello".into()),
            OpcUaValue::ByteString(vec![0xde, 0xad]),
            OpcUaValue::Null,
        ];
        for value in values {
            let variant = to_opcua_variant(&value).unwrap();
            assert_eq!(from_opcua_variant(&variant), value);
        }
    }

    #[test]
    fn test_array_write_rejected() {
        assert!(to_opcua_variant(&OpcUaValue::Array(vec![OpcUaValue::Int32(1)])).is_err());
    }

    #[test]
    fn test_status_mapping() {
        let status = from_opcua_status(opcua::types::StatusCode::BadNodeIdUnknown);
        assert_eq!(status, StatusCode::BAD_NODE_ID_UNKNOWN);
    }

    #[test]
    fn test_transport_creation() {
        let config = OpcUaConfig::new("opc.tcp://localhost:4840");
        let transport = RealOpcUaTransport::new(config);
        assert_eq!(transport.endpoint(), "opc.tcp://localhost:4840");
        assert_eq!(transport.state(), TransportState::Disconnected);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_find_servers_on_network_unsupported() {
        let transport = RealDiscoveryTransport::new(OpcUaConfig::new("opc.tcp://localhost:4840"));
        let err = transport
            .find_servers_on_network("opc.tcp://localhost:4840")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_SERVICE_UNSUPPORTED);
    }

    #[tokio::test]
    async fn test_browse_requires_session() {
        let transport = RealOpcUaTransport::new(OpcUaConfig::new("opc.tcp://localhost:4840"));
        let err = transport.browse(&NodeId::OBJECTS_FOLDER).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_NOT_CONNECTED);
    }
}
