//! Peer documents and the endpoints they advertise.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, GrammarError, InvariantViolation};
use crate::grammar::endpoint::{is_ipv4, is_ipv6, is_server, validate_word};
use crate::limits::MAX_ENDPOINTS;
use crate::model::document::{check_section_len, check_single_signature, Document, Envelope};
use crate::model::{BlockId, Currency, PublicKey, Signature};
use crate::signer::{sign_raw, Signer};

/// APIs whose endpoint fields this crate interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KnownApi {
    #[serde(rename = "BASIC_MERKLED_API")]
    BasicMerkledApi,
}

impl KnownApi {
    /// Every known API, in dispatch order.
    pub const ALL: &'static [KnownApi] = &[KnownApi::BasicMerkledApi];

    /// The tag that opens the endpoint line.
    pub fn tag(&self) -> &'static str {
        match self {
            KnownApi::BasicMerkledApi => "BASIC_MERKLED_API",
        }
    }

    /// Looks up an API by its exact tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|api| api.tag() == tag)
    }
}

/// An endpoint of a known API: `TAG [DNS] [IPv4] [IPv6] [PORT]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownEndpoint {
    api: KnownApi,
    server: Option<String>,
    ipv4: Option<String>,
    ipv6: Option<String>,
    port: Option<u16>,
}

impl KnownEndpoint {
    /// Creates an endpoint, checking each field's shape.
    ///
    /// At least one field must be present.
    pub fn new(
        api: KnownApi,
        server: Option<String>,
        ipv4: Option<String>,
        ipv6: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, GrammarError> {
        let bad = |token: &str, reason| GrammarError::Endpoint {
            token: token.to_string(),
            reason,
        };
        if let Some(server) = server.as_deref().filter(|s| !is_server(s)) {
            return Err(bad(server, "not a DNS name"));
        }
        if let Some(ipv4) = ipv4.as_deref().filter(|s| !is_ipv4(s)) {
            return Err(bad(ipv4, "not an IPv4 address"));
        }
        if let Some(ipv6) = ipv6.as_deref().filter(|s| !is_ipv6(s)) {
            return Err(bad(ipv6, "not an IPv6 address"));
        }
        if server.is_none() && ipv4.is_none() && ipv6.is_none() && port.is_none() {
            return Err(bad(api.tag(), "endpoint has no fields"));
        }
        Ok(Self {
            api,
            server,
            ipv4,
            ipv6,
            port,
        })
    }

    pub fn api(&self) -> KnownApi {
        self.api
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.ipv4.as_deref()
    }

    pub fn ipv6(&self) -> Option<&str> {
        self.ipv6.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Where to connect: server name first, then IPv4, then IPv6.
    ///
    /// Returns `None` when the endpoint has no port or no address.
    pub fn connection(&self) -> Option<ConnectionInfo> {
        let port = self.port?;
        let host = self
            .server
            .as_ref()
            .or(self.ipv4.as_ref())
            .or(self.ipv6.as_ref())?;
        Some(ConnectionInfo {
            host: host.clone(),
            port,
        })
    }
}

/// An endpoint of an API this crate does not interpret.
///
/// Its words are kept verbatim so that it re-serializes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownEndpoint {
    api: String,
    properties: Vec<String>,
}

impl UnknownEndpoint {
    /// Creates an opaque endpoint. It needs at least one property so that the
    /// line can never be mistaken for a signature.
    pub fn new(api: impl Into<String>, properties: Vec<String>) -> Result<Self, GrammarError> {
        let api = api.into();
        validate_word(&api)?;
        if KnownApi::from_tag(&api).is_some() {
            return Err(GrammarError::Endpoint {
                token: api,
                reason: "tag belongs to a known API",
            });
        }
        if properties.is_empty() {
            return Err(GrammarError::Endpoint {
                token: api,
                reason: "endpoint has no fields",
            });
        }
        for property in &properties {
            validate_word(property)?;
        }
        Ok(Self { api, properties })
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }
}

/// A network endpoint advertised by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Known(KnownEndpoint),
    Unknown(UnknownEndpoint),
}

impl Endpoint {
    /// The API tag opening the endpoint line.
    pub fn api(&self) -> &str {
        match self {
            Endpoint::Known(endpoint) => endpoint.api.tag(),
            Endpoint::Unknown(endpoint) => &endpoint.api,
        }
    }
}

/// Host and port to reach a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A node announcing how to reach it.
///
/// Endpoint order is significant: it is the node's protocol priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peer {
    #[serde(flatten)]
    envelope: Envelope,
    pubkey: PublicKey,
    block: BlockId,
    endpoints: Vec<Endpoint>,
}

impl Peer {
    /// Creates an unsigned peer document.
    ///
    /// At most [`MAX_ENDPOINTS`] endpoints are accepted, the same bound the
    /// parser applies.
    pub fn new(
        version: u32,
        currency: Currency,
        pubkey: PublicKey,
        block: BlockId,
        endpoints: Vec<Endpoint>,
    ) -> Result<Self, InvariantViolation> {
        check_section_len("Endpoints", endpoints.len(), MAX_ENDPOINTS)?;
        Ok(Self {
            envelope: Envelope::new(version, currency),
            pubkey,
            block,
            endpoints,
        })
    }

    pub fn pubkey(&self) -> &PublicKey {
        &self.pubkey
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.envelope.signatures.first()
    }

    /// Returns a copy carrying the given signatures (at most one).
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Result<Self, InvariantViolation> {
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(self)
    }

    /// Signs the raw form, replacing any existing signature.
    pub fn sign(&mut self, keys: &[&dyn Signer]) -> Result<(), Error> {
        let signatures = sign_raw(&self.raw(), keys)?;
        check_single_signature(Self::DOC_TYPE, &signatures)?;
        self.envelope.signatures = signatures;
        Ok(())
    }

    /// Consumes the document and returns it signed.
    pub fn signed(mut self, keys: &[&dyn Signer]) -> Result<Self, Error> {
        self.sign(keys)?;
        Ok(self)
    }
}

impl Document for Peer {
    const DOC_TYPE: &'static str = "Peer";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn raw(&self) -> String {
        crate::codec::peer::peer_raw(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_api_lookup_is_exact() {
        assert_eq!(KnownApi::from_tag("BASIC_MERKLED_API"), Some(KnownApi::BasicMerkledApi));
        assert_eq!(KnownApi::from_tag("BASIC_MERKLED_API_V2"), None);
        assert_eq!(KnownApi::from_tag("basic_merkled_api"), None);
    }

    #[test]
    fn test_known_endpoint_field_shapes() {
        let ok = KnownEndpoint::new(
            KnownApi::BasicMerkledApi,
            Some("ucoin.twiced.fr".to_string()),
            Some("88.174.120.187".to_string()),
            None,
            Some(9101),
        );
        assert!(ok.is_ok());

        let swapped = KnownEndpoint::new(
            KnownApi::BasicMerkledApi,
            Some("88.174.120.187".to_string()),
            None,
            None,
            Some(9101),
        );
        assert!(matches!(swapped, Err(GrammarError::Endpoint { .. })));

        let empty = KnownEndpoint::new(KnownApi::BasicMerkledApi, None, None, None, None);
        assert!(empty.is_err());
    }

    #[test]
    fn test_connection_prefers_server() {
        let endpoint = KnownEndpoint::new(
            KnownApi::BasicMerkledApi,
            Some("ucoin.twiced.fr".to_string()),
            Some("88.174.120.187".to_string()),
            None,
            Some(9101),
        )
        .unwrap();
        assert_eq!(endpoint.connection().unwrap().to_string(), "ucoin.twiced.fr:9101");

        let ipv6_only = KnownEndpoint::new(
            KnownApi::BasicMerkledApi,
            None,
            None,
            Some("2001:db8::1".to_string()),
            Some(80),
        )
        .unwrap();
        assert_eq!(ipv6_only.connection().unwrap().host, "2001:db8::1");

        let no_port = KnownEndpoint::new(
            KnownApi::BasicMerkledApi,
            Some("ucoin.twiced.fr".to_string()),
            None,
            None,
            None,
        )
        .unwrap();
        assert!(no_port.connection().is_none());
    }

    #[test]
    fn test_unknown_endpoint_requires_properties() {
        assert!(UnknownEndpoint::new("WS2P", vec![]).is_err());
        assert!(UnknownEndpoint::new("WS2P", vec!["a b".to_string()]).is_err());
        assert!(UnknownEndpoint::new("BASIC_MERKLED_API", vec!["80".to_string()]).is_err());
        let endpoint = UnknownEndpoint::new("WS2P", vec!["abc".to_string()]).unwrap();
        assert_eq!(Endpoint::Unknown(endpoint).api(), "WS2P");
    }
}
