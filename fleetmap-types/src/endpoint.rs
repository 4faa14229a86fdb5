//! Endpoint - one side of an observed connection.

use core::fmt;

/// An (address, port) pair seen as the local or remote side of a connection.
///
/// Used as a map key with value semantics; two endpoints are equal only if
/// both the address text and the port are equal, so `"10.0.0.1" + 80` can
/// never collide with `"10.0.0.18" + 0` the way a concatenated key could.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    /// Textual address as reported by the sampler (IPv4 or IPv6).
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
