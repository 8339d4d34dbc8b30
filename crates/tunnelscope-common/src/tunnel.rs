//! Upstream tunnel records and the TCP endpoint selection rule.

use serde::{Deserialize, Serialize};

/// Protocol tag of the tunnels we resolve.
pub const TCP_PROTO: &str = "tcp";

/// Scheme prefix stripped from a TCP tunnel's public URL.
pub const TCP_SCHEME: &str = "tcp://";

/// One entry of the upstream tunnel list.
///
/// The upstream object carries many more fields; only these two matter here
/// and the rest are ignored during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelRecord {
    pub proto: String,
    pub public_url: String,
}

impl TunnelRecord {
    pub fn new(proto: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            proto: proto.into(),
            public_url: public_url.into(),
        }
    }

    /// Whether this record is a TCP tunnel. The comparison is exact.
    #[must_use]
    pub fn is_tcp(&self) -> bool {
        self.proto == TCP_PROTO
    }

    /// The public URL with a leading `tcp://` removed, if present.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.public_url
            .strip_prefix(TCP_SCHEME)
            .unwrap_or(&self.public_url)
    }
}

/// Success body of the upstream tunnel-listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelList {
    pub tunnels: Vec<TunnelRecord>,
}

impl TunnelList {
    /// Resolves the account's TCP endpoint.
    ///
    /// The first TCP record in upstream order wins. Accounts are expected to
    /// expose at most one TCP tunnel; when several exist the choice is still
    /// deterministic for identical input.
    ///
    /// A first TCP record with nothing after the scheme counts as no tunnel;
    /// later records are not consulted.
    #[must_use]
    pub fn tcp_endpoint(&self) -> Option<&str> {
        self.tunnels
            .iter()
            .find(|tunnel| tunnel.is_tcp())
            .map(TunnelRecord::endpoint)
            .filter(|endpoint| !endpoint.is_empty())
    }
}
