//! Supported networks and their Pendle chain identifiers

use crate::error::PendleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chain Pendle markets are deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Arbitrum,
    Mantle,
    Berachain,
    Base,
    /// HyperEVM mainnet (chain id 999)
    Hyperevm,
}

impl Network {
    pub const ALL: [Network; 6] = [
        Network::Ethereum,
        Network::Arbitrum,
        Network::Mantle,
        Network::Berachain,
        Network::Base,
        Network::Hyperevm,
    ];

    /// Numeric chain id used in Pendle API paths
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Arbitrum => 42161,
            Network::Mantle => 5000,
            Network::Berachain => 80094,
            Network::Base => 8453,
            Network::Hyperevm => 999,
        }
    }

    /// URL path segment, e.g. `/42161`
    pub fn path(self) -> String {
        format!("/{}", self.chain_id())
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Arbitrum => "arbitrum",
            Network::Mantle => "mantle",
            Network::Berachain => "berachain",
            Network::Base => "base",
            Network::Hyperevm => "hyperevm",
        }
    }

    /// Look up a network by chain id
    pub fn from_chain_id(chain_id: u64) -> Result<Self, PendleError> {
        Self::ALL
            .into_iter()
            .find(|n| n.chain_id() == chain_id)
            .ok_or_else(|| PendleError::InvalidInput(format!("Unsupported chain id: {chain_id}")))
    }
}

impl FromStr for Network {
    type Err = PendleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|n| n.name() == wanted)
            .ok_or_else(|| PendleError::InvalidInput(format!("Invalid network: {s}")))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
