//! Domain models for the wallet service.
//!
//! These models are adapter-agnostic and represent the canonical form of
//! chain and balance data within the domain layer.

use serde::{Deserialize, Serialize};

/// Decimal places assumed for an asset whose metadata is not registered
/// on-chain.
pub const DEFAULT_DECIMALS: u32 = 4;

// =============================================================================
// Genesis Hash
// =============================================================================

/// 32-byte genesis hash identifying a chain instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenesisHash(pub [u8; 32]);

impl GenesisHash {
    /// Parse from hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// Convert to 0x-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get the inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for GenesisHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for GenesisHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for GenesisHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// Endpoints
// =============================================================================

/// Static definition of a known chain: its genesis hash and the WebSocket
/// endpoint to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    /// Short network name (e.g. "azalea").
    pub name: &'static str,
    /// Genesis hash of the network.
    pub genesis_hash: GenesisHash,
    /// WebSocket RPC URL.
    pub url: &'static str,
}

// =============================================================================
// Assets
// =============================================================================

/// Numeric identifier of a fungible asset on a multi-asset chain.
pub type AssetId = u32;

/// Asset metadata relevant to balance display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// On-chain asset id.
    pub id: AssetId,
    /// Decimal places of the minor unit.
    pub decimals: u32,
}

/// The two assets of a CENNZnet chain: CENNZ (staking) and CPAY (spending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub cennz: Asset,
    pub cpay: Asset,
}

/// One entry of the chain's registered-assets table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAsset {
    /// On-chain asset id.
    pub id: AssetId,
    /// Ticker symbol as registered on-chain.
    pub symbol: String,
    /// Decimal places of the minor unit.
    pub decimals: u32,
}

/// Which of the two chain assets an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Cennz,
    Cpay,
}

impl AssetKind {
    /// Select the matching entry from an asset table.
    pub fn pick(self, assets: &Assets) -> Asset {
        match self {
            AssetKind::Cennz => assets.cennz,
            AssetKind::Cpay => assets.cpay,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Cennz => write!(f, "CENNZ"),
            AssetKind::Cpay => write!(f, "CPAY"),
        }
    }
}

// =============================================================================
// Balances
// =============================================================================

/// Display-unit balance snapshot for one address on one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub cennz: f64,
    pub cpay: f64,
}

/// Cache key for a balance snapshot.
///
/// The key is the `address_genesisHash` concatenation; no collision
/// handling if the address contains the delimiter.
pub fn balance_key(address: &str, genesis_hash: &GenesisHash) -> String {
    format!("{}_{}", address, genesis_hash.to_hex())
}

// =============================================================================
// Transfers
// =============================================================================

/// Result of a finalized transfer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Hash of the block the extrinsic was finalized in.
    pub block_hash: String,
    /// Hash of the submitted extrinsic.
    pub extrinsic_hash: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_hex_roundtrip() {
        let hex = "0x0d0971c150a9741b8719b3c6c9c2e96ec5b2e3fb83641af868e6650f3e263ef0";
        let hash = GenesisHash::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), hex);
    }

    #[test]
    fn genesis_hash_without_prefix() {
        let hex = "0d0971c150a9741b8719b3c6c9c2e96ec5b2e3fb83641af868e6650f3e263ef0";
        let hash = GenesisHash::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), format!("0x{}", hex));
    }

    #[test]
    fn genesis_hash_invalid_length() {
        assert!(GenesisHash::from_hex("0x1234").is_err());
        // Le marqueur "chaîne inconnue" du format de définition n'est pas un hash
        assert!(GenesisHash::from_hex("0x").is_err());
    }

    #[test]
    fn balance_key_concatenation() {
        let hash = GenesisHash::from_hex(
            "0x0d0971c150a9741b8719b3c6c9c2e96ec5b2e3fb83641af868e6650f3e263ef0",
        )
        .unwrap();
        let key = balance_key("5GrwvaEF", &hash);
        assert_eq!(
            key,
            "5GrwvaEF_0x0d0971c150a9741b8719b3c6c9c2e96ec5b2e3fb83641af868e6650f3e263ef0"
        );
    }

    #[test]
    fn asset_kind_picks_from_table() {
        let assets = Assets {
            cennz: Asset { id: 1, decimals: 4 },
            cpay: Asset { id: 2, decimals: 4 },
        };
        assert_eq!(AssetKind::Cennz.pick(&assets).id, 1);
        assert_eq!(AssetKind::Cpay.pick(&assets).id, 2);
    }

    #[test]
    fn default_balances_are_zeroed() {
        let balances = Balances::default();
        assert_eq!(balances.cennz, 0.0);
        assert_eq!(balances.cpay, 0.0);
    }
}
