//! Static table of known CENNZnet networks.

use bursar_core::models::{ChainEndpoint, GenesisHash};

/// Azalea (MainNet).
pub const AZALEA_GENESIS: &str =
    "0x0d0971c150a9741b8719b3c6c9c2e96ec5b2e3fb83641af868e6650f3e263ef0";
/// Nikau (TestNet).
pub const NIKAU_GENESIS: &str =
    "0xc65170707265757d8a1fb8e039062286b8f0092f2984f5938588bd8e0f21ca2e";
/// Rata (DevNet).
pub const RATA_GENESIS: &str =
    "0x6f2ca0f5c770a9212d30b49604b2e45e2d3c949a3a940bfe908d68dbc4a0415e";
/// Local development node.
pub const DEVELOPMENT_GENESIS: &str =
    "0xba29ccef64182e17dee0f9d8bbaddc69e439acdc9409149e5c409d696c14232e";

/// The four known networks with their WebSocket endpoints.
pub fn known_endpoints() -> Vec<ChainEndpoint> {
    vec![
        endpoint(
            "azalea",
            AZALEA_GENESIS,
            "wss://cennznet.unfrastructure.io/public/ws",
        ),
        endpoint("nikau", NIKAU_GENESIS, "wss://nikau.centrality.me/public/ws"),
        endpoint(
            "rata",
            RATA_GENESIS,
            "wss://kong2.centrality.me/public/rata/ws",
        ),
        endpoint("development", DEVELOPMENT_GENESIS, "ws://localhost:9944"),
    ]
}

/// Genesis hash of the network an operation falls back to when none is
/// given (Azalea).
pub fn default_genesis_hash() -> GenesisHash {
    parse_genesis(AZALEA_GENESIS)
}

/// Endpoint for a genesis hash, if the network is known.
pub fn endpoint_for(genesis_hash: &GenesisHash) -> Option<ChainEndpoint> {
    known_endpoints()
        .into_iter()
        .find(|e| &e.genesis_hash == genesis_hash)
}

/// Endpoint for a network name ("azalea", "nikau", ...), case-insensitive.
pub fn find_by_name(name: &str) -> Option<ChainEndpoint> {
    known_endpoints()
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}

/// Whether a chain is in the registry. `None` means "any chain" and is
/// supported iff `include_any`.
pub fn is_chain_supported(genesis_hash: Option<&GenesisHash>, include_any: bool) -> bool {
    match genesis_hash {
        None => include_any,
        Some(hash) => known_endpoints().iter().any(|e| &e.genesis_hash == hash),
    }
}

fn endpoint(name: &'static str, genesis_hash: &str, url: &'static str) -> ChainEndpoint {
    ChainEndpoint {
        name,
        genesis_hash: parse_genesis(genesis_hash),
        url,
    }
}

fn parse_genesis(hex: &str) -> GenesisHash {
    GenesisHash::from_hex(hex).expect("bundled genesis hashes are valid hex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks_are_supported() {
        for endpoint in known_endpoints() {
            assert!(is_chain_supported(Some(&endpoint.genesis_hash), false));
        }
    }

    #[test]
    fn test_unknown_network_is_not_supported() {
        let unknown = GenesisHash([0xee; 32]);
        assert!(!is_chain_supported(Some(&unknown), true));
    }

    #[test]
    fn test_no_chain_follows_include_any() {
        assert!(is_chain_supported(None, true));
        assert!(!is_chain_supported(None, false));
    }

    #[test]
    fn test_lookup_by_name_and_hash_agree() {
        let azalea = find_by_name("Azalea").unwrap();
        assert_eq!(azalea.genesis_hash, default_genesis_hash());
        assert_eq!(endpoint_for(&azalea.genesis_hash), Some(azalea));
    }
}
