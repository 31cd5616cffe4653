//! Chain metadata definitions and their expansion cache.
//!
//! A [`MetadataDef`] is the portable description of a chain: properties
//! plus an optional base64-encoded SCALE metadata blob. Expansion decodes
//! the blob into a queryable [`subxt::Metadata`] and is memoized per
//! genesis hash; the cache is invalidated only when the spec version
//! changes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use subxt::Metadata;
use subxt::ext::codec::Decode;

use bursar_core::error::{ChainError, ChainResult};
use bursar_core::models::GenesisHash;

use crate::registry;

/// Icon assumed when a definition carries none.
const DEFAULT_ICON: &str = "substrate";

// =============================================================================
// Definitions
// =============================================================================

/// Portable chain metadata definition.
///
/// Field names follow the published release JSON (camelCase). A genesis
/// hash of `"0x"` marks a definition for an unknown chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDef {
    /// Chain display name.
    pub chain: String,
    /// Genesis hash as a hex string.
    pub genesis_hash: String,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// Base64-encoded SCALE runtime metadata.
    #[serde(default)]
    pub meta_calls: Option<String>,
    /// Runtime spec version this definition was captured at.
    pub spec_version: u32,
    /// SS58 address format of the chain.
    pub ss58_format: u16,
    /// Decimal places of the native token.
    pub token_decimals: u32,
    /// Symbol of the native token.
    pub token_symbol: String,
    /// Chain-specific type overrides, carried verbatim.
    #[serde(default)]
    pub types: Option<serde_json::Value>,
    /// Signed-extension overrides, carried verbatim.
    #[serde(default)]
    pub user_extensions: Option<serde_json::Value>,
}

/// Expanded, queryable form of a [`MetadataDef`].
#[derive(Debug)]
pub struct ChainSpec {
    /// The definition this spec was expanded from.
    pub definition: MetadataDef,
    /// Parsed genesis hash; `None` for an unknown chain.
    pub genesis_hash: Option<GenesisHash>,
    /// Chain display name.
    pub name: String,
    /// Icon name.
    pub icon: String,
    /// Whether the definition did not name a real chain.
    pub is_unknown: bool,
    /// Whether a metadata blob was decoded.
    pub has_metadata: bool,
    /// Decoded runtime metadata, when present and not partial.
    pub metadata: Option<Metadata>,
    /// Runtime spec version.
    pub spec_version: u32,
    /// SS58 address format.
    pub ss58_format: u16,
    /// Decimal places of the native token.
    pub token_decimals: u32,
    /// Symbol of the native token.
    pub token_symbol: String,
}

// =============================================================================
// Expansion cache
// =============================================================================

/// Definition store plus memoized expansions.
pub struct MetadataCache {
    definitions: RwLock<HashMap<String, MetadataDef>>,
    expanded: RwLock<HashMap<GenesisHash, Arc<ChainSpec>>>,
}

impl MetadataCache {
    /// Empty cache with no definitions.
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            expanded: RwLock::new(HashMap::new()),
        }
    }

    /// Cache seeded with the bundled definitions of the known networks.
    ///
    /// Bundled definitions carry no metadata blob; full metadata comes
    /// from the release server (see [`crate::releases`]).
    pub fn bundled() -> Self {
        let cache = Self::new();
        for definition in bundled_definitions() {
            cache.add_metadata(definition);
        }
        cache
    }

    /// Expand a definition into a [`ChainSpec`].
    ///
    /// A cache hit (same genesis hash, same spec version) returns the
    /// previously built spec; a spec-version bump rebuilds it. Partial
    /// expansion skips blob decoding and is never cached, as are specs
    /// for unknown chains.
    pub fn expand(&self, definition: &MetadataDef, partial: bool) -> ChainResult<Arc<ChainSpec>> {
        let genesis_hash = GenesisHash::from_hex(&definition.genesis_hash).ok();

        if let Some(hash) = &genesis_hash {
            if let Some(cached) = self.read_expanded().get(hash) {
                if cached.spec_version == definition.spec_version {
                    return Ok(cached.clone());
                }
            }
        }

        let mut metadata = None;
        if !partial {
            if let Some(blob) = &definition.meta_calls {
                let bytes = BASE64.decode(blob).map_err(|e| {
                    ChainError::MetadataError(format!("invalid base64 metadata blob: {e}"))
                })?;
                let decoded = Metadata::decode(&mut &bytes[..]).map_err(|e| {
                    ChainError::MetadataError(format!("undecodable metadata blob: {e}"))
                })?;
                metadata = Some(decoded);
            }
        }
        let has_metadata = metadata.is_some();

        let spec = Arc::new(ChainSpec {
            genesis_hash: genesis_hash.clone(),
            name: definition.chain.clone(),
            icon: definition
                .icon
                .clone()
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            is_unknown: genesis_hash.is_none(),
            has_metadata,
            metadata,
            spec_version: definition.spec_version,
            ss58_format: definition.ss58_format,
            token_decimals: definition.token_decimals,
            token_symbol: definition.token_symbol.clone(),
            definition: definition.clone(),
        });

        if let Some(hash) = genesis_hash {
            if !partial {
                self.write_expanded().insert(hash, spec.clone());
            }
        }

        Ok(spec)
    }

    /// Expand the stored definition for a genesis hash, if one is known.
    pub fn find_chain(&self, genesis_hash: &GenesisHash) -> ChainResult<Option<Arc<ChainSpec>>> {
        let definition = self
            .read_definitions()
            .get(&genesis_hash.to_hex())
            .cloned();
        match definition {
            Some(definition) => self.expand(&definition, false).map(Some),
            None => Ok(None),
        }
    }

    /// Add or replace the definition for a chain.
    pub fn add_metadata(&self, definition: MetadataDef) {
        self.write_definitions()
            .insert(definition.genesis_hash.clone(), definition);
    }

    /// All stored definitions.
    pub fn known_metadata(&self) -> Vec<MetadataDef> {
        self.read_definitions().values().cloned().collect()
    }

    fn read_definitions(&self) -> RwLockReadGuard<'_, HashMap<String, MetadataDef>> {
        self.definitions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_definitions(&self) -> RwLockWriteGuard<'_, HashMap<String, MetadataDef>> {
        self.definitions.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_expanded(&self) -> RwLockReadGuard<'_, HashMap<GenesisHash, Arc<ChainSpec>>> {
        self.expanded.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_expanded(&self) -> RwLockWriteGuard<'_, HashMap<GenesisHash, Arc<ChainSpec>>> {
        self.expanded.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Definitions shipped with the binary for the known networks.
fn bundled_definitions() -> Vec<MetadataDef> {
    [
        (registry::AZALEA_GENESIS, "CENNZnet Azalea", 53),
        (registry::NIKAU_GENESIS, "CENNZnet Nikau", 48),
        (registry::RATA_GENESIS, "CENNZnet Rata", 48),
        (registry::DEVELOPMENT_GENESIS, "Development", 53),
    ]
    .into_iter()
    .map(|(genesis_hash, chain, spec_version)| MetadataDef {
        chain: chain.to_string(),
        genesis_hash: genesis_hash.to_string(),
        icon: None,
        meta_calls: None,
        spec_version,
        ss58_format: 42,
        token_decimals: 4,
        token_symbol: "CENNZ".to_string(),
        types: None,
        user_extensions: None,
    })
    .collect()
}
