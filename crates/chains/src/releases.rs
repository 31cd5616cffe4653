//! Published metadata release lookups.
//!
//! When the definition stored locally is outdated, the latest metadata
//! blob and type overrides for the known networks are published as JSON
//! files alongside the chain's client library releases. Fetch failures
//! are logged and surface as `None`; a stale definition still works.

use serde_json::Value;
use tracing::warn;

use bursar_core::models::GenesisHash;

/// Published `metaCalls.json`: `{ "metaCalls": { "<genesisHash>-<specVersion>": "<base64>" } }`.
pub const META_CALLS_URL: &str =
    "https://raw.githubusercontent.com/cennznet/api.js/master/extension-releases/metaCalls.json";

/// Published `runtimeModuleTypes.json`: `{ "<genesisHash>": { "types": .., "userExtensions": .. } }`.
pub const RUNTIME_TYPES_URL: &str =
    "https://raw.githubusercontent.com/cennznet/api.js/master/extension-releases/runtimeModuleTypes.json";

/// Latest published metadata blob for a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFetched {
    /// Base64-encoded SCALE runtime metadata.
    pub meta_calls: String,
    /// Spec version the blob was captured at.
    pub spec_version: u32,
}

/// Published type overrides for a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeTypes {
    /// Chain-specific type definitions.
    pub types: Value,
    /// Signed-extension overrides, if published.
    pub user_extensions: Option<Value>,
}

/// Client for the published release files.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    meta_calls_url: String,
    runtime_types_url: String,
}

impl ReleaseClient {
    /// Client pointed at the published release files.
    pub fn new() -> Self {
        Self::with_urls(META_CALLS_URL, RUNTIME_TYPES_URL)
    }

    /// Client with overridden URLs.
    pub fn with_urls(meta_calls_url: &str, runtime_types_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            meta_calls_url: meta_calls_url.to_string(),
            runtime_types_url: runtime_types_url.to_string(),
        }
    }

    /// Latest published metadata for a chain; `None` when the chain has
    /// no release or the fetch fails.
    pub async fn latest_meta(&self, genesis_hash: &GenesisHash) -> Option<MetadataFetched> {
        match self.fetch_json(&self.meta_calls_url).await {
            Ok(doc) => parse_meta_release(&doc, genesis_hash),
            Err(e) => {
                warn!(error = %e, "Failed to fetch metadata release");
                None
            }
        }
    }

    /// Latest published type overrides for a chain; `None` when absent
    /// or the fetch fails.
    pub async fn latest_types(&self, genesis_hash: &GenesisHash) -> Option<RuntimeTypes> {
        match self.fetch_json(&self.runtime_types_url).await {
            Ok(doc) => parse_types_release(&doc, genesis_hash),
            Err(e) => {
                warn!(error = %e, "Failed to fetch runtime types release");
                None
            }
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

impl Default for ReleaseClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the release entry for a chain from a `metaCalls.json` document.
/// Keys are `<genesisHash>-<specVersion>`.
pub fn parse_meta_release(doc: &Value, genesis_hash: &GenesisHash) -> Option<MetadataFetched> {
    let meta_calls = doc.get("metaCalls")?.as_object()?;
    let prefix = format!("{}-", genesis_hash.to_hex());

    let (key, value) = meta_calls.iter().find(|(k, _)| k.starts_with(&prefix))?;
    let spec_version = key.split('-').nth(1)?.parse().ok()?;

    Some(MetadataFetched {
        meta_calls: value.as_str()?.to_string(),
        spec_version,
    })
}

/// Extract the type overrides for a chain from a `runtimeModuleTypes.json`
/// document.
pub fn parse_types_release(doc: &Value, genesis_hash: &GenesisHash) -> Option<RuntimeTypes> {
    let entry = doc.get(genesis_hash.to_hex())?;
    let types = entry.get("types")?.clone();

    Some(RuntimeTypes {
        types,
        user_extensions: entry.get("userExtensions").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genesis() -> GenesisHash {
        GenesisHash([0xaa; 32])
    }

    fn genesis_hex() -> String {
        genesis().to_hex()
    }

    #[test]
    fn test_parse_meta_release() {
        let key = format!("{}-53", genesis_hex());
        let doc = json!({
            "metaCalls": {
                key: "bWV0YQ==",
                "0xother-7": "aXJyZWxldmFudA=="
            }
        });

        let fetched = parse_meta_release(&doc, &genesis()).unwrap();
        assert_eq!(fetched.spec_version, 53);
        assert_eq!(fetched.meta_calls, "bWV0YQ==");
    }

    #[test]
    fn test_parse_meta_release_missing_chain() {
        let doc = json!({ "metaCalls": { "0xother-7": "aXJyZWxldmFudA==" } });
        assert_eq!(parse_meta_release(&doc, &genesis()), None);
    }

    #[test]
    fn test_parse_meta_release_malformed_document() {
        assert_eq!(parse_meta_release(&json!({}), &genesis()), None);
        assert_eq!(parse_meta_release(&json!({"metaCalls": 3}), &genesis()), None);
        // Version de spec illisible
        let key = format!("{}-abc", genesis_hex());
        let doc = json!({ "metaCalls": { key: "bWV0YQ==" } });
        assert_eq!(parse_meta_release(&doc, &genesis()), None);
    }

    #[test]
    fn test_parse_types_release() {
        let key = genesis_hex();
        let doc = json!({
            key: {
                "types": { "AssetInfo": { "symbol": "Vec<u8>", "decimalPlaces": "u8" } },
                "userExtensions": { "CheckMaintenance": {} }
            }
        });

        let types = parse_types_release(&doc, &genesis()).unwrap();
        assert!(types.types.get("AssetInfo").is_some());
        assert!(types.user_extensions.is_some());
    }

    #[test]
    fn test_parse_types_release_missing_chain() {
        assert_eq!(parse_types_release(&json!({}), &genesis()), None);
    }
}
