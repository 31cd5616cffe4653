//! Substrate RPC client for CENNZnet chains.

use std::str::FromStr;

use async_trait::async_trait;
use subxt::backend::rpc::{RpcClient, rpc_params};
use subxt::ext::scale_value::{Composite, Primitive, Value, ValueDef};
use subxt::utils::AccountId32;
use subxt::{OnlineClient, PolkadotConfig};
use subxt_signer::SecretUri;
use subxt_signer::sr25519::Keypair;
use tracing::{debug, instrument, trace};
use url::Url;

use bursar_core::error::{ChainError, ChainResult};
use bursar_core::models::{AssetId, GenesisHash, RegisteredAsset, TransferReceipt};
use bursar_core::ports::{ChainClient, ChainConnector};

/// Connector dialing CENNZnet nodes over WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstrateConnector;

#[async_trait]
impl ChainConnector for SubstrateConnector {
    type Client = SubstrateClient;

    async fn connect(&self, endpoint: &str) -> ChainResult<SubstrateClient> {
        SubstrateClient::connect(endpoint).await
    }
}

/// Substrate client adapter implementing the ChainClient port.
pub struct SubstrateClient {
    client: OnlineClient<PolkadotConfig>,
    rpc: RpcClient,
}

impl SubstrateClient {
    /// Connect to a Substrate node.
    #[instrument(skip_all, fields(url = %ws_url))]
    pub async fn connect(ws_url: &str) -> ChainResult<Self> {
        let url = Url::parse(ws_url)
            .map_err(|e| ChainError::ConnectionFailed(format!("invalid endpoint {ws_url}: {e}")))?;

        debug!("Connecting to node");

        let rpc = RpcClient::from_url(url.as_str())
            .await
            .map_err(|e| ChainError::ConnectionFailed(e.to_string()))?;
        let client = OnlineClient::<PolkadotConfig>::from_rpc_client(rpc.clone())
            .await
            .map_err(|e| ChainError::ConnectionFailed(e.to_string()))?;

        debug!("Connected successfully");

        Ok(Self { client, rpc })
    }

    /// Fetch one `GenericAsset` storage entry at the latest block.
    async fn fetch_generic_asset(
        &self,
        entry: &str,
        keys: Vec<Value>,
    ) -> ChainResult<Option<Value<u32>>> {
        let query = subxt::dynamic::storage("GenericAsset", entry, keys);
        let storage = self
            .client
            .storage()
            .at_latest()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;
        let thunk = storage
            .fetch(&query)
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        thunk
            .map(|t| t.to_value().map_err(|e| ChainError::RpcError(e.to_string())))
            .transpose()
    }

    /// Fetch a `GenericAsset` asset-id entry (StakingAssetId / SpendingAssetId).
    async fn fetch_asset_id(&self, entry: &str) -> ChainResult<AssetId> {
        let value = self
            .fetch_generic_asset(entry, vec![])
            .await?
            .ok_or_else(|| {
                ChainError::RpcError(format!("GenericAsset::{entry} not present in storage"))
            })?;

        value_to_u128(&value)
            .and_then(|n| AssetId::try_from(n).ok())
            .ok_or_else(|| {
                ChainError::RpcError(format!("unexpected GenericAsset::{entry} value: {value:?}"))
            })
    }
}

#[async_trait]
impl ChainClient for SubstrateClient {
    async fn genesis_hash(&self) -> ChainResult<GenesisHash> {
        Ok(GenesisHash(self.client.genesis_hash().0))
    }

    async fn runtime_version(&self) -> ChainResult<u32> {
        Ok(self.client.runtime_version().spec_version)
    }

    async fn staking_asset_id(&self) -> ChainResult<AssetId> {
        self.fetch_asset_id("StakingAssetId").await
    }

    async fn spending_asset_id(&self) -> ChainResult<AssetId> {
        self.fetch_asset_id("SpendingAssetId").await
    }

    async fn registered_assets(&self) -> ChainResult<Vec<RegisteredAsset>> {
        let response: serde_json::Value = self
            .rpc
            .request("genericAsset_registeredAssets", rpc_params![])
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        Ok(parse_registered_assets(&response))
    }

    async fn free_balance(&self, asset: AssetId, address: &str) -> ChainResult<u128> {
        let account = AccountId32::from_str(address)
            .map_err(|_| ChainError::InvalidAddress(address.to_string()))?;

        let value = self
            .fetch_generic_asset(
                "FreeBalance",
                vec![Value::u128(asset.into()), Value::from_bytes(account.0)],
            )
            .await?;

        match value {
            // Absent storage means the account holds nothing
            None => Ok(0),
            Some(value) => value_to_u128(&value).ok_or_else(|| {
                ChainError::RpcError(format!("unexpected FreeBalance value: {value:?}"))
            }),
        }
    }

    #[instrument(skip(self, suri))]
    async fn submit_transfer(
        &self,
        suri: &str,
        asset: AssetId,
        dest: &str,
        amount: u128,
    ) -> ChainResult<TransferReceipt> {
        let uri = SecretUri::from_str(suri).map_err(|e| ChainError::Signer(e.to_string()))?;
        let signer = Keypair::from_uri(&uri).map_err(|e| ChainError::Signer(e.to_string()))?;
        let dest_account =
            AccountId32::from_str(dest).map_err(|_| ChainError::InvalidAddress(dest.to_string()))?;

        let call = subxt::dynamic::tx(
            "GenericAsset",
            "transfer",
            vec![
                Value::u128(asset.into()),
                Value::from_bytes(dest_account.0),
                Value::u128(amount),
            ],
        );

        let progress = self
            .client
            .tx()
            .sign_and_submit_then_watch_default(&call, &signer)
            .await
            .map_err(|e| ChainError::TransferFailed(e.to_string()))?;

        trace!("Transfer submitted, waiting for finalization");

        let in_block = progress
            .wait_for_finalized()
            .await
            .map_err(|e| ChainError::TransferFailed(e.to_string()))?;

        let block_hash = in_block.block_hash();
        let extrinsic_hash = in_block.extrinsic_hash();

        in_block
            .wait_for_success()
            .await
            .map_err(|e| ChainError::TransferFailed(e.to_string()))?;

        Ok(TransferReceipt {
            block_hash: format!("0x{}", hex::encode(block_hash.0)),
            extrinsic_hash: format!("0x{}", hex::encode(extrinsic_hash.0)),
        })
    }
}

// =============================================================================
// Decoding helpers
// =============================================================================

/// Extract a u128 from a scale value, unwrapping single-element newtype
/// composites (balances and asset ids are wrapped this way by some
/// runtime versions).
fn value_to_u128<T>(value: &Value<T>) -> Option<u128> {
    match &value.value {
        ValueDef::Primitive(Primitive::U128(n)) => Some(*n),
        ValueDef::Primitive(Primitive::I128(n)) => u128::try_from(*n).ok(),
        ValueDef::Composite(Composite::Unnamed(values)) if values.len() == 1 => {
            value_to_u128(&values[0])
        }
        ValueDef::Composite(Composite::Named(fields)) if fields.len() == 1 => {
            value_to_u128(&fields[0].1)
        }
        _ => None,
    }
}

/// Parse the `genericAsset_registeredAssets` response: an array of
/// `[assetId, { symbol, decimalPlaces }]` pairs. Malformed entries are
/// skipped.
fn parse_registered_assets(value: &serde_json::Value) -> Vec<RegisteredAsset> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries.iter().filter_map(parse_registered_asset).collect()
}

fn parse_registered_asset(entry: &serde_json::Value) -> Option<RegisteredAsset> {
    let pair = entry.as_array()?;
    let id = pair.first()?.as_u64().and_then(|n| AssetId::try_from(n).ok())?;
    let info = pair.get(1)?;
    let decimals = info.get("decimalPlaces")?.as_u64()? as u32;
    let symbol = parse_symbol(info.get("symbol"));

    Some(RegisteredAsset {
        id,
        symbol,
        decimals,
    })
}

/// Decode an asset symbol from the formats nodes emit: a plain string,
/// 0x-prefixed hex bytes, or a byte array.
fn parse_symbol(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => match s.strip_prefix("0x") {
            Some(hex_str) => hex::decode(hex_str)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_else(|| s.clone()),
            None => s.clone(),
        },
        Some(serde_json::Value::Array(items)) => {
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect();
            bytes
                .and_then(|b| String::from_utf8(b).ok())
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_u128_primitive() {
        assert_eq!(value_to_u128(&Value::u128(0)), Some(0));
        assert_eq!(value_to_u128(&Value::u128(12_340_000)), Some(12_340_000));
        assert_eq!(value_to_u128(&Value::bool(true)), None);
    }

    // Les runtimes encapsulent soldes et ids dans des newtypes selon la version
    #[test]
    fn test_value_to_u128_unwraps_newtypes() {
        let wrapped = Value::unnamed_composite(vec![Value::u128(16000)]);
        assert_eq!(value_to_u128(&wrapped), Some(16000));

        let named = Value::named_composite([("balance", Value::u128(42))]);
        assert_eq!(value_to_u128(&named), Some(42));

        let nested = Value::unnamed_composite(vec![Value::unnamed_composite(vec![Value::u128(7)])]);
        assert_eq!(value_to_u128(&nested), Some(7));
    }

    #[test]
    fn test_value_to_u128_rejects_multi_element() {
        let pair = Value::unnamed_composite(vec![Value::u128(1), Value::u128(2)]);
        assert_eq!(value_to_u128(&pair), None);
    }

    #[test]
    fn test_parse_registered_assets_all_symbol_formats() {
        let response = json!([
            [16000, { "symbol": "0x43454e4e5a", "decimalPlaces": 4 }],
            [16001, { "symbol": "CPAY", "decimalPlaces": 4 }],
            [17000, { "symbol": [84, 69, 83, 84], "decimalPlaces": 18 }]
        ]);

        let assets = parse_registered_assets(&response);
        assert_eq!(
            assets,
            vec![
                RegisteredAsset {
                    id: 16000,
                    symbol: "CENNZ".into(),
                    decimals: 4
                },
                RegisteredAsset {
                    id: 16001,
                    symbol: "CPAY".into(),
                    decimals: 4
                },
                RegisteredAsset {
                    id: 17000,
                    symbol: "TEST".into(),
                    decimals: 18
                },
            ]
        );
    }

    #[test]
    fn test_parse_registered_assets_skips_malformed_entries() {
        let response = json!([
            [16000, { "symbol": "CENNZ", "decimalPlaces": 4 }],
            [16001],
            "garbage",
            [16002, { "symbol": "NODEC" }]
        ]);

        let assets = parse_registered_assets(&response);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, 16000);
    }

    #[test]
    fn test_parse_registered_assets_non_array() {
        assert!(parse_registered_assets(&json!(null)).is_empty());
        assert!(parse_registered_assets(&json!({"not": "an array"})).is_empty());
    }
}
