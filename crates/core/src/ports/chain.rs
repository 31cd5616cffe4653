//! Port traits for the chain node interface.
//!
//! These traits define the opaque query/transaction interface the wallet
//! needs from a chain node. The implementation lives in the
//! infrastructure layer (`bursar-substrate`); tests use mocks.

use async_trait::async_trait;

use crate::error::ChainResult;
use crate::models::{AssetId, GenesisHash, RegisteredAsset, TransferReceipt};

/// Port trait for an established chain connection.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Genesis hash reported by the connected node.
    async fn genesis_hash(&self) -> ChainResult<GenesisHash>;

    /// Current runtime spec version of the connected node.
    async fn runtime_version(&self) -> ChainResult<u32>;

    /// Asset id of the staking token (CENNZ).
    async fn staking_asset_id(&self) -> ChainResult<AssetId>;

    /// Asset id of the spending token (CPAY).
    async fn spending_asset_id(&self) -> ChainResult<AssetId>;

    /// The chain's registered-assets table (id, symbol, decimal places).
    async fn registered_assets(&self) -> ChainResult<Vec<RegisteredAsset>>;

    /// Free balance of `address` for `asset`, in minor units.
    ///
    /// Missing storage means the account holds nothing; implementations
    /// return zero rather than an error.
    async fn free_balance(&self, asset: AssetId, address: &str) -> ChainResult<u128>;

    /// Sign a `GenericAsset::transfer` with the key derived from `suri`,
    /// submit it, and wait for finalization.
    async fn submit_transfer(
        &self,
        suri: &str,
        asset: AssetId,
        dest: &str,
        amount: u128,
    ) -> ChainResult<TransferReceipt>;
}

/// Port trait for dialing a chain endpoint.
///
/// One handshake per call; connection reuse is the concern of
/// [`crate::services::ConnectionCache`], not the connector.
#[async_trait]
pub trait ChainConnector: Send + Sync + 'static {
    type Client: ChainClient;

    /// Open a connection to a WebSocket endpoint.
    async fn connect(&self, endpoint: &str) -> ChainResult<Self::Client>;
}
