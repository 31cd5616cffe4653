//! Generic-asset transfer submission.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{WalletError, WalletResult};
use crate::metrics::{record_chain_query_error, record_transfer_submitted};
use crate::models::{AssetKind, GenesisHash, TransferReceipt};
use crate::ports::{ChainClient, ChainConnector};
use crate::services::ConnectionCache;
use crate::units::parse_units;

/// Transfer submission service.
///
/// Amounts are display-unit strings; the asset table discovered during
/// the handshake determines the minor-unit scale. Signing keys are
/// supplied per call as an SURI and never stored.
pub struct TransferService<C: ChainConnector> {
    connections: Arc<ConnectionCache<C>>,
}

impl<C: ChainConnector> TransferService<C> {
    pub fn new(connections: Arc<ConnectionCache<C>>) -> Self {
        Self { connections }
    }

    /// Sign and submit a transfer, waiting for finalization.
    #[instrument(
        skip(self, suri, dest, asset, genesis_hash),
        fields(chain = %genesis_hash, asset = %asset)
    )]
    pub async fn transfer(
        &self,
        suri: &str,
        asset: AssetKind,
        dest: &str,
        amount: &str,
        genesis_hash: &GenesisHash,
    ) -> WalletResult<TransferReceipt> {
        let Some(handle) = self.connections.ready(genesis_hash).await? else {
            return Err(WalletError::UnsupportedChain(genesis_hash.to_hex()));
        };

        let entry = asset.pick(&handle.assets);
        let raw = parse_units(amount, entry.decimals)?;
        debug!(asset_id = entry.id, raw, "Submitting transfer");

        let receipt = handle
            .client
            .submit_transfer(suri, entry.id, dest, raw)
            .await
            .map_err(|e| {
                record_chain_query_error("transfer");
                WalletError::Chain(e)
            })?;

        record_transfer_submitted();
        info!(block = %receipt.block_hash, "💸 Transfer finalized");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChainError, ChainResult};
    use crate::models::{AssetId, ChainEndpoint, RegisteredAsset};
    use crate::ports::ChainClient;
    use crate::units::UnitsError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SURI: &str = "//Alice";
    const DEST: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    fn known_hash() -> GenesisHash {
        GenesisHash([0xaa; 32])
    }

    #[derive(Default)]
    struct Submitted {
        calls: Mutex<Vec<(AssetId, String, u128)>>,
    }

    struct MockClient {
        submitted: Arc<Submitted>,
    }

    #[async_trait]
    impl ChainClient for MockClient {
        async fn genesis_hash(&self) -> ChainResult<GenesisHash> {
            Ok(known_hash())
        }
        async fn runtime_version(&self) -> ChainResult<u32> {
            Ok(53)
        }
        async fn staking_asset_id(&self) -> ChainResult<AssetId> {
            Ok(16000)
        }
        async fn spending_asset_id(&self) -> ChainResult<AssetId> {
            Ok(16001)
        }
        async fn registered_assets(&self) -> ChainResult<Vec<RegisteredAsset>> {
            Ok(vec![
                RegisteredAsset {
                    id: 16000,
                    symbol: "CENNZ".into(),
                    decimals: 4,
                },
                RegisteredAsset {
                    id: 16001,
                    symbol: "CPAY".into(),
                    decimals: 4,
                },
            ])
        }
        async fn free_balance(&self, _asset: AssetId, _address: &str) -> ChainResult<u128> {
            Ok(0)
        }
        async fn submit_transfer(
            &self,
            _suri: &str,
            asset: AssetId,
            dest: &str,
            amount: u128,
        ) -> ChainResult<TransferReceipt> {
            self.submitted
                .calls
                .lock()
                .unwrap()
                .push((asset, dest.to_string(), amount));
            Ok(TransferReceipt {
                block_hash: "0xblock".into(),
                extrinsic_hash: "0xext".into(),
            })
        }
    }

    #[derive(Default)]
    struct MockConnector {
        submitted: Arc<Submitted>,
    }

    #[async_trait]
    impl ChainConnector for MockConnector {
        type Client = MockClient;

        async fn connect(&self, _endpoint: &str) -> ChainResult<MockClient> {
            Ok(MockClient {
                submitted: self.submitted.clone(),
            })
        }
    }

    fn service(connector: MockConnector) -> TransferService<MockConnector> {
        let endpoints = vec![ChainEndpoint {
            name: "test",
            genesis_hash: known_hash(),
            url: "ws://localhost:9944",
        }];
        TransferService::new(Arc::new(ConnectionCache::new(connector, endpoints)))
    }

    #[tokio::test]
    async fn test_transfer_scales_amount_by_asset_decimals() {
        let submitted = Arc::new(Submitted::default());
        let service = service(MockConnector {
            submitted: submitted.clone(),
        });

        let receipt = service
            .transfer(SURI, AssetKind::Cpay, DEST, "12.5", &known_hash())
            .await
            .unwrap();

        assert_eq!(receipt.block_hash, "0xblock");
        let calls = submitted.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(16001, DEST.to_string(), 125_000)]);
    }

    #[tokio::test]
    async fn test_transfer_unsupported_chain() {
        let service = service(MockConnector::default());
        let err = service
            .transfer(SURI, AssetKind::Cennz, DEST, "1", &GenesisHash([0xee; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedChain(_)));
    }

    #[tokio::test]
    async fn test_transfer_rejects_excess_precision() {
        let submitted = Arc::new(Submitted::default());
        let service = service(MockConnector {
            submitted: submitted.clone(),
        });

        let err = service
            .transfer(SURI, AssetKind::Cennz, DEST, "1.00001", &known_hash())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WalletError::InvalidAmount(UnitsError::TooManyDecimals { .. })
        ));
        // Rien n'a été soumis
        assert!(submitted.calls.lock().unwrap().is_empty());
    }
}
