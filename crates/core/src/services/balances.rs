//! Balance fetching with a write-through snapshot cache.
//!
//! `get_balances` obtains the chain connection (triggering the handshake
//! if needed), queries the free balance of both chain assets, converts
//! minor units to display units, and stores the snapshot. `stored_balances`
//! reads the last snapshot without touching the network.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::error::ChainResult;
use crate::metrics::{FetchTimer, record_balance_fetch, record_chain_query_error};
use crate::models::{Balances, GenesisHash, balance_key};
use crate::ports::{BalancesStore, ChainClient, ChainConnector};
use crate::services::ConnectionCache;
use crate::units::to_display;

/// Balance fetching service.
pub struct BalanceService<C: ChainConnector, S: BalancesStore> {
    connections: Arc<ConnectionCache<C>>,
    store: Arc<S>,
}

impl<C: ChainConnector, S: BalancesStore> BalanceService<C, S> {
    pub fn new(connections: Arc<ConnectionCache<C>>, store: Arc<S>) -> Self {
        Self { connections, store }
    }

    /// Last fetched snapshot for an address on a chain, zeroed if none
    /// was ever fetched. Never touches the network.
    pub fn stored_balances(&self, address: &str, genesis_hash: &GenesisHash) -> Balances {
        self.store
            .get(&balance_key(address, genesis_hash))
            .unwrap_or_default()
    }

    /// Overwrite the stored snapshot for an address on a chain.
    pub fn save_balances(&self, address: &str, genesis_hash: &GenesisHash, balances: Balances) {
        self.store.set(&balance_key(address, genesis_hash), balances);
    }

    /// Fetch current balances for an address on a chain.
    ///
    /// Returns `Ok(None)` if the chain is not in the endpoint registry.
    /// Query failures propagate to the caller; the stored snapshot is
    /// left untouched in that case.
    #[instrument(skip(self, genesis_hash), fields(chain = %genesis_hash))]
    pub async fn get_balances(
        &self,
        address: &str,
        genesis_hash: &GenesisHash,
    ) -> ChainResult<Option<Balances>> {
        let Some(handle) = self.connections.ready(genesis_hash).await? else {
            trace!("Chain not in endpoint registry");
            return Ok(None);
        };

        let _timer = FetchTimer::new();
        let assets = &handle.assets;

        let (cennz_raw, cpay_raw) = futures::try_join!(
            handle.client.free_balance(assets.cennz.id, address),
            handle.client.free_balance(assets.cpay.id, address),
        )
        .map_err(|e| {
            record_chain_query_error("balances");
            e
        })?;

        let balances = Balances {
            cennz: to_display(cennz_raw, assets.cennz.decimals),
            cpay: to_display(cpay_raw, assets.cpay.decimals),
        };

        self.save_balances(address, genesis_hash, balances);
        record_balance_fetch();
        debug!(cennz = balances.cennz, cpay = balances.cpay, "Balances fetched");

        Ok(Some(balances))
    }
}
