//! Per-chain connection cache.
//!
//! At most one [`Connection`] exists per genesis hash; every caller shares
//! it. The lifecycle of an entry is {absent} → {connecting} → {ready} and
//! is monotonic: a ready connection is never torn down or replaced for the
//! lifetime of the process.
//!
//! The handshake is single-flight: the first caller to drive a connection
//! runs it, concurrent callers await the same attempt. A failed attempt
//! leaves the entry in {connecting}; the next caller starts a fresh
//! attempt. There is no automatic retry, backoff, timeout, or reconnection
//! on drop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{ChainError, ChainResult};
use crate::metrics::{
    record_chain_query_error, record_connection_attempt, record_connection_established,
};
use crate::models::{Asset, Assets, ChainEndpoint, DEFAULT_DECIMALS, GenesisHash};
use crate::ports::{ChainClient, ChainConnector};

// =============================================================================
// Connection
// =============================================================================

/// The ready state of a connection: the live client plus the chain's
/// asset table.
///
/// The asset table is populated once during the handshake and immutable
/// after; it is published together with the client in a single step, so
/// no caller can observe a partially discovered table.
#[derive(Debug)]
pub struct ChainHandle<T> {
    /// Live chain client.
    pub client: T,
    /// Asset ids and decimal places discovered during the handshake.
    pub assets: Assets,
}

/// A live or pending connection to one chain.
pub struct Connection<T> {
    genesis_hash: GenesisHash,
    endpoint: &'static str,
    state: OnceCell<Arc<ChainHandle<T>>>,
}

impl<T> Connection<T> {
    /// Genesis hash this connection is bound to.
    pub fn genesis_hash(&self) -> &GenesisHash {
        &self.genesis_hash
    }

    /// WebSocket endpoint this connection dials.
    pub fn endpoint(&self) -> &str {
        self.endpoint
    }

    /// Whether the handshake has not completed yet.
    pub fn is_connecting(&self) -> bool {
        self.state.get().is_none()
    }

    /// The ready state, if the handshake has completed.
    pub fn handle(&self) -> Option<Arc<ChainHandle<T>>> {
        self.state.get().cloned()
    }
}

// =============================================================================
// ConnectionCache
// =============================================================================

/// Lazy, memoized per-chain connection cache.
///
/// Holds the endpoint table injected at construction and one
/// [`Connection`] per genesis hash, created on first request.
pub struct ConnectionCache<C: ChainConnector> {
    connector: C,
    endpoints: HashMap<GenesisHash, ChainEndpoint>,
    connections: Mutex<HashMap<GenesisHash, Arc<Connection<C::Client>>>>,
}

impl<C: ChainConnector> ConnectionCache<C> {
    /// Create a cache over the given endpoint table.
    pub fn new(connector: C, endpoints: impl IntoIterator<Item = ChainEndpoint>) -> Self {
        Self {
            connector,
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.genesis_hash.clone(), e))
                .collect(),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a genesis hash is in the endpoint table.
    pub fn is_known(&self, genesis_hash: &GenesisHash) -> bool {
        self.endpoints.contains_key(genesis_hash)
    }

    /// Get the connection for a chain, creating a {connecting} entry on
    /// first request. Returns `None` for a chain outside the endpoint
    /// table. Never blocks on I/O.
    ///
    /// Identity is stable: every call for the same genesis hash returns
    /// the same `Arc` while connecting or ready.
    pub fn get(&self, genesis_hash: &GenesisHash) -> Option<Arc<Connection<C::Client>>> {
        let mut connections = self.lock();
        if let Some(connection) = connections.get(genesis_hash) {
            return Some(connection.clone());
        }

        let endpoint = self.endpoints.get(genesis_hash)?;
        let connection = Arc::new(Connection {
            genesis_hash: genesis_hash.clone(),
            endpoint: endpoint.url,
            state: OnceCell::new(),
        });
        connections.insert(genesis_hash.clone(), connection.clone());
        Some(connection)
    }

    /// Get the ready state for a chain, driving the handshake if needed.
    ///
    /// Returns `Ok(None)` for an unknown chain. Concurrent callers for
    /// the same chain share a single handshake.
    pub async fn ready(
        &self,
        genesis_hash: &GenesisHash,
    ) -> ChainResult<Option<Arc<ChainHandle<C::Client>>>> {
        let Some(connection) = self.get(genesis_hash) else {
            return Ok(None);
        };

        let handle = connection
            .state
            .get_or_try_init(|| async {
                record_connection_attempt();
                match self.handshake(&connection).await {
                    Ok(handle) => Ok(Arc::new(handle)),
                    Err(e) => {
                        record_chain_query_error("connect");
                        warn!(chain = %connection.genesis_hash, error = %e, "⚠️  Chain handshake failed");
                        Err(e)
                    }
                }
            })
            .await?
            .clone();

        Ok(Some(handle))
    }

    /// Dial the endpoint, verify the chain identity, and discover the
    /// asset table.
    async fn handshake(
        &self,
        connection: &Connection<C::Client>,
    ) -> ChainResult<ChainHandle<C::Client>> {
        debug!(
            chain = %connection.genesis_hash,
            endpoint = %connection.endpoint,
            "Opening chain connection"
        );

        let client = self.connector.connect(connection.endpoint).await?;

        let connected = client.genesis_hash().await?;
        if connected != connection.genesis_hash {
            return Err(ChainError::GenesisMismatch {
                connected: connected.to_hex(),
                expected: connection.genesis_hash.to_hex(),
            });
        }

        let assets = discover_assets(&client).await?;
        record_connection_established();
        debug!(
            chain = %connection.genesis_hash,
            cennz = assets.cennz.id,
            cpay = assets.cpay.id,
            "Chain connection ready"
        );

        Ok(ChainHandle { client, assets })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GenesisHash, Arc<Connection<C::Client>>>> {
        self.connections.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Discover the chain's asset table: staking/spending asset ids, then
/// decimal places from the registered-assets table. A failing
/// registered-assets query falls back to [`DEFAULT_DECIMALS`] instead of
/// failing the handshake.
async fn discover_assets<T: ChainClient>(client: &T) -> ChainResult<Assets> {
    let (cennz_id, cpay_id) =
        futures::try_join!(client.staking_asset_id(), client.spending_asset_id())?;

    let mut assets = Assets {
        cennz: Asset {
            id: cennz_id,
            decimals: DEFAULT_DECIMALS,
        },
        cpay: Asset {
            id: cpay_id,
            decimals: DEFAULT_DECIMALS,
        },
    };

    match client.registered_assets().await {
        Ok(registered) => {
            for asset in registered {
                if asset.id == cennz_id {
                    assets.cennz.decimals = asset.decimals;
                } else if asset.id == cpay_id {
                    assets.cpay.decimals = asset.decimals;
                }
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                "Registered assets unavailable, assuming {} decimal places",
                DEFAULT_DECIMALS
            );
        }
    }

    Ok(assets)
}
