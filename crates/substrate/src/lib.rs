//! Substrate RPC adapter for the bursar wallet service.
//!
//! This crate implements the [`ChainClient`] and [`ChainConnector`] ports
//! from `bursar-core`, providing connectivity to CENNZnet chains via
//! WebSocket RPC.
//!
//! # Features
//!
//! - Dynamic storage queries against the `GenericAsset` pallet
//!   (staking/spending asset ids, free balances)
//! - Registered-assets lookup via the `genericAsset_registeredAssets` RPC
//! - Signed `GenericAsset::transfer` submission with finalization tracking
//!
//! # Usage
//!
//! ```ignore
//! use bursar_substrate::SubstrateClient;
//!
//! let client = SubstrateClient::connect("ws://localhost:9944").await?;
//! let cennz = client.staking_asset_id().await?;
//! let balance = client.free_balance(cennz, address).await?;
//! ```
//!
//! # Architecture
//!
//! The client wraps a subxt `OnlineClient` plus the raw RPC handle. Query
//! results are decoded dynamically (no generated runtime API), so the
//! adapter works across runtime upgrades without regeneration.
//!
//! [`ChainClient`]: bursar_core::ports::ChainClient
//! [`ChainConnector`]: bursar_core::ports::ChainConnector

mod client;

pub use client::{SubstrateClient, SubstrateConnector};
