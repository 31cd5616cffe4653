//! Core domain layer for the bursar wallet service.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! business logic services of the wallet backend. It follows hexagonal
//! architecture principles - this is the innermost layer with no
//! dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      bursar (binary)                        │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │        bursar-chains         │       bursar-substrate       │
//! │  (endpoints, chain metadata) │            (RPC)             │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                     bursar-core  ← YOU ARE HERE             │
//! │                  (models, ports, services)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (GenesisHash, Assets, Balances, etc.)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Core business logic (connection cache, balances, transfers)
//! - [`units`] - Minor-unit / display-unit conversion
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Connection lifecycle
//!
//! Each known chain has at most one [`services::Connection`], shared by
//! every caller. Its lifecycle is {absent} → {connecting} → {ready},
//! monotonic. The handshake is single-flight: concurrent callers await
//! the same attempt rather than dialing twice.
//!
//! ## Ports
//!
//! Ports define interfaces that external adapters must implement:
//!
//! - [`ports::ChainConnector`] / [`ports::ChainClient`] - dial and query
//!   a chain node
//! - [`ports::BalancesStore`] - balance snapshot storage
//!
//! All state is in-memory and resets on process restart.

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
pub mod units;
