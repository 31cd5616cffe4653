//! Error types for the wallet domain layer.
//!
//! Two layers:
//!
//! - [`ChainError`] - connectivity and RPC errors from a chain node
//! - [`WalletError`] - wallet-level operation errors
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across the boundary.

use thiserror::Error;

use crate::units::UnitsError;

// =============================================================================
// Chain Errors
// =============================================================================

/// Blockchain RPC and connectivity errors.
///
/// These errors occur when dialing or querying a chain node over
/// WebSocket RPC.
#[derive(Debug, Error)]
pub enum ChainError {
    /// WebSocket connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The node answers for a different chain than the one requested.
    #[error("Genesis mismatch: node reports {connected} but {expected} was requested")]
    GenesisMismatch {
        /// Genesis hash reported by the node.
        connected: String,
        /// Genesis hash the connection was opened for.
        expected: String,
    },

    /// RPC request failed.
    #[error("RPC error: {0}")]
    RpcError(String),

    /// Chain metadata could not be decoded or expanded.
    #[error("Metadata error: {0}")]
    MetadataError(String),

    /// An address failed SS58 decoding.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signing key could not be built from the supplied URI.
    #[error("Signer error: {0}")]
    Signer(String),

    /// Transfer submission or finalization failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),
}

// =============================================================================
// Wallet Errors
// =============================================================================

/// Wallet-level operation errors.
///
/// Top-level error type for the consumer-facing operations. Wraps chain
/// errors and adds input-validation variants.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Chain connectivity error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Display amount could not be converted to minor units.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] UnitsError),

    /// Operation targeted a chain outside the endpoint registry.
    ///
    /// Lookups express this as `None`; operations with no value to return
    /// (e.g. transfer) use this variant instead.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la chaîne de conversion d'erreurs fonctionne
    #[test]
    fn test_error_conversion_chain() {
        let chain_err = ChainError::RpcError("rpc failed".into());
        let wallet_err: WalletError = chain_err.into();
        assert!(wallet_err.to_string().contains("rpc failed"));
    }

    #[test]
    fn test_genesis_mismatch_includes_hashes() {
        let err = ChainError::GenesisMismatch {
            connected: "0xaaa".into(),
            expected: "0xbbb".into(),
        };
        let msg = err.to_string();
        // Les deux hashes doivent être visibles pour le debug
        assert!(msg.contains("0xaaa") && msg.contains("0xbbb"));
    }
}
