//! Fee estimation module for the EVM transaction manager.
//!
//! This module defines the boundary between the attempt builder and the fee
//! estimation machinery. The builder never prices a transaction itself: it
//! asks an estimator for a fresh fee or for a bump of a previous one, and
//! treats any estimator failure as transient.

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;
use txm_types::{Fee, PriorAttempt};

/// Re-export implementations
pub mod implementations {
	pub mod fixed;
}

/// Errors that can occur during fee estimation.
#[derive(Debug, Error)]
pub enum EstimatorError {
	/// The estimator could not produce a fee, typically because the data it
	/// depends on is temporarily unavailable.
	#[error("fee estimation unavailable: {0}")]
	Unavailable(String),
	/// A bump was requested but the per-key ceiling leaves no room above
	/// the previous fee.
	#[error(
		"bumped fee of {previous} wei cannot be increased further, \
		 already at or above the configured maximum of {max_price} wei"
	)]
	BumpExceedsCeiling {
		/// The previous per-unit price in wei.
		previous: u128,
		/// The per-key maximum price in wei.
		max_price: u128,
	},
}

/// Trait defining the interface for fee estimators.
///
/// Implementations decide both the pricing model output (flat vs. priority)
/// and their own bump monotonicity policy; the full prior-attempt history is
/// supplied so a minimum percentage increase per rebroadcast can be
/// enforced. From the caller's perspective every method is retryable.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
	/// Estimates a fee and gas limit for a fresh attempt.
	///
	/// `gas_limit_ceiling` bounds the returned gas limit and `max_price`
	/// bounds the per-unit price for the sending key.
	async fn get_fee(
		&self,
		payload: &[u8],
		gas_limit_ceiling: u64,
		max_price: u128,
		from: Address,
		to: Address,
	) -> Result<(Fee, u64), EstimatorError>;

	/// Produces a strictly higher-priority replacement for a previous fee.
	///
	/// Returns an error when no valid bump exists under `max_price`; the
	/// returned fee always has the same kind as `previous_fee`.
	async fn bump_fee(
		&self,
		previous_fee: &Fee,
		previous_gas_limit: u64,
		max_price: u128,
		prior_attempts: &[PriorAttempt],
	) -> Result<(Fee, u64), EstimatorError>;
}
