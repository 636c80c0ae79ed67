//! Attempt construction and fee bumping for the EVM transaction manager.
//!
//! Given a logical pending transaction, this module produces a correctly
//! priced, correctly typed, signed candidate for broadcast, and, when that
//! candidate is not accepted in time, a strictly higher-priority
//! replacement. It orchestrates the fee estimator, the validation rules, the
//! transaction assemblers, and the signing adapter; it performs no network
//! I/O and persists nothing. All failure paths carry an explicit retryable
//! classification via [`AttemptError::is_retryable`] so the caller's backoff
//! policy never needs to inspect error text.

use alloy_consensus::TxType;
use alloy_primitives::{Address, Bytes, U256};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use txm_account::{AccountError, AccountService};
use txm_gas::{EstimatorError, FeeEstimator};
use txm_types::{AttemptState, Fee, PriorAttempt, Tx, TxAttempt};

/// Unsigned transaction assemblers.
pub mod assemble;
/// Fee validation rules.
pub mod validation;

pub use validation::ValidationError;

/// Per-chain fee policy consumed by the attempt builder.
///
/// Read-only configuration: the builder never mutates it, and an immutable
/// snapshot implementation is enough for every operation.
pub trait FeePolicy: Send + Sync {
	/// Whether fresh attempts use priority (EIP-1559) pricing.
	fn priority_fees_enabled(&self) -> bool;
	/// Maximum allowed price (or fee cap) per gas unit for a sending key,
	/// in wei.
	fn max_price_for_key(&self, address: Address) -> u128;
	/// Gas limit used for attempts with no payload, such as purges.
	fn default_gas_limit(&self) -> u64;
}

/// Immutable fee policy snapshot with optional per-key ceilings.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFeePolicy {
	/// Whether fresh attempts use priority (EIP-1559) pricing.
	pub priority_fees_enabled: bool,
	/// Chain-wide maximum price per gas unit, in wei.
	pub max_price: u128,
	/// Per-key overrides of `max_price`.
	#[serde(default)]
	pub max_price_per_key: HashMap<Address, u128>,
	/// Gas limit used for attempts with no payload.
	pub default_gas_limit: u64,
}

impl FeePolicy for StaticFeePolicy {
	fn priority_fees_enabled(&self) -> bool {
		self.priority_fees_enabled
	}

	fn max_price_for_key(&self, address: Address) -> u128 {
		self.max_price_per_key
			.get(&address)
			.copied()
			.unwrap_or(self.max_price)
	}

	fn default_gas_limit(&self) -> u64 {
		self.default_gas_limit
	}
}

/// Errors that can occur while building an attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
	/// The estimator could not produce a fresh fee. Retryable.
	#[error("failed to get fee: {0}")]
	FeeEstimation(#[source] EstimatorError),
	/// The estimator could not produce a bumped fee. Retryable.
	#[error("failed to bump fee: {0}")]
	FeeBump(#[source] EstimatorError),
	/// A fee failed the validation rules.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The signer rejected the transaction or the address.
	#[error("error using account {address} to sign transaction: {source}")]
	Signing {
		address: Address,
		#[source]
		source: AccountError,
	},
	/// The requested transaction type and the supplied fee shape disagree.
	/// Always a caller or estimator bug, never recoverable by retrying.
	#[error("tx {tx_id} requested a {expected:?} attempt but the fee is a {fee}")]
	FeeTypeMismatch {
		tx_id: u64,
		expected: TxType,
		fee: Fee,
	},
	/// A transaction type outside the two supported fee models.
	#[error("unrecognized transaction type {0:?}")]
	UnrecognizedTxType(TxType),
	/// A purge was requested for a transaction that was never broadcast.
	#[error("cannot purge tx {0}: it has no prior attempts")]
	NoPriorAttempts(u64),
	/// The estimator failed while pricing a purge attempt. Unlike a plain
	/// bump this is not retryable here; retry policy for purges belongs to
	/// the caller.
	#[error("failed to bump previous fee to use for the purge attempt: {0}")]
	PurgeFeeBump(#[source] EstimatorError),
	/// Building or signing the purge attempt failed.
	#[error("failed to create purge attempt: {0}")]
	Purge(#[source] Box<AttemptError>),
	/// An empty (probe) attempt was requested with a non-flat fee.
	#[error("empty attempt requires a flat fee, got {0}")]
	EmptyAttemptRequiresFlatFee(Fee),
}

impl AttemptError {
	/// Whether the operation may be retried as-is. Only transient estimator
	/// failures on the fresh and bump paths qualify; everything else needs
	/// a configuration, caller, or key-store change first.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			AttemptError::FeeEstimation(_) | AttemptError::FeeBump(_)
		)
	}
}

/// Builds signed transaction attempts for one chain.
///
/// Stateless beyond its configuration: safe to share across tasks for
/// distinct transactions. Callers must serialize attempt construction per
/// sequence number themselves.
pub struct AttemptBuilder {
	chain_id: u64,
	policy: Arc<dyn FeePolicy>,
	account: Arc<AccountService>,
	estimator: Arc<dyn FeeEstimator>,
}

impl AttemptBuilder {
	pub fn new(
		chain_id: u64,
		policy: Arc<dyn FeePolicy>,
		account: Arc<AccountService>,
		estimator: Arc<dyn FeeEstimator>,
	) -> Self {
		Self {
			chain_id,
			policy,
			account,
			estimator,
		}
	}

	/// Builds a fresh attempt, selecting the transaction type from the fee
	/// policy. Used when a brand new transaction enters the manager.
	pub async fn new_attempt(&self, tx: &Tx) -> Result<TxAttempt, AttemptError> {
		let tx_type = if self.policy.priority_fees_enabled() {
			TxType::Eip1559
		} else {
			TxType::Legacy
		};
		self.new_attempt_with_type(tx, tx_type).await
	}

	/// Builds a fresh attempt with a caller-specified transaction type.
	/// Used for re-estimation on broadcast where the type is pinned.
	pub async fn new_attempt_with_type(
		&self,
		tx: &Tx,
		tx_type: TxType,
	) -> Result<TxAttempt, AttemptError> {
		let max_price = self.policy.max_price_for_key(tx.from);
		let (fee, gas_limit) = self
			.estimator
			.get_fee(&tx.payload, tx.gas_limit, max_price, tx.from, tx.to)
			.await
			.map_err(AttemptError::FeeEstimation)?;

		self.new_custom_attempt(tx, fee, gas_limit, tx_type).await
	}

	/// Builds a replacement attempt at a bumped fee, preserving the previous
	/// attempt's transaction type. Used when an attempt is rejected for too
	/// low a fee or is not included in a timely manner.
	#[instrument(skip_all, fields(tx_id = tx.id))]
	pub async fn new_bump_attempt(
		&self,
		tx: &Tx,
		previous: &TxAttempt,
		prior_attempts: &[TxAttempt],
	) -> Result<TxAttempt, AttemptError> {
		let max_price = self.policy.max_price_for_key(tx.from);
		let prior: Vec<PriorAttempt> = prior_attempts.iter().map(PriorAttempt::from).collect();
		// Keep the previous attempt's gas limit so adjustments made by
		// earlier estimation survive the bump
		let (bumped_fee, mut bumped_gas_limit) = self
			.estimator
			.bump_fee(&previous.fee, previous.gas_limit, max_price, &prior)
			.await
			.map_err(AttemptError::FeeBump)?;

		// A bump of a cancellation is still a cancellation: empty payload,
		// zero value, default gas limit
		let mut etx = tx.clone();
		if previous.is_purge {
			etx.payload = Bytes::new();
			etx.value = U256::ZERO;
			bumped_gas_limit = self.policy.default_gas_limit();
		}

		let mut attempt = self
			.new_custom_attempt(&etx, bumped_fee, bumped_gas_limit, previous.tx_type)
			.await?;
		attempt.is_purge = previous.is_purge;
		Ok(attempt)
	}

	/// Builds a cancellation attempt: the transaction's slot is repurposed
	/// with an empty payload and zero value at a bumped fee.
	///
	/// The fee baseline is the transaction's first prior attempt, not its
	/// most recent one, so repeated purges do not compound bump percentages.
	#[instrument(skip_all, fields(tx_id = tx.id))]
	pub async fn new_purge_attempt(&self, tx: &Tx) -> Result<TxAttempt, AttemptError> {
		// A transaction can only be purged after having been broadcast once
		let baseline = tx
			.attempts
			.first()
			.ok_or(AttemptError::NoPriorAttempts(tx.id))?;
		// An empty transaction only ever needs the default gas limit
		let gas_limit = self.policy.default_gas_limit();
		let max_price = self.policy.max_price_for_key(tx.from);
		let prior: Vec<PriorAttempt> = tx.attempts.iter().map(PriorAttempt::from).collect();
		let (bumped_fee, _) = self
			.estimator
			.bump_fee(&baseline.fee, tx.gas_limit, max_price, &prior)
			.await
			.map_err(AttemptError::PurgeFeeBump)?;

		let mut etx = tx.clone();
		etx.payload = Bytes::new();
		etx.value = U256::ZERO;

		let mut attempt = self
			.new_custom_attempt(&etx, bumped_fee, gas_limit, baseline.tx_type)
			.await
			.map_err(|e| AttemptError::Purge(Box::new(e)))?;
		attempt.is_purge = true;
		Ok(attempt)
	}

	/// The lowest-level constructor: fee, gas limit, and transaction type
	/// are fully pre-determined by the caller. Used for forced rebroadcast
	/// where no estimator is consulted.
	pub async fn new_custom_attempt(
		&self,
		tx: &Tx,
		fee: Fee,
		gas_limit: u64,
		tx_type: TxType,
	) -> Result<TxAttempt, AttemptError> {
		match tx_type {
			TxType::Legacy => {
				let Fee::Flat { price } = fee else {
					let err = AttemptError::FeeTypeMismatch {
						tx_id: tx.id,
						expected: TxType::Legacy,
						fee,
					};
					tracing::error!(tx_id = tx.id, %fee, "assumption violation: {err}");
					return Err(err);
				};
				self.new_legacy_attempt(tx, price, gas_limit).await
			}
			TxType::Eip1559 => {
				let Fee::Priority { tip, cap } = fee else {
					let err = AttemptError::FeeTypeMismatch {
						tx_id: tx.id,
						expected: TxType::Eip1559,
						fee,
					};
					tracing::error!(tx_id = tx.id, %fee, "assumption violation: {err}");
					return Err(err);
				};
				self.new_dynamic_fee_attempt(tx, tip, cap, gas_limit).await
			}
			other => {
				let err = AttemptError::UnrecognizedTxType(other);
				tracing::error!(tx_id = tx.id, tx_type = ?other, "assumption violation: {err}");
				Err(err)
			}
		}
	}

	/// Builds and signs a zero-value, empty-payload, flat-fee attempt sent
	/// to the sending address itself. Used to probe the liveness of a
	/// sender key without any estimator involvement.
	///
	/// Probe attempts are not tied to a stored transaction; `tx_id` is zero.
	pub async fn new_empty_attempt(
		&self,
		sequence: u64,
		gas_limit: u64,
		fee: Fee,
		from: Address,
	) -> Result<TxAttempt, AttemptError> {
		let Fee::Flat { price } = fee else {
			return Err(AttemptError::EmptyAttemptRequiresFlatFee(fee));
		};

		let unsigned = assemble::legacy(sequence, from, U256::ZERO, gas_limit, price, Bytes::new());
		let signed = self
			.account
			.sign(from, &unsigned)
			.await
			.map_err(|source| AttemptError::Signing {
				address: from,
				source,
			})?;

		Ok(TxAttempt {
			tx_id: 0,
			hash: signed.hash,
			signed_raw: signed.raw,
			fee,
			gas_limit,
			tx_type: TxType::Legacy,
			state: AttemptState::InProgress,
			is_purge: false,
			broadcast_before_block: None,
		})
	}

	async fn new_legacy_attempt(
		&self,
		tx: &Tx,
		price: u128,
		gas_limit: u64,
	) -> Result<TxAttempt, AttemptError> {
		let fee = Fee::Flat { price };
		validation::validate_fee(&fee, tx.from, self.policy.as_ref())?;

		let unsigned = assemble::legacy(
			tx.sequence,
			tx.to,
			tx.value,
			gas_limit,
			price,
			tx.payload.clone(),
		);
		self.sign_attempt(tx, unsigned, fee, gas_limit, TxType::Legacy)
			.await
	}

	async fn new_dynamic_fee_attempt(
		&self,
		tx: &Tx,
		tip: u128,
		cap: u128,
		gas_limit: u64,
	) -> Result<TxAttempt, AttemptError> {
		let fee = Fee::Priority { tip, cap };
		validation::validate_fee(&fee, tx.from, self.policy.as_ref())?;

		let unsigned = assemble::dynamic_fee(
			self.chain_id,
			tx.sequence,
			tx.to,
			tx.value,
			gas_limit,
			tip,
			cap,
			tx.payload.clone(),
		);
		self.sign_attempt(tx, unsigned, fee, gas_limit, TxType::Eip1559)
			.await
	}

	async fn sign_attempt(
		&self,
		tx: &Tx,
		unsigned: txm_types::UnsignedTx,
		fee: Fee,
		gas_limit: u64,
		tx_type: TxType,
	) -> Result<TxAttempt, AttemptError> {
		let signed = self
			.account
			.sign(tx.from, &unsigned)
			.await
			.map_err(|source| AttemptError::Signing {
				address: tx.from,
				source,
			})?;

		Ok(TxAttempt {
			tx_id: tx.id,
			hash: signed.hash,
			signed_raw: signed.raw,
			fee,
			gas_limit,
			tx_type,
			state: AttemptState::InProgress,
			is_purge: false,
			broadcast_before_block: None,
		})
	}
}
