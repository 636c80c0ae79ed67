//! Logical transactions and their broadcast attempts.
//!
//! A logical transaction represents one intended on-chain action,
//! independent of how many times it has been (re)attempted. Each attempt is
//! a concrete, signed candidate at a specific fee; a fee bump produces a new
//! attempt rather than editing an existing one.

use crate::fee::Fee;
use alloy_consensus::{TxEip1559, TxLegacy, TxType};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// A logical transaction that has not yet been admitted into its sending
/// key's sequence. No attempt can be built for it: the builder only accepts
/// [`Tx`], and the only way to obtain a `Tx` is [`UnstartedTx::assign_sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstartedTx {
	/// Stable identifier assigned by the upstream submission layer.
	pub id: u64,
	/// Sending address.
	pub from: Address,
	/// Recipient address.
	pub to: Address,
	/// Value transferred, in the native currency's smallest unit.
	pub value: U256,
	/// Opaque call payload.
	pub payload: Bytes,
	/// Gas-limit ceiling the estimator may not exceed.
	pub gas_limit: u64,
}

impl UnstartedTx {
	/// Admits the transaction into the sending key's sequence. The sequence
	/// number is immutable for the life of the transaction.
	pub fn assign_sequence(self, sequence: u64) -> Tx {
		Tx {
			id: self.id,
			sequence,
			from: self.from,
			to: self.to,
			value: self.value,
			payload: self.payload,
			gas_limit: self.gas_limit,
			attempts: Vec::new(),
		}
	}
}

/// An in-progress logical transaction with an assigned sequence number.
///
/// The attempt builder reads this but never mutates it; the surrounding
/// transaction manager appends attempts and drives state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
	/// Stable identifier assigned by the upstream submission layer.
	pub id: u64,
	/// Per-sender strictly increasing sequence number (nonce).
	pub sequence: u64,
	/// Sending address.
	pub from: Address,
	/// Recipient address.
	pub to: Address,
	/// Value transferred, in the native currency's smallest unit.
	pub value: U256,
	/// Opaque call payload.
	pub payload: Bytes,
	/// Gas-limit ceiling the estimator may not exceed.
	pub gas_limit: u64,
	/// Prior attempts, most recent last.
	pub attempts: Vec<TxAttempt>,
}

/// Lifecycle state of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
	/// Built and signed, not yet handed to the network layer.
	InProgress,
	/// Rejected by the node for insufficient sender funds.
	InsufficientFunds,
	/// Accepted by the node and awaiting inclusion.
	Broadcast,
}

/// One concrete, signed, broadcastable candidate for a [`Tx`].
///
/// Created exclusively by the attempt builder and never mutated afterwards;
/// a bump is represented by a new attempt, not an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAttempt {
	/// Identifier of the owning transaction.
	pub tx_id: u64,
	/// Content hash of the signed encoding, the chain-level lookup key.
	pub hash: B256,
	/// Canonical signed wire encoding, broadcast verbatim.
	pub signed_raw: Bytes,
	/// The fee actually used.
	pub fee: Fee,
	/// The gas limit actually used.
	pub gas_limit: u64,
	/// EVM transaction type of the signed encoding.
	pub tx_type: TxType,
	/// Lifecycle state.
	pub state: AttemptState,
	/// Whether this attempt cancels its transaction's slot (empty payload,
	/// zero value).
	pub is_purge: bool,
	/// Block height before which the attempt was broadcast. Set by the
	/// broadcaster; consumed by later bump decisions.
	pub broadcast_before_block: Option<u64>,
}

/// The projection of a prior attempt handed to the fee estimator so it can
/// enforce its own monotonicity policy across rebroadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAttempt {
	/// The fee the attempt was broadcast with.
	pub fee: Fee,
	/// The gas limit the attempt was broadcast with.
	pub gas_limit: u64,
	/// Content hash of the attempt.
	pub tx_hash: B256,
	/// EVM transaction type of the attempt.
	pub tx_type: TxType,
	/// Block height before which the attempt was broadcast, if known.
	pub broadcast_before_block: Option<u64>,
}

impl From<&TxAttempt> for PriorAttempt {
	fn from(attempt: &TxAttempt) -> Self {
		Self {
			fee: attempt.fee,
			gas_limit: attempt.gas_limit,
			tx_hash: attempt.hash,
			tx_type: attempt.tx_type,
			broadcast_before_block: attempt.broadcast_before_block,
		}
	}
}

/// An unsigned, chain-type-correct transaction produced by the assemblers
/// and consumed by the signer.
#[derive(Debug, Clone)]
pub enum UnsignedTx {
	/// Legacy transaction carrying a flat gas price.
	Legacy(TxLegacy),
	/// EIP-1559 transaction carrying a tip and a fee cap, bound to one
	/// chain id.
	DynamicFee(TxEip1559),
}

impl UnsignedTx {
	/// The EVM transaction type of this unsigned form.
	pub fn tx_type(&self) -> TxType {
		match self {
			UnsignedTx::Legacy(_) => TxType::Legacy,
			UnsignedTx::DynamicFee(_) => TxType::Eip1559,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unstarted() -> UnstartedTx {
		UnstartedTx {
			id: 7,
			from: Address::repeat_byte(0x11),
			to: Address::repeat_byte(0x22),
			value: U256::from(100u64),
			payload: Bytes::from(vec![1, 2, 3]),
			gas_limit: 21_000,
		}
	}

	#[test]
	fn assigning_a_sequence_preserves_the_transaction() {
		let tx = unstarted().assign_sequence(42);
		assert_eq!(tx.id, 7);
		assert_eq!(tx.sequence, 42);
		assert_eq!(tx.payload, Bytes::from(vec![1, 2, 3]));
		assert!(tx.attempts.is_empty());
	}

	#[test]
	fn prior_attempt_projects_the_estimator_facing_fields() {
		let attempt = TxAttempt {
			tx_id: 7,
			hash: B256::repeat_byte(0xab),
			signed_raw: Bytes::from(vec![0xf8]),
			fee: Fee::Flat { price: 25 },
			gas_limit: 21_000,
			tx_type: TxType::Legacy,
			state: AttemptState::Broadcast,
			is_purge: false,
			broadcast_before_block: Some(1000),
		};
		let prior = PriorAttempt::from(&attempt);
		assert_eq!(prior.fee, Fee::Flat { price: 25 });
		assert_eq!(prior.tx_hash, B256::repeat_byte(0xab));
		assert_eq!(prior.tx_type, TxType::Legacy);
		assert_eq!(prior.broadcast_before_block, Some(1000));
	}
}
