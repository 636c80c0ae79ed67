//! Account and signing module for the EVM transaction manager.
//!
//! This module wraps an external per-address signer capability and turns an
//! unsigned transaction into its canonical signed wire encoding plus the
//! content hash the chain uses as the transaction's identifier. Signing
//! failures are surfaced verbatim and never retried here.

use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;
use txm_types::UnsignedTx;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The signer does not hold a key for the requested address.
	#[error("no key available for address {0}")]
	UnknownAddress(Address),
	/// The underlying signer rejected the transaction.
	#[error("signing failed: {0}")]
	SigningFailed(String),
	/// The signer returned an envelope whose hash does not match its own
	/// canonical encoding.
	#[error("signer returned a malformed transaction for address {0}")]
	MalformedTransaction(Address),
}

/// Trait defining the interface for transaction signers.
///
/// Implementations produce a signed envelope for the given sending address;
/// the canonical encoding and content hash are derived by [`AccountService`]
/// so every signer backend yields byte-identical output for the same input.
#[async_trait]
pub trait TxSignerInterface: Send + Sync {
	/// Signs an unsigned transaction for the given address.
	async fn sign_transaction(
		&self,
		address: Address,
		tx: &UnsignedTx,
	) -> Result<alloy_consensus::TxEnvelope, AccountError>;
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
	/// keccak-256 hash of `raw`, the chain-level transaction identifier.
	pub hash: B256,
	/// Canonical EIP-2718 encoding, broadcast verbatim by the network layer.
	pub raw: Bytes,
}

/// Service that signs transactions and produces their canonical encoding.
pub struct AccountService {
	signer: Box<dyn TxSignerInterface>,
}

impl AccountService {
	pub fn new(signer: Box<dyn TxSignerInterface>) -> Self {
		Self { signer }
	}

	/// Signs `tx` for `address` and returns the canonical encoding and its
	/// content hash.
	///
	/// The hash is computed over the final encoded representation rather
	/// than the unsigned fields: the encoding differs by transaction type
	/// and the hash is the canonical chain-level identifier of the attempt.
	pub async fn sign(&self, address: Address, tx: &UnsignedTx) -> Result<SignedTx, AccountError> {
		let envelope = self.signer.sign_transaction(address, tx).await?;
		let raw = envelope.encoded_2718();
		let hash = keccak256(&raw);
		if *envelope.tx_hash() != hash {
			return Err(AccountError::MalformedTransaction(address));
		}
		Ok(SignedTx {
			hash,
			raw: raw.into(),
		})
	}
}
