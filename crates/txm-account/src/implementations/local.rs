//! In-process signer backed by local private keys.
//!
//! Holds one `PrivateKeySigner` per sending address and refuses to sign for
//! any address it does not hold. Suitable for single-node deployments and
//! tests; remote key stores implement [`TxSignerInterface`] the same way.

use crate::{AccountError, TxSignerInterface};
use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_network::TxSigner;
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::HashMap;
use txm_types::UnsignedTx;

/// Signer implementation holding a set of local private keys.
pub struct LocalAccount {
	signers: HashMap<Address, PrivateKeySigner>,
}

impl LocalAccount {
	pub fn new(keys: impl IntoIterator<Item = PrivateKeySigner>) -> Self {
		Self {
			signers: keys.into_iter().map(|k| (k.address(), k)).collect(),
		}
	}

	/// Addresses this account can sign for.
	pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
		self.signers.keys().copied()
	}
}

#[async_trait]
impl TxSignerInterface for LocalAccount {
	async fn sign_transaction(
		&self,
		address: Address,
		tx: &UnsignedTx,
	) -> Result<TxEnvelope, AccountError> {
		let signer = self
			.signers
			.get(&address)
			.ok_or(AccountError::UnknownAddress(address))?;

		match tx.clone() {
			UnsignedTx::Legacy(mut inner) => {
				let signature = signer
					.sign_transaction(&mut inner)
					.await
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				Ok(TxEnvelope::Legacy(inner.into_signed(signature)))
			}
			UnsignedTx::DynamicFee(mut inner) => {
				let signature = signer
					.sign_transaction(&mut inner)
					.await
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				Ok(TxEnvelope::Eip1559(inner.into_signed(signature)))
			}
		}
	}
}
