//! Unsigned transaction assemblers.
//!
//! Pure constructors mapping a fee shape onto the matching EVM transaction
//! form. No validation happens here; callers validate the fee first. The
//! dynamic-fee form requires a chain id to bind the signature to one
//! network, the legacy form carries none.

use alloy_consensus::{TxEip1559, TxLegacy};
use alloy_primitives::{Address, Bytes, TxKind, U256};
use txm_types::UnsignedTx;

/// Assembles a legacy transaction with a flat gas price.
pub fn legacy(
	sequence: u64,
	to: Address,
	value: U256,
	gas_limit: u64,
	gas_price: u128,
	payload: Bytes,
) -> UnsignedTx {
	UnsignedTx::Legacy(TxLegacy {
		chain_id: None,
		nonce: sequence,
		gas_price,
		gas_limit,
		to: TxKind::Call(to),
		value,
		input: payload,
	})
}

/// Assembles an EIP-1559 transaction with a tip and fee cap.
#[allow(clippy::too_many_arguments)]
pub fn dynamic_fee(
	chain_id: u64,
	sequence: u64,
	to: Address,
	value: U256,
	gas_limit: u64,
	tip: u128,
	cap: u128,
	payload: Bytes,
) -> UnsignedTx {
	UnsignedTx::DynamicFee(TxEip1559 {
		chain_id,
		nonce: sequence,
		gas_limit,
		max_fee_per_gas: cap,
		max_priority_fee_per_gas: tip,
		to: TxKind::Call(to),
		value,
		access_list: Default::default(),
		input: payload,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn legacy_form_carries_no_chain_id() {
		let to = Address::repeat_byte(0x22);
		let UnsignedTx::Legacy(tx) =
			legacy(5, to, U256::from(9u64), 21_000, 30, Bytes::from(vec![1]))
		else {
			panic!("expected a legacy transaction");
		};
		assert_eq!(tx.chain_id, None);
		assert_eq!(tx.nonce, 5);
		assert_eq!(tx.gas_price, 30);
		assert_eq!(tx.to, TxKind::Call(to));
	}

	#[test]
	fn dynamic_fee_form_binds_the_chain_id() {
		let to = Address::repeat_byte(0x22);
		let UnsignedTx::DynamicFee(tx) =
			dynamic_fee(1337, 5, to, U256::ZERO, 21_000, 2, 40, Bytes::new())
		else {
			panic!("expected a dynamic fee transaction");
		};
		assert_eq!(tx.chain_id, 1337);
		assert_eq!(tx.max_priority_fee_per_gas, 2);
		assert_eq!(tx.max_fee_per_gas, 40);
	}
}
