//! Fee validation rules.
//!
//! Pure sanity checks run immediately before assembly so an invalid attempt
//! is never created, regardless of what checks exist elsewhere. Errors carry
//! both the requested and the configured values so operators can act on them
//! without further lookups.

use crate::FeePolicy;
use alloy_primitives::Address;
use thiserror::Error;
use txm_types::Fee;

/// Structured validation failures. All are non-retryable: the configuration
/// or the transaction must change before another attempt can succeed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error(
		"cannot create tx attempt: specified gas price of {price} wei would exceed \
		 max configured gas price of {max} wei for key {address}"
	)]
	PriceExceedsKeyCeiling {
		price: u128,
		max: u128,
		address: Address,
	},
	#[error(
		"cannot create tx attempt: specified fee cap of {cap} wei would exceed \
		 max configured gas price of {max} wei for key {address}"
	)]
	CapExceedsKeyCeiling {
		cap: u128,
		max: u128,
		address: Address,
	},
	#[error("gas fee cap must be greater than or equal to gas tip cap (fee cap: {cap}, tip cap: {tip})")]
	CapBelowTip { cap: u128, tip: u128 },
}

/// Validates a fee against the per-key ceiling and its own internal
/// consistency. Pure predicate; no side effects.
pub fn validate_fee(
	fee: &Fee,
	from: Address,
	policy: &dyn FeePolicy,
) -> Result<(), ValidationError> {
	let max = policy.max_price_for_key(from);
	match *fee {
		Fee::Flat { price } => {
			if price > max {
				return Err(ValidationError::PriceExceedsKeyCeiling {
					price,
					max,
					address: from,
				});
			}
		}
		Fee::Priority { tip, cap } => {
			// The total must be at least as large as the tip, per EIP-1559
			if cap < tip {
				return Err(ValidationError::CapBelowTip { cap, tip });
			}
			if cap > max {
				return Err(ValidationError::CapExceedsKeyCeiling {
					cap,
					max,
					address: from,
				});
			}
		}
	}
	Ok(())
}
