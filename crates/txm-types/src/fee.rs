//! Fee pricing types for transaction attempts.
//!
//! A fee is either a flat gas price (legacy pricing) or a priority pair of a
//! tip paid to the block producer and a cap bounding the total price per gas
//! unit. Representing the two shapes as a tagged union makes "which fields
//! are populated" unambiguous at every consumption site.

use alloy_consensus::TxType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The fee attached to one transaction attempt.
///
/// Values are denominated in wei per gas unit and use `u128`, the same
/// representation `alloy_consensus` uses for gas prices, so fee magnitudes
/// beyond what a transaction can carry are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fee {
	/// Single price applied uniformly to all gas units (legacy pricing).
	Flat {
		/// Gas price in wei.
		price: u128,
	},
	/// Tip-plus-cap pricing (EIP-1559). The cap must be >= the tip; that
	/// invariant is enforced by validation, not by construction.
	Priority {
		/// Tip paid directly to the block producer, in wei per gas unit.
		tip: u128,
		/// Upper bound on the total price per gas unit, in wei.
		cap: u128,
	},
}

impl Fee {
	/// The EVM transaction type this fee shape maps onto.
	pub fn tx_type(&self) -> TxType {
		match self {
			Fee::Flat { .. } => TxType::Legacy,
			Fee::Priority { .. } => TxType::Eip1559,
		}
	}

	/// The value bounded by the per-key price ceiling: the flat price, or
	/// the cap for priority fees.
	pub fn max_unit_price(&self) -> u128 {
		match self {
			Fee::Flat { price } => *price,
			Fee::Priority { cap, .. } => *cap,
		}
	}
}

/// Fees are comparable within their own kind only; a flat fee and a priority
/// fee are never ordered relative to each other. Priority fees compare by
/// cap, with the tip as a tie-break.
impl PartialOrd for Fee {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Fee::Flat { price: a }, Fee::Flat { price: b }) => Some(a.cmp(b)),
			(
				Fee::Priority { tip: a_tip, cap: a_cap },
				Fee::Priority { tip: b_tip, cap: b_cap },
			) => Some(a_cap.cmp(b_cap).then(a_tip.cmp(b_tip))),
			_ => None,
		}
	}
}

impl fmt::Display for Fee {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Fee::Flat { price } => write!(f, "gas price {} wei", price),
			Fee::Priority { tip, cap } => {
				write!(f, "tip cap {} wei, fee cap {} wei", tip, cap)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fee_maps_to_tx_type() {
		assert_eq!(Fee::Flat { price: 1 }.tx_type(), TxType::Legacy);
		assert_eq!(Fee::Priority { tip: 1, cap: 2 }.tx_type(), TxType::Eip1559);
	}

	#[test]
	fn fees_compare_within_their_own_kind() {
		let small = Fee::Flat { price: 10 };
		let large = Fee::Flat { price: 20 };
		assert!(small < large);

		let cheap = Fee::Priority { tip: 1, cap: 10 };
		let pricey = Fee::Priority { tip: 1, cap: 30 };
		assert!(cheap < pricey);

		// Same cap, higher tip wins the tie-break
		let tipped = Fee::Priority { tip: 5, cap: 10 };
		assert!(cheap < tipped);
	}

	#[test]
	fn fees_of_different_kinds_are_unordered() {
		let flat = Fee::Flat { price: 100 };
		let priority = Fee::Priority { tip: 1, cap: 1 };
		assert_eq!(flat.partial_cmp(&priority), None);
		assert_eq!(priority.partial_cmp(&flat), None);
	}

	#[test]
	fn max_unit_price_uses_cap_for_priority_fees() {
		assert_eq!(Fee::Flat { price: 7 }.max_unit_price(), 7);
		assert_eq!(Fee::Priority { tip: 2, cap: 9 }.max_unit_price(), 9);
	}
}
