//! Fixed-price fee estimator.
//!
//! Prices every transaction from static configuration rather than chain
//! observation. Bumps apply a configured percentage with a minimum absolute
//! increase, never return less than the currently configured price, and are
//! capped at the per-key maximum; a bump that cannot land strictly above the
//! previous fee is an error rather than a silent re-broadcast at the same
//! price.

use crate::{EstimatorError, FeeEstimator};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use txm_types::{Fee, PriorAttempt};

/// Static pricing configuration for [`FixedPriceEstimator`].
#[derive(Debug, Clone, Deserialize)]
pub struct FixedPriceConfig {
	/// Whether fresh estimates use priority (EIP-1559) pricing.
	pub priority_fees: bool,
	/// Flat gas price for legacy estimates, in wei.
	pub gas_price: u128,
	/// Tip cap for priority estimates, in wei.
	pub tip_cap: u128,
	/// Fee cap for priority estimates, in wei.
	pub fee_cap: u128,
	/// Percentage increase applied per bump.
	pub bump_percent: u64,
	/// Minimum absolute increase per bump, in wei.
	pub bump_min: u128,
}

/// Fee estimator that prices from static configuration.
#[derive(Debug, Clone)]
pub struct FixedPriceEstimator {
	config: FixedPriceConfig,
}

impl FixedPriceEstimator {
	pub fn new(config: FixedPriceConfig) -> Self {
		Self { config }
	}

	/// Bumps a single per-unit price: the larger of the percentage bump, the
	/// minimum absolute bump, and the currently configured price, capped at
	/// `max_price`. Errors when the capped result is not strictly above the
	/// previous price.
	fn bumped_price(
		&self,
		current: u128,
		previous: u128,
		max_price: u128,
	) -> Result<u128, EstimatorError> {
		let percent_bump =
			previous.saturating_mul(100 + u128::from(self.config.bump_percent)) / 100;
		let min_bump = previous.saturating_add(self.config.bump_min);
		let bumped = percent_bump.max(min_bump).max(current).min(max_price);
		if bumped <= previous {
			return Err(EstimatorError::BumpExceedsCeiling {
				previous,
				max_price,
			});
		}
		Ok(bumped)
	}
}

#[async_trait]
impl FeeEstimator for FixedPriceEstimator {
	async fn get_fee(
		&self,
		_payload: &[u8],
		gas_limit_ceiling: u64,
		max_price: u128,
		_from: Address,
		_to: Address,
	) -> Result<(Fee, u64), EstimatorError> {
		let fee = if self.config.priority_fees {
			let cap = self.config.fee_cap.min(max_price);
			Fee::Priority {
				tip: self.config.tip_cap.min(cap),
				cap,
			}
		} else {
			Fee::Flat {
				price: self.config.gas_price.min(max_price),
			}
		};
		Ok((fee, gas_limit_ceiling))
	}

	async fn bump_fee(
		&self,
		previous_fee: &Fee,
		previous_gas_limit: u64,
		max_price: u128,
		_prior_attempts: &[PriorAttempt],
	) -> Result<(Fee, u64), EstimatorError> {
		let bumped = match *previous_fee {
			Fee::Flat { price } => Fee::Flat {
				price: self.bumped_price(self.config.gas_price, price, max_price)?,
			},
			Fee::Priority { tip, cap } => {
				let bumped_cap = self.bumped_price(self.config.fee_cap, cap, max_price)?;
				// The tip rides along with the same arithmetic but may never
				// exceed the bumped cap; only the cap must strictly increase
				let bumped_tip = self
					.bumped_price(self.config.tip_cap, tip, max_price)
					.unwrap_or_else(|_| {
						tracing::debug!(tip, "tip cannot be bumped further, holding it");
						tip
					})
					.min(bumped_cap);
				Fee::Priority {
					tip: bumped_tip,
					cap: bumped_cap,
				}
			}
		};
		tracing::debug!(previous = %previous_fee, bumped = %bumped, "bumped fee");
		Ok((bumped, previous_gas_limit))
	}
}
