//! Price-gap arithmetic between the two offers of a trade-in.
//!
//! Prices are plain `f64` amounts in the listing currency. Every function here
//! is pure: the same two prices and override text always give the same answer.

use serde::{Deserialize, Serialize};

use crate::RepriseError;

/// Which party owes the balance, seen from the owner of `mine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// My offer is cheaper; I pay the difference.
    Payer,
    /// My offer is pricier; I receive the difference.
    Recevoir,
    /// Same value; nothing to settle.
    Egal,
}

impl Direction {
    /// `sign(target_price - my_price)` mapped onto a direction.
    pub fn between(target_price: f64, my_price: f64) -> Self {
        let base = target_price - my_price;
        if base > 0.0 {
            Self::Payer
        } else if base < 0.0 {
            Self::Recevoir
        } else {
            Self::Egal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payer => "payer",
            Self::Recevoir => "recevoir",
            Self::Egal => "egal",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived values for a (target, mine) price pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceQuote {
    /// `target_price - my_price`, signed.
    pub base: f64,
    /// `|base|`, the suggested compensation.
    pub absolute: f64,
    pub direction: Direction,
}

impl DifferenceQuote {
    pub fn new(target_price: f64, my_price: f64) -> Self {
        let base = target_price - my_price;
        Self {
            base,
            absolute: base.abs(),
            direction: Direction::between(target_price, my_price),
        }
    }

    /// Whether a compensation amount is negotiable at all.
    pub fn has_compensation(&self) -> bool {
        self.direction != Direction::Egal
    }

    /// Amount to submit for the raw override text.
    ///
    /// Uses the override when it parses to a finite number, otherwise the
    /// suggested difference; never negative. Equal-value trades always
    /// settle at zero.
    pub fn effective(&self, override_input: &str) -> f64 {
        if !self.has_compensation() {
            return 0.0;
        }
        parse_amount(override_input)
            .unwrap_or(self.absolute)
            .max(0.0)
    }
}

/// Parse user-typed amount text. Blank or non-finite input yields `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Amount text floored at zero, with garbage counting as zero.
pub fn amount_or_zero(input: &str) -> f64 {
    parse_amount(input).unwrap_or(0.0).max(0.0)
}

/// Validate a balance amount against the two offer prices.
///
/// The amount must be finite and non-negative, zero when both offers have the
/// same price, and never above the absolute price gap.
pub fn check_difference(
    sender_price: f64,
    receiver_price: f64,
    amount: f64,
) -> Result<(), RepriseError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(RepriseError::InvalidInput(
            "differenceAmount must be a number >= 0".into(),
        ));
    }
    let gap = (sender_price - receiver_price).abs();
    if gap == 0.0 && amount != 0.0 {
        return Err(RepriseError::InvalidInput(
            "No difference allowed between offers of equal value".into(),
        ));
    }
    if amount > gap {
        return Err(RepriseError::InvalidInput(
            "differenceAmount exceeds the maximum allowed difference".into(),
        ));
    }
    Ok(())
}
