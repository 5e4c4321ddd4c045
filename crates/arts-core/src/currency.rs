//! # Currency
//!
//! Minor-unit arithmetic for payment amounts.

use crate::error::{ArtsError, ArtsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency charged by the payment bridge (ISO 4217)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
        }
    }

    /// Convert a decimal amount to cents.
    ///
    /// Rounds to the nearest unit so binary float error (`19.99 * 100`)
    /// does not truncate a cent away.
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Read a decimal amount from a JSON number or numeric string
pub fn decimal_amount(value: &Value) -> ArtsResult<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    amount
        .filter(|a| a.is_finite())
        .ok_or_else(|| ArtsError::InvalidRequest(format!("'price' is not a number: {}", value)))
}
