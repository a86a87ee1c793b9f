//! Money type for representing monetary values.
//!
//! Uses an integer minor-unit representation to avoid floating-point
//! precision issues in price arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies the shop prices garments in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CHF,
    HKD,
    SGD,
    JPY,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::CHF,
        Currency::HKD,
        Currency::SGD,
        Currency::JPY,
    ];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
            Currency::JPY => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::CHF => "CHF ",
            Currency::HKD => "HK$",
            Currency::SGD => "S$",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Digits after the decimal point in displayed amounts.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Case-insensitive lookup by ISO code.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents for
/// USD). Price modifiers may be negative, so the amount is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Clamp to zero for display. Pricing itself never clamps.
    pub fn clamp_non_negative(&self) -> Self {
        Self::new(self.amount_minor.max(0), self.currency)
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency.symbol(), self.display_amount_abs())
    }

    /// Format the absolute amount without symbol (e.g., "49.99").
    fn display_amount_abs(&self) -> String {
        let places = self.currency.decimal_places();
        let abs = self.amount_minor.unsigned_abs();
        if places == 0 {
            return abs.to_string();
        }
        let divisor = 10u64.pow(places);
        format!(
            "{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = places as usize
        )
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` if currencies don't match or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Add an amount in minor units, saturating at the numeric bounds.
    pub fn saturating_add_minor(&self, amount_minor: i64) -> Money {
        Money::new(self.amount_minor.saturating_add(amount_minor), self.currency)
    }

    /// Try to multiply by a scalar, returning `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum Money values, returning `None` on currency mismatch or overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
