//! Fixed-precision prices.
//!
//! Prices arrive as JSON numbers (pets) or numeric strings (menu items).
//! Both are normalized to a non-negative `Decimal` at decode time, so totals
//! are exact sums and a non-numeric price is rejected on ingestion instead
//! of poisoning every total computed afterwards.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Reasons a price is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price {0:?} is not a number")]
    NotNumeric(String),
    #[error("price {0} is negative")]
    Negative(Decimal),
}

/// A non-negative decimal price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Wrap an amount, rejecting negatives.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Whole-unit price.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// `price * quantity`
    pub fn times(self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let amount = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| PriceError::NotNumeric(s.to_string()))?;
        Self::new(amount)
    }
}

impl From<u32> for Price {
    fn from(units: u32) -> Self {
        Self::from_units(u64::from(units))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.0.normalize();
        if n.scale() == 0 {
            if let Some(units) = n.to_u64() {
                return serializer.serialize_u64(units);
            }
        }
        // Written as a number only when decoding that number gives back the
        // same amount; otherwise as the exact decimal string.
        match n.to_f64() {
            Some(f) if f.to_string().parse::<Decimal>().ok() == Some(n) => {
                serializer.serialize_f64(f)
            }
            _ => serializer.serialize_str(&n.to_string()),
        }
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price::from_units(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        if !v.is_finite() {
            return Err(E::custom(PriceError::NotNumeric(v.to_string())));
        }
        // f64 Display is the shortest round-trip form, without exponents.
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_integer_and_decimal_strings() {
        assert_eq!("1200".parse::<Price>().unwrap().amount(), dec!(1200));
        assert_eq!(" 12.50 ".parse::<Price>().unwrap().amount(), dec!(12.5));
        assert_eq!("1e3".parse::<Price>().unwrap().amount(), dec!(1000));
    }

    #[test]
    fn test_rejects_non_numeric_and_negative() {
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::NotNumeric(_))));
        assert!(matches!("".parse::<Price>(), Err(PriceError::NotNumeric(_))));
        assert!(matches!("-5".parse::<Price>(), Err(PriceError::Negative(_))));
        assert!(Price::new(dec!(-0)).is_ok());
    }

    #[test]
    fn test_json_number_and_string_forms() {
        let p: Price = serde_json::from_str("1500").unwrap();
        assert_eq!(p.amount(), dec!(1500));
        let p: Price = serde_json::from_str("\"99.99\"").unwrap();
        assert_eq!(p.amount(), dec!(99.99));
        let p: Price = serde_json::from_str("0.1").unwrap();
        assert_eq!(p.amount(), dec!(0.1));
        assert!(serde_json::from_str::<Price>("\"free\"").is_err());
        assert!(serde_json::from_str::<Price>("-1").is_err());
        assert!(serde_json::from_str::<Price>("null").is_err());
    }

    #[test]
    fn test_serializes_as_json_number() {
        assert_eq!(serde_json::to_string(&Price::from_units(1200)).unwrap(), "1200");
        let p = Price::new(dec!(12.50)).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "12.5");
    }

    #[test]
    fn test_high_precision_survives_reload() {
        for text in ["12345678901234567.89", "0.1234567890123456789", "99999999999999999999"] {
            let p: Price = text.parse().unwrap();
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{text}\""));
            let back: Price = serde_json::from_str(&json).unwrap();
            assert_eq!(back.amount(), p.amount(), "{text}");
        }

        let p = Price::new(dec!(1999.99)).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "1999.99");
    }

    #[test]
    fn test_times_and_display() {
        let p = Price::new(dec!(19.99)).unwrap();
        assert_eq!(p.times(3), dec!(59.97));
        assert_eq!(p.to_string(), "19.99");
        assert_eq!(Price::from_units(5).to_string(), "5.00");
    }
}
