//! Deserialization utilities for U256 values
//!
//! Accepts JSON integers as well as decimal (or `0x`-prefixed hex) strings, so
//! callers can send values that do not fit a JSON number.
use std::{fmt, str::FromStr};

use alloy::primitives::U256;
use serde::{de, Deserializer};

#[derive(Debug)]
struct U256Visitor;

impl de::Visitor<'_> for U256Visitor {
    type Value = U256;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or a string containing one")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        U256::from_str(value.trim()).map_err(de::Error::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(U256::from(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value < 0 {
            Err(de::Error::custom(
                "negative value cannot be converted to U256",
            ))
        } else {
            Ok(U256::from(value as u64))
        }
    }
}

pub fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(U256Visitor)
}
