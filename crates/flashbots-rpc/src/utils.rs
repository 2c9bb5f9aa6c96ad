use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{de, Deserialize};
use serde_json::Value;

use crate::client::RelayError;

/// 1 ether in wei.
pub const ETH1: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

fn invalid(value: &str, reason: impl ToString) -> RelayError {
    RelayError::InvalidHex { value: value.to_string(), reason: reason.to_string() }
}

/// Parses a quantity: `0x` hex, plain decimal, or a bare `0x` meaning zero.
pub fn parse_u64(value: &str) -> Result<u64, RelayError> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some("") => Ok(0),
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|e| invalid(value, e)),
        None => value.parse::<u64>().map_err(|e| invalid(value, e)),
    }
}

pub fn parse_u256(value: &str) -> Result<U256, RelayError> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some("") => Ok(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| invalid(value, e)),
        None => U256::from_str_radix(value, 10).map_err(|e| invalid(value, e)),
    }
}

pub fn parse_optional_u64(value: Option<&str>) -> Result<Option<u64>, RelayError> {
    value.map(parse_u64).transpose()
}

pub fn u64_to_hex(value: u64) -> String {
    format!("{value:#x}")
}

pub fn u256_to_hex(value: U256) -> String {
    format!("{value:#x}")
}

pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: de::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse_u64(&s).map_err(de::Error::custom),
        Value::Number(num) => num.as_u64().ok_or_else(|| de::Error::custom("Invalid number")),
        _ => Err(de::Error::custom("wrong type")),
    }
}

pub fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: de::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse_u256(&s).map_err(de::Error::custom),
        Value::Number(num) => Ok(U256::from(num.as_u64().ok_or_else(|| de::Error::custom("Invalid number"))?)),
        _ => Err(de::Error::custom("wrong type")),
    }
}

pub fn deserialize_optional_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: de::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() || s == "0x" => Ok(None),
        Value::String(s) => Address::from_str(&s).map(Some).map_err(de::Error::custom),
        _ => Err(de::Error::custom("expected a hexadecimal string")),
    }
}
