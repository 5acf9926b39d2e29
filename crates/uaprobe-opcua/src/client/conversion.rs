// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command line text to OPC UA value conversion.
//!
//! The set command does not know a node's data type up front. It reads the
//! current value first and converts the user's text into a value of the
//! same built-in type:
//!
//! ```text
//! read_value(node) ──► template: OpcUaValue::UInt16(7)
//!                            │
//! "42" ──► value_like(&template, "42") ──► OpcUaValue::UInt16(42)
//! ```
//!
//! | Type            | Accepted text                               |
//! |-----------------|---------------------------------------------|
//! | Boolean         | `true`/`false`/`1`/`0`/`on`/`off` (any case)|
//! | Integers        | decimal, range checked against the type     |
//! | Float/Double    | decimal or exponent notation, finite        |
//! | String          | taken verbatim                              |
//! | DateTime        | RFC 3339                                    |
//! | Guid            | hyphenated or simple UUID form              |
//! | ByteString      | standard base64                             |
//!
//! Empty values and arrays cannot be written from text.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ConversionError, OpcUaResult};
use crate::types::OpcUaDataType;

use super::transport::OpcUaValue;

/// Parses a boolean in any of the accepted spellings.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Converts `text` into a value of the same type as `template`.
///
/// # Errors
///
/// Returns a conversion error if the template is empty or an array, if the
/// text does not parse, or if it is outside the type's range.
pub fn value_like(template: &OpcUaValue, text: &str) -> OpcUaResult<OpcUaValue> {
    match template {
        OpcUaValue::Null | OpcUaValue::Array(_) => {
            Err(ConversionError::unsupported_type(template.type_name()).into())
        }
        other => parse_value(text, other.data_type()),
    }
}

macro_rules! parse_integer {
    ($text:expr, $ty:ty, $variant:ident, $data_type:expr) => {{
        let trimmed = $text.trim();
        let wide: i128 = trimmed.parse().map_err(|e: std::num::ParseIntError| {
            ConversionError::invalid_text($text, $data_type.name(), e.to_string())
        })?;
        let narrow = <$ty>::try_from(wide).map_err(|_| {
            let (min, max) = (<$ty>::MIN as i128, <$ty>::MAX as i128);
            ConversionError::out_of_range(wide, $data_type.name(), min, max)
        })?;
        Ok(OpcUaValue::$variant(narrow))
    }};
}

/// Parses `text` as a value of `data_type`.
///
/// # Errors
///
/// Returns a conversion error if the text does not parse as the type, is out
/// of range, or the type cannot be written from text.
pub fn parse_value(text: &str, data_type: OpcUaDataType) -> OpcUaResult<OpcUaValue> {
    match data_type {
        OpcUaDataType::Boolean => parse_bool(text).map(OpcUaValue::Boolean).ok_or_else(|| {
            ConversionError::invalid_text(text, data_type.name(), "expected true/false/1/0/on/off")
                .into()
        }),
        OpcUaDataType::SByte => parse_integer!(text, i8, SByte, data_type),
        OpcUaDataType::Byte => parse_integer!(text, u8, Byte, data_type),
        OpcUaDataType::Int16 => parse_integer!(text, i16, Int16, data_type),
        OpcUaDataType::UInt16 => parse_integer!(text, u16, UInt16, data_type),
        OpcUaDataType::Int32 => parse_integer!(text, i32, Int32, data_type),
        OpcUaDataType::UInt32 => parse_integer!(text, u32, UInt32, data_type),
        OpcUaDataType::Int64 => parse_integer!(text, i64, Int64, data_type),
        OpcUaDataType::UInt64 => parse_integer!(text, u64, UInt64, data_type),
        OpcUaDataType::Float => {
            let value = parse_finite(text, data_type)?;
            let narrow = value as f32;
            if narrow.is_finite() {
                Ok(OpcUaValue::Float(narrow))
            } else {
                let (min, max) = (f32::MIN as f64, f32::MAX as f64);
                Err(ConversionError::out_of_range(value, data_type.name(), min, max).into())
            }
        }
        OpcUaDataType::Double => parse_finite(text, data_type).map(OpcUaValue::Double),
        OpcUaDataType::String => Ok(OpcUaValue::String(text.to_string())),
        OpcUaDataType::DateTime => DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| OpcUaValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| {
                ConversionError::invalid_text(text, data_type.name(), e.to_string()).into()
            }),
        OpcUaDataType::Guid => Uuid::parse_str(text.trim())
            .map(OpcUaValue::Guid)
            .map_err(|e| {
                ConversionError::invalid_text(text, data_type.name(), e.to_string()).into()
            }),
        OpcUaDataType::ByteString => BASE64
            .decode(text.trim())
            .map(OpcUaValue::ByteString)
            .map_err(|e| {
                ConversionError::invalid_text(text, data_type.name(), e.to_string()).into()
            }),
        OpcUaDataType::Variant => Err(ConversionError::unsupported_type(data_type.name()).into()),
    }
}

fn parse_finite(text: &str, data_type: OpcUaDataType) -> OpcUaResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| {
            ConversionError::invalid_text(text, data_type.name(), e.to_string())
        })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConversionError::invalid_text(text, data_type.name(), "value must be finite").into())
    }
}
