//! Column rules checked before a row is handed to the database.

use rust_decimal::Decimal;

use crate::error::ValidationError;

pub(crate) fn required(field: &'static str, value: &str, max_length: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    max_length_of(field, value, max_length)
}

pub(crate) fn optional(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => max_length_of(field, value, max_length),
        None => Ok(()),
    }
}

fn max_length_of(field: &'static str, value: &str, max_length: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_length {
        return Err(ValidationError::FieldTooLong { field, max_length });
    }
    Ok(())
}

pub(crate) fn non_negative(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

/// `numeric(precision, scale)`: no more than `scale` fractional digits and
/// no more than `precision - scale` integer digits. Values are never rounded.
pub(crate) fn numeric(
    field: &'static str,
    value: Decimal,
    precision: u32,
    scale: u32,
) -> Result<(), ValidationError> {
    let out_of_range = ValidationError::PrecisionOutOfRange {
        field,
        precision,
        scale,
    };
    if value.normalize().scale() > scale {
        return Err(out_of_range);
    }
    let limit = Decimal::from(10_i64.pow(precision - scale));
    if value.trunc().abs() >= limit {
        return Err(out_of_range);
    }
    Ok(())
}

pub(crate) fn non_negative_numeric(
    field: &'static str,
    value: Decimal,
    precision: u32,
    scale: u32,
) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    numeric(field, value, precision, scale)
}
