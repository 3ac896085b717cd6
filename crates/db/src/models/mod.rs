//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod adherent;
pub mod cotisation;
pub mod session;
pub mod soin;
pub mod user;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Largest amount a `NUMERIC(10, 2)` column accepts.
const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);

/// Money columns are `NUMERIC(10, 2)`: non-negative, at most two decimals.
pub(crate) fn check_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    if value.scale() > 2 && value.normalize().scale() > 2 {
        return Err(ValidationError::new("too_many_decimals"));
    }
    if value.trunc() > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}
