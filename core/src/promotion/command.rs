//! Three-state fields for partial-update payloads.
//!
//! # Design
//! A save command must tell apart a field the caller never touched (omitted
//! from the payload, the server keeps its value) from a field explicitly set
//! to null (sent as `null`). `Option<T>` cannot carry both, so every settable
//! field is a [`Patch`]. Wire structs mark patch fields with
//! `#[serde(skip_serializing_if = "Patch::is_unset")]`.

use serde::{Serialize, Serializer};

use crate::error::PromotionError;
use crate::promotion::discount::Discount;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Never set; omitted from the payload.
    #[default]
    Unset,
    /// Explicitly set to null.
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            Patch::Unset | Patch::Null => None,
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Null, Patch::Value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(value) => value.serialize(serializer),
            Patch::Unset | Patch::Null => serializer.serialize_none(),
        }
    }
}

pub(crate) fn validate_name(name: &Patch<String>) -> Result<(), PromotionError> {
    match name {
        Patch::Value(name) if name.trim().is_empty() => Err(PromotionError::InvalidField {
            field: "name",
            value: format!("{name:?}"),
        }),
        Patch::Null => Err(PromotionError::InvalidField {
            field: "name",
            value: "null".to_string(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn validate_discounts(discounts: &Patch<Vec<Discount>>) -> Result<(), PromotionError> {
    discounts
        .value()
        .map_or(Ok(()), |discounts| discounts.iter().try_for_each(Discount::validate))
}

pub(crate) fn validate_coupon(coupon: &Patch<String>) -> Result<(), PromotionError> {
    match coupon {
        Patch::Value(code) if code.trim().is_empty() => Err(PromotionError::InvalidField {
            field: "coupon",
            value: format!("{code:?}"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Probe {
        #[serde(skip_serializing_if = "Patch::is_unset")]
        unset: Patch<u8>,
        #[serde(skip_serializing_if = "Patch::is_unset")]
        null: Patch<u8>,
        #[serde(skip_serializing_if = "Patch::is_unset")]
        empty: Patch<Vec<u8>>,
    }

    #[test]
    fn unset_null_and_empty_serialize_differently() {
        let probe = Probe {
            unset: Patch::Unset,
            null: Patch::Null,
            empty: Patch::Value(Vec::new()),
        };
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({"null": null, "empty": []}));
    }

    #[test]
    fn option_converts_to_null_or_value() {
        assert_eq!(Patch::from(None::<u8>), Patch::Null);
        assert_eq!(Patch::from(Some(3)), Patch::Value(3));
        assert!(Patch::<u8>::default().is_unset());
    }

    #[test]
    fn blank_name_is_invalid() {
        assert!(validate_name(&Patch::Value("  ".to_string())).is_err());
        assert!(validate_name(&Patch::Null).is_err());
        assert!(validate_name(&Patch::Unset).is_ok());
    }

    #[test]
    fn discounts_are_range_checked_only_when_set() {
        assert!(validate_discounts(&Patch::Null).is_ok());
        assert!(validate_discounts(&Patch::Value(vec![Discount::Fixed(-2.0)])).is_err());
        assert!(validate_discounts(&Patch::Value(vec![Discount::Percentage(20.0)])).is_ok());
    }
}
