//! Price reductions granted by a promotion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PromotionError;
use crate::promotion::wire;

const PERCENTAGE: &str = "percentage";
const FIXED: &str = "fixed";

/// A price reduction: a percentage of the price or a fixed amount.
///
/// De-normalization does not range-check the amount; the server is trusted
/// to emit valid values. Save commands check ranges through [`Discount::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    Percentage(f64),
    Fixed(f64),
}

impl Discount {
    /// Wire tag of the variant.
    pub fn discount_type(&self) -> &'static str {
        match self {
            Discount::Percentage(_) => PERCENTAGE,
            Discount::Fixed(_) => FIXED,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Discount::Percentage(value) | Discount::Fixed(value) => *value,
        }
    }

    /// Percentages must lie in `(0, 100]`, fixed amounts must be `>= 0`.
    pub fn validate(&self) -> Result<(), PromotionError> {
        match *self {
            Discount::Percentage(value) if !(value > 0.0 && value <= 100.0) => Err(
                PromotionError::InvalidDiscount(format!("percentage {value} is outside (0, 100]")),
            ),
            Discount::Fixed(value) if !(value.is_finite() && value >= 0.0) => Err(
                PromotionError::InvalidDiscount(format!("fixed amount {value} must be finite and >= 0")),
            ),
            _ => Ok(()),
        }
    }
}

/// `{ "type": "percentage", "percentage": 10.0 } | { "type": "fixed", "value": 5.0 }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DiscountWire {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    percentage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl TryFrom<DiscountWire> for Discount {
    type Error = PromotionError;

    fn try_from(wire: DiscountWire) -> Result<Self, Self::Error> {
        match wire::tag(wire.kind.as_ref()) {
            Some(PERCENTAGE) => {
                let amount = wire::required(wire.percentage.as_ref(), "percentage")?;
                Ok(Discount::Percentage(wire::decimal(amount, "percentage")?))
            }
            Some(FIXED) => {
                let amount = wire::required(wire.value.as_ref(), "value")?;
                Ok(Discount::Fixed(wire::decimal(amount, "value")?))
            }
            _ => Err(PromotionError::UnexpectedDiscountType(wire::tag_text(
                wire.kind.as_ref(),
            ))),
        }
    }
}

impl From<&Discount> for DiscountWire {
    fn from(discount: &Discount) -> Self {
        match *discount {
            Discount::Percentage(amount) => DiscountWire {
                kind: Some(Value::from(PERCENTAGE)),
                percentage: Some(Value::from(amount)),
                value: None,
            },
            Discount::Fixed(amount) => DiscountWire {
                kind: Some(Value::from(FIXED)),
                percentage: None,
                value: Some(Value::from(amount)),
            },
        }
    }
}

/// De-normalizes one discount from its wire JSON.
pub fn denormalize_discount(value: &Value) -> Result<Discount, PromotionError> {
    let wire = DiscountWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "discounts",
        value: e.to_string(),
    })?;
    Discount::try_from(wire)
}

/// Normalizes one discount into its wire JSON.
///
/// A non-finite amount has no JSON form and is written as `null`;
/// [`Discount::validate`] rejects such amounts before a save command is sent.
pub fn normalize_discount(discount: &Discount) -> Value {
    serde_json::to_value(DiscountWire::from(discount)).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn percentage_discount_denormalizes() {
        let discount = denormalize_discount(&json!({"type": "percentage", "percentage": 10.0})).unwrap();
        assert_eq!(discount, Discount::Percentage(10.0));
        assert_eq!(discount.discount_type(), "percentage");
    }

    #[test]
    fn fixed_discount_accepts_string_amount() {
        let discount = denormalize_discount(&json!({"type": "fixed", "value": "5.5"})).unwrap();
        assert_eq!(discount, Discount::Fixed(5.5));
    }

    #[test]
    fn unknown_discount_type_is_rejected() {
        let err = denormalize_discount(&json!({"type": "bogo", "value": 1})).unwrap_err();
        assert!(matches!(err, PromotionError::UnexpectedDiscountType(Some(ref t)) if t == "bogo"));
    }

    #[test]
    fn missing_discount_type_is_rejected() {
        let err = denormalize_discount(&json!({"value": 1})).unwrap_err();
        assert!(matches!(err, PromotionError::UnexpectedDiscountType(None)));
    }

    #[test]
    fn non_string_discount_type_is_rejected() {
        let err = denormalize_discount(&json!({"type": 1, "value": 2})).unwrap_err();
        assert!(matches!(err, PromotionError::UnexpectedDiscountType(Some(ref t)) if t == "1"));

        let err = denormalize_discount(&json!({"type": null, "value": 2})).unwrap_err();
        assert!(matches!(err, PromotionError::UnexpectedDiscountType(None)));
    }

    #[test]
    fn non_finite_amount_normalizes_to_null_and_fails_validation() {
        let discount = Discount::Fixed(f64::NAN);
        assert_eq!(normalize_discount(&discount), json!({"type": "fixed", "value": null}));
        assert!(discount.validate().is_err());
    }

    #[test]
    fn percentage_without_amount_is_missing_field() {
        let err = denormalize_discount(&json!({"type": "percentage", "value": 10})).unwrap_err();
        assert!(matches!(err, PromotionError::MissingField { field: "percentage" }));
    }

    #[test]
    fn out_of_range_values_still_denormalize() {
        let discount = denormalize_discount(&json!({"type": "percentage", "percentage": 250})).unwrap();
        assert_eq!(discount, Discount::Percentage(250.0));
        assert!(discount.validate().is_err());
    }

    #[test]
    fn normalize_emits_only_the_variant_field() {
        assert_eq!(
            normalize_discount(&Discount::Percentage(15.0)),
            json!({"type": "percentage", "percentage": 15.0})
        );
        assert_eq!(
            normalize_discount(&Discount::Fixed(3.0)),
            json!({"type": "fixed", "value": 3.0})
        );
    }

    #[test]
    fn validate_bounds() {
        assert!(Discount::Percentage(100.0).validate().is_ok());
        assert!(Discount::Percentage(0.0).validate().is_err());
        assert!(Discount::Fixed(0.0).validate().is_ok());
        assert!(Discount::Fixed(-1.0).validate().is_err());
    }
}
