//! What part of a basket a basket-level discount applies to.
//!
//! On the wire the discriminant and the product id list share one string,
//! `"product_in_basket;12,45,78"`. [`pack_target`] and [`unpack_target`] are
//! the only places that know about that layout.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PromotionError;
use crate::promotion::wire;

const BASKET: &str = "basket";
const PRODUCT_IN_BASKET: &str = "product_in_basket";
const SHIPPING: &str = "shipping";

const PAYLOAD_DELIMITER: char = ';';
const ID_DELIMITER: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasketPromotionTarget {
    Basket,
    /// Specific products of the basket. Never empty once de-normalized; a
    /// hand-built empty list is caught by [`BasketPromotionTarget::validate`].
    Products(Vec<u64>),
    Shipping,
}

impl BasketPromotionTarget {
    /// Builds a `Products` target, refusing an empty id list.
    pub fn products(ids: Vec<u64>) -> Result<Self, PromotionError> {
        if ids.is_empty() {
            return Err(PromotionError::EmptyTargetProductIds);
        }
        Ok(BasketPromotionTarget::Products(ids))
    }

    pub fn target_type(&self) -> &'static str {
        match self {
            BasketPromotionTarget::Basket => BASKET,
            BasketPromotionTarget::Products(_) => PRODUCT_IN_BASKET,
            BasketPromotionTarget::Shipping => SHIPPING,
        }
    }

    /// Rejects a `Products` target without ids, which would pack into a
    /// string that does not unpack. Save commands run this before
    /// serializing.
    pub fn validate(&self) -> Result<(), PromotionError> {
        match self {
            BasketPromotionTarget::Products(ids) if ids.is_empty() => {
                Err(PromotionError::EmptyTargetProductIds)
            }
            _ => Ok(()),
        }
    }
}

/// Packs a target into the legacy `type` string.
pub fn pack_target(target: &BasketPromotionTarget) -> String {
    match target {
        BasketPromotionTarget::Products(ids) => {
            let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
            format!(
                "{PRODUCT_IN_BASKET}{PAYLOAD_DELIMITER}{}",
                ids.join(ID_DELIMITER)
            )
        }
        other => other.target_type().to_string(),
    }
}

/// Unpacks the legacy `type` string into a target.
pub fn unpack_target(packed: &str) -> Result<BasketPromotionTarget, PromotionError> {
    let (discriminant, payload) = match packed.split_once(PAYLOAD_DELIMITER) {
        Some((discriminant, payload)) => (discriminant, Some(payload)),
        None => (packed, None),
    };

    match discriminant {
        BASKET => Ok(BasketPromotionTarget::Basket),
        SHIPPING => Ok(BasketPromotionTarget::Shipping),
        PRODUCT_IN_BASKET => {
            let payload = payload
                .map(str::trim)
                .filter(|payload| !payload.is_empty())
                .ok_or(PromotionError::EmptyTargetProductIds)?;

            let ids = payload
                .split(ID_DELIMITER)
                .map(|id| {
                    id.trim()
                        .parse::<u64>()
                        .map_err(|_| PromotionError::InvalidTargetProductId(id.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            BasketPromotionTarget::products(ids)
        }
        other => Err(PromotionError::UnexpectedTargetType(other.to_string())),
    }
}

/// `{ "type": "product_in_basket;12,45" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TargetWire {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
}

impl TryFrom<&TargetWire> for BasketPromotionTarget {
    type Error = PromotionError;

    fn try_from(wire: &TargetWire) -> Result<Self, Self::Error> {
        match wire::tag(wire.kind.as_ref()) {
            Some(packed) => unpack_target(packed),
            None => Err(PromotionError::UnexpectedTargetType(
                wire::tag_text(wire.kind.as_ref()).unwrap_or_default(),
            )),
        }
    }
}

impl From<&BasketPromotionTarget> for TargetWire {
    fn from(target: &BasketPromotionTarget) -> Self {
        TargetWire {
            kind: Some(Value::String(pack_target(target))),
        }
    }
}

/// De-normalizes a target from its wire JSON.
pub fn denormalize_target(value: &Value) -> Result<BasketPromotionTarget, PromotionError> {
    let wire = TargetWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "target",
        value: e.to_string(),
    })?;
    BasketPromotionTarget::try_from(&wire)
}

/// Normalizes a target into its wire JSON.
///
/// Does not validate: call [`BasketPromotionTarget::validate`] first when the
/// target was built by hand.
pub fn normalize_target(target: &BasketPromotionTarget) -> Value {
    serde_json::json!({ "type": pack_target(target) })
}
