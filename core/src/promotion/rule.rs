//! Promotion rules: recursive predicate trees over baskets and catalog products.
//!
//! # Design
//! Each family is a closed enum. De-normalization first resolves the wire tag
//! to a `*RuleType` (unknown tags fail there) and then matches exhaustively on
//! that type, so adding a variant without teaching the de-normalizer about it
//! does not compile. `and`/`or` recurse into `items`, preserving child order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PromotionError, RuleFamily};
use crate::promotion::wire;

/// Wire tag vocabulary of basket rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasketRuleType {
    And,
    Or,
    BasketHasProductInList,
    BasketHasGroupInList,
    MaxUsageCount,
    MaxUsageCountPerUser,
    BasketPriceInferiorTo,
    BasketPriceSuperiorTo,
    BasketPriceInferiorOrEqualTo,
    BasketPriceSuperiorOrEqualTo,
    BasketQuantityInferiorTo,
    BasketQuantitySuperiorTo,
    BasketQuantityInferiorOrEqualTo,
    BasketQuantitySuperiorOrEqualTo,
}

impl BasketRuleType {
    pub const ALL: [BasketRuleType; 14] = [
        BasketRuleType::And,
        BasketRuleType::Or,
        BasketRuleType::BasketHasProductInList,
        BasketRuleType::BasketHasGroupInList,
        BasketRuleType::MaxUsageCount,
        BasketRuleType::MaxUsageCountPerUser,
        BasketRuleType::BasketPriceInferiorTo,
        BasketRuleType::BasketPriceSuperiorTo,
        BasketRuleType::BasketPriceInferiorOrEqualTo,
        BasketRuleType::BasketPriceSuperiorOrEqualTo,
        BasketRuleType::BasketQuantityInferiorTo,
        BasketRuleType::BasketQuantitySuperiorTo,
        BasketRuleType::BasketQuantityInferiorOrEqualTo,
        BasketRuleType::BasketQuantitySuperiorOrEqualTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BasketRuleType::And => "and",
            BasketRuleType::Or => "or",
            BasketRuleType::BasketHasProductInList => "basket_has_product_in_list",
            BasketRuleType::BasketHasGroupInList => "basket_has_group_in_list",
            BasketRuleType::MaxUsageCount => "max_usage_count",
            BasketRuleType::MaxUsageCountPerUser => "max_usage_count_per_user",
            BasketRuleType::BasketPriceInferiorTo => "basket_price_inferior_to",
            BasketRuleType::BasketPriceSuperiorTo => "basket_price_superior_to",
            BasketRuleType::BasketPriceInferiorOrEqualTo => "basket_price_inferior_or_equal_to",
            BasketRuleType::BasketPriceSuperiorOrEqualTo => "basket_price_superior_or_equal_to",
            BasketRuleType::BasketQuantityInferiorTo => "basket_quantity_inferior_to",
            BasketRuleType::BasketQuantitySuperiorTo => "basket_quantity_superior_to",
            BasketRuleType::BasketQuantityInferiorOrEqualTo => {
                "basket_quantity_inferior_or_equal_to"
            }
            BasketRuleType::BasketQuantitySuperiorOrEqualTo => {
                "basket_quantity_superior_or_equal_to"
            }
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule_type| rule_type.as_str() == tag)
    }
}

/// Wire tag vocabulary of catalog rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogRuleType {
    And,
    Or,
    ProductInList,
    ProductInCategoryList,
    ProductPriceInferiorTo,
    ProductPriceSuperiorTo,
}

impl CatalogRuleType {
    pub const ALL: [CatalogRuleType; 6] = [
        CatalogRuleType::And,
        CatalogRuleType::Or,
        CatalogRuleType::ProductInList,
        CatalogRuleType::ProductInCategoryList,
        CatalogRuleType::ProductPriceInferiorTo,
        CatalogRuleType::ProductPriceSuperiorTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogRuleType::And => "and",
            CatalogRuleType::Or => "or",
            CatalogRuleType::ProductInList => "product_in_list",
            CatalogRuleType::ProductInCategoryList => "product_in_category_list",
            CatalogRuleType::ProductPriceInferiorTo => "product_price_inferior_to",
            CatalogRuleType::ProductPriceSuperiorTo => "product_price_superior_to",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule_type| rule_type.as_str() == tag)
    }
}

/// Predicate evaluated against a basket.
#[derive(Debug, Clone, PartialEq)]
pub enum BasketRule {
    And(Vec<BasketRule>),
    Or(Vec<BasketRule>),
    BasketHasProductInList(Vec<u64>),
    BasketHasGroupInList(Vec<String>),
    MaxUsageCount(u32),
    MaxUsageCountPerUser(u32),
    BasketPriceInferiorTo(f64),
    BasketPriceSuperiorTo(f64),
    BasketPriceInferiorOrEqualTo(f64),
    BasketPriceSuperiorOrEqualTo(f64),
    BasketQuantityInferiorTo(u32),
    BasketQuantitySuperiorTo(u32),
    BasketQuantityInferiorOrEqualTo(u32),
    BasketQuantitySuperiorOrEqualTo(u32),
}

impl BasketRule {
    pub fn rule_type(&self) -> BasketRuleType {
        match self {
            BasketRule::And(_) => BasketRuleType::And,
            BasketRule::Or(_) => BasketRuleType::Or,
            BasketRule::BasketHasProductInList(_) => BasketRuleType::BasketHasProductInList,
            BasketRule::BasketHasGroupInList(_) => BasketRuleType::BasketHasGroupInList,
            BasketRule::MaxUsageCount(_) => BasketRuleType::MaxUsageCount,
            BasketRule::MaxUsageCountPerUser(_) => BasketRuleType::MaxUsageCountPerUser,
            BasketRule::BasketPriceInferiorTo(_) => BasketRuleType::BasketPriceInferiorTo,
            BasketRule::BasketPriceSuperiorTo(_) => BasketRuleType::BasketPriceSuperiorTo,
            BasketRule::BasketPriceInferiorOrEqualTo(_) => {
                BasketRuleType::BasketPriceInferiorOrEqualTo
            }
            BasketRule::BasketPriceSuperiorOrEqualTo(_) => {
                BasketRuleType::BasketPriceSuperiorOrEqualTo
            }
            BasketRule::BasketQuantityInferiorTo(_) => BasketRuleType::BasketQuantityInferiorTo,
            BasketRule::BasketQuantitySuperiorTo(_) => BasketRuleType::BasketQuantitySuperiorTo,
            BasketRule::BasketQuantityInferiorOrEqualTo(_) => {
                BasketRuleType::BasketQuantityInferiorOrEqualTo
            }
            BasketRule::BasketQuantitySuperiorOrEqualTo(_) => {
                BasketRuleType::BasketQuantitySuperiorOrEqualTo
            }
        }
    }

    /// Children of an `and`/`or` node; empty for leaves.
    pub fn items(&self) -> &[BasketRule] {
        match self {
            BasketRule::And(items) | BasketRule::Or(items) => items,
            _ => &[],
        }
    }
}

/// Predicate evaluated against a single catalog product.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRule {
    And(Vec<CatalogRule>),
    Or(Vec<CatalogRule>),
    ProductInList(Vec<u64>),
    ProductInCategoryList(Vec<u64>),
    ProductPriceInferiorTo(f64),
    ProductPriceSuperiorTo(f64),
}

impl CatalogRule {
    pub fn rule_type(&self) -> CatalogRuleType {
        match self {
            CatalogRule::And(_) => CatalogRuleType::And,
            CatalogRule::Or(_) => CatalogRuleType::Or,
            CatalogRule::ProductInList(_) => CatalogRuleType::ProductInList,
            CatalogRule::ProductInCategoryList(_) => CatalogRuleType::ProductInCategoryList,
            CatalogRule::ProductPriceInferiorTo(_) => CatalogRuleType::ProductPriceInferiorTo,
            CatalogRule::ProductPriceSuperiorTo(_) => CatalogRuleType::ProductPriceSuperiorTo,
        }
    }

    /// Children of an `and`/`or` node; empty for leaves.
    pub fn items(&self) -> &[CatalogRule] {
        match self {
            CatalogRule::And(items) | CatalogRule::Or(items) => items,
            _ => &[],
        }
    }
}

/// Union of every field either rule family puts on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RuleWire {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<RuleWire>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    products_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    groups_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl RuleWire {
    fn tagged(tag: &str) -> Self {
        RuleWire {
            kind: Some(Value::from(tag)),
            ..RuleWire::default()
        }
    }

    fn with_items<'a, R>(tag: &str, items: &'a [R]) -> Self
    where
        RuleWire: From<&'a R>,
    {
        RuleWire {
            items: Some(items.iter().map(RuleWire::from).collect()),
            ..RuleWire::tagged(tag)
        }
    }

    fn with_ids(tag: &str, ids: &[u64]) -> Self {
        RuleWire {
            products_ids: Some(ids.iter().copied().map(Value::from).collect()),
            ..RuleWire::tagged(tag)
        }
    }

    fn with_value(tag: &str, value: impl Into<Value>) -> Self {
        RuleWire {
            value: Some(value.into()),
            ..RuleWire::tagged(tag)
        }
    }

    fn unexpected(&self, family: RuleFamily) -> PromotionError {
        PromotionError::UnexpectedRuleType {
            family,
            found: wire::tag_text(self.kind.as_ref()).unwrap_or_default(),
        }
    }

    fn children<R>(&self) -> Result<Vec<R>, PromotionError>
    where
        R: for<'a> TryFrom<&'a RuleWire, Error = PromotionError>,
    {
        wire::required(self.items.as_deref(), "items")?
            .iter()
            .map(R::try_from)
            .collect()
    }

    fn products_ids(&self) -> Result<Vec<u64>, PromotionError> {
        let ids = wire::required(self.products_ids.as_deref(), "products_ids")?;
        wire::id_list(ids, "products_ids")
    }

    fn categories_ids(&self) -> Result<Vec<u64>, PromotionError> {
        let ids = wire::required(self.categories_ids.as_deref(), "categories_ids")?;
        wire::id_list(ids, "categories_ids")
    }

    fn groups_ids(&self) -> Result<Vec<String>, PromotionError> {
        let ids = wire::required(self.groups_ids.as_deref(), "groups_ids")?;
        wire::string_list(ids, "groups_ids")
    }

    fn amount(&self) -> Result<f64, PromotionError> {
        wire::decimal(wire::required(self.value.as_ref(), "value")?, "value")
    }

    fn count(&self) -> Result<u32, PromotionError> {
        wire::count(wire::required(self.value.as_ref(), "value")?, "value")
    }
}

impl TryFrom<&RuleWire> for BasketRule {
    type Error = PromotionError;

    fn try_from(wire: &RuleWire) -> Result<Self, Self::Error> {
        let rule_type = wire::tag(wire.kind.as_ref())
            .and_then(BasketRuleType::from_tag)
            .ok_or_else(|| wire.unexpected(RuleFamily::Basket))?;

        let rule = match rule_type {
            BasketRuleType::And => BasketRule::And(wire.children()?),
            BasketRuleType::Or => BasketRule::Or(wire.children()?),
            BasketRuleType::BasketHasProductInList => {
                BasketRule::BasketHasProductInList(wire.products_ids()?)
            }
            BasketRuleType::BasketHasGroupInList => {
                BasketRule::BasketHasGroupInList(wire.groups_ids()?)
            }
            BasketRuleType::MaxUsageCount => BasketRule::MaxUsageCount(wire.count()?),
            BasketRuleType::MaxUsageCountPerUser => BasketRule::MaxUsageCountPerUser(wire.count()?),
            BasketRuleType::BasketPriceInferiorTo => {
                BasketRule::BasketPriceInferiorTo(wire.amount()?)
            }
            BasketRuleType::BasketPriceSuperiorTo => {
                BasketRule::BasketPriceSuperiorTo(wire.amount()?)
            }
            BasketRuleType::BasketPriceInferiorOrEqualTo => {
                BasketRule::BasketPriceInferiorOrEqualTo(wire.amount()?)
            }
            BasketRuleType::BasketPriceSuperiorOrEqualTo => {
                BasketRule::BasketPriceSuperiorOrEqualTo(wire.amount()?)
            }
            BasketRuleType::BasketQuantityInferiorTo => {
                BasketRule::BasketQuantityInferiorTo(wire.count()?)
            }
            BasketRuleType::BasketQuantitySuperiorTo => {
                BasketRule::BasketQuantitySuperiorTo(wire.count()?)
            }
            BasketRuleType::BasketQuantityInferiorOrEqualTo => {
                BasketRule::BasketQuantityInferiorOrEqualTo(wire.count()?)
            }
            BasketRuleType::BasketQuantitySuperiorOrEqualTo => {
                BasketRule::BasketQuantitySuperiorOrEqualTo(wire.count()?)
            }
        };

        Ok(rule)
    }
}

impl From<&BasketRule> for RuleWire {
    fn from(rule: &BasketRule) -> Self {
        let tag = rule.rule_type().as_str();
        match rule {
            BasketRule::And(items) | BasketRule::Or(items) => RuleWire::with_items(tag, items),
            BasketRule::BasketHasProductInList(ids) => RuleWire::with_ids(tag, ids),
            BasketRule::BasketHasGroupInList(groups) => RuleWire {
                groups_ids: Some(groups.iter().cloned().map(Value::from).collect()),
                ..RuleWire::tagged(tag)
            },
            BasketRule::MaxUsageCount(count)
            | BasketRule::MaxUsageCountPerUser(count)
            | BasketRule::BasketQuantityInferiorTo(count)
            | BasketRule::BasketQuantitySuperiorTo(count)
            | BasketRule::BasketQuantityInferiorOrEqualTo(count)
            | BasketRule::BasketQuantitySuperiorOrEqualTo(count) => {
                RuleWire::with_value(tag, *count)
            }
            BasketRule::BasketPriceInferiorTo(amount)
            | BasketRule::BasketPriceSuperiorTo(amount)
            | BasketRule::BasketPriceInferiorOrEqualTo(amount)
            | BasketRule::BasketPriceSuperiorOrEqualTo(amount) => {
                RuleWire::with_value(tag, *amount)
            }
        }
    }
}

impl TryFrom<&RuleWire> for CatalogRule {
    type Error = PromotionError;

    fn try_from(wire: &RuleWire) -> Result<Self, Self::Error> {
        let rule_type = wire::tag(wire.kind.as_ref())
            .and_then(CatalogRuleType::from_tag)
            .ok_or_else(|| wire.unexpected(RuleFamily::Catalog))?;

        let rule = match rule_type {
            CatalogRuleType::And => CatalogRule::And(wire.children()?),
            CatalogRuleType::Or => CatalogRule::Or(wire.children()?),
            CatalogRuleType::ProductInList => CatalogRule::ProductInList(wire.products_ids()?),
            CatalogRuleType::ProductInCategoryList => {
                CatalogRule::ProductInCategoryList(wire.categories_ids()?)
            }
            CatalogRuleType::ProductPriceInferiorTo => {
                CatalogRule::ProductPriceInferiorTo(wire.amount()?)
            }
            CatalogRuleType::ProductPriceSuperiorTo => {
                CatalogRule::ProductPriceSuperiorTo(wire.amount()?)
            }
        };

        Ok(rule)
    }
}

impl From<&CatalogRule> for RuleWire {
    fn from(rule: &CatalogRule) -> Self {
        let tag = rule.rule_type().as_str();
        match rule {
            CatalogRule::And(items) | CatalogRule::Or(items) => RuleWire::with_items(tag, items),
            CatalogRule::ProductInList(ids) => RuleWire::with_ids(tag, ids),
            CatalogRule::ProductInCategoryList(ids) => RuleWire {
                categories_ids: Some(ids.iter().copied().map(Value::from).collect()),
                ..RuleWire::tagged(tag)
            },
            CatalogRule::ProductPriceInferiorTo(amount)
            | CatalogRule::ProductPriceSuperiorTo(amount) => RuleWire::with_value(tag, *amount),
        }
    }
}

fn decode(value: &Value) -> Result<RuleWire, PromotionError> {
    RuleWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "rule",
        value: e.to_string(),
    })
}

fn encode(wire: RuleWire) -> Value {
    serde_json::to_value(wire).unwrap_or(Value::Null)
}

/// De-normalizes a basket rule tree from its wire JSON.
pub fn denormalize_basket_rule(value: &Value) -> Result<BasketRule, PromotionError> {
    BasketRule::try_from(&decode(value)?)
}

/// Normalizes a basket rule tree into its wire JSON.
///
/// Non-finite price thresholds have no JSON form and are written as `null`.
pub fn normalize_basket_rule(rule: &BasketRule) -> Value {
    encode(RuleWire::from(rule))
}

/// De-normalizes a catalog rule tree from its wire JSON.
pub fn denormalize_catalog_rule(value: &Value) -> Result<CatalogRule, PromotionError> {
    CatalogRule::try_from(&decode(value)?)
}

/// Normalizes a catalog rule tree into its wire JSON.
///
/// Non-finite price thresholds have no JSON form and are written as `null`.
pub fn normalize_catalog_rule(rule: &CatalogRule) -> Value {
    encode(RuleWire::from(rule))
}
