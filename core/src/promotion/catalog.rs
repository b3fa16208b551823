//! Catalog promotions: company-scoped discounts on individual products.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PromotionError;
use crate::promotion::command::{self, Patch};
use crate::promotion::discount::{Discount, DiscountWire};
use crate::promotion::period::{PeriodWire, PromotionPeriod};
use crate::promotion::rule::{CatalogRule, RuleWire};
use crate::promotion::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPromotion {
    promotion_id: Uuid,
    company_id: u64,
    name: String,
    active: bool,
    rule: CatalogRule,
    discounts: Vec<Discount>,
    period: PromotionPeriod,
}

impl CatalogPromotion {
    pub fn promotion_id(&self) -> Uuid {
        self.promotion_id
    }

    pub fn company_id(&self) -> u64 {
        self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rule(&self) -> &CatalogRule {
        &self.rule
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn period(&self) -> &PromotionPeriod {
        &self.period
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogPromotionWire {
    promotion_id: Uuid,
    company_id: Value,
    name: String,
    active: bool,
    rule: RuleWire,
    #[serde(default)]
    discounts: Vec<DiscountWire>,
    period: PeriodWire,
}

impl TryFrom<CatalogPromotionWire> for CatalogPromotion {
    type Error = PromotionError;

    fn try_from(wire: CatalogPromotionWire) -> Result<Self, Self::Error> {
        Ok(CatalogPromotion {
            promotion_id: wire.promotion_id,
            company_id: wire::unsigned(&wire.company_id, "company_id")?,
            name: wire.name,
            active: wire.active,
            rule: CatalogRule::try_from(&wire.rule)?,
            discounts: wire
                .discounts
                .into_iter()
                .map(Discount::try_from)
                .collect::<Result<_, _>>()?,
            period: PromotionPeriod::try_from(&wire.period)?,
        })
    }
}

/// De-normalizes a catalog promotion. Nothing is returned unless every
/// nested value is valid.
pub fn denormalize_catalog_promotion(value: &Value) -> Result<CatalogPromotion, PromotionError> {
    let wire = CatalogPromotionWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "promotion",
        value: e.to_string(),
    })?;
    CatalogPromotion::try_from(wire)
}

/// Partial create/update payload for a catalog promotion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveCatalogPromotionCommand {
    promotion_id: Option<Uuid>,
    name: Patch<String>,
    active: Patch<bool>,
    rule: Patch<CatalogRule>,
    discounts: Patch<Vec<Discount>>,
    period: Patch<PromotionPeriod>,
}

impl SaveCatalogPromotionCommand {
    /// Command for a promotion that does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Command updating the promotion identified by `promotion_id`.
    pub fn update(promotion_id: Uuid) -> Self {
        Self {
            promotion_id: Some(promotion_id),
            ..Self::default()
        }
    }

    /// Full update command carrying every field of `promotion`.
    pub fn from_promotion(promotion: &CatalogPromotion) -> Self {
        Self::update(promotion.promotion_id)
            .set_name(promotion.name.clone())
            .set_active(promotion.active)
            .set_rule(promotion.rule.clone())
            .set_discounts(Some(promotion.discounts.clone()))
            .set_period(promotion.period)
    }

    pub fn promotion_id(&self) -> Option<Uuid> {
        self.promotion_id
    }

    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Patch::Value(name.into());
        self
    }

    pub fn set_active(mut self, active: bool) -> Self {
        self.active = Patch::Value(active);
        self
    }

    pub fn set_rule(mut self, rule: CatalogRule) -> Self {
        self.rule = Patch::Value(rule);
        self
    }

    /// `None` leaves the stored discounts untouched; `Some(vec![])` clears them.
    pub fn set_discounts(mut self, discounts: Option<Vec<Discount>>) -> Self {
        self.discounts = discounts.into();
        self
    }

    pub fn set_period(mut self, period: PromotionPeriod) -> Self {
        self.period = Patch::Value(period);
        self
    }

    pub fn validate(&self) -> Result<(), PromotionError> {
        command::validate_name(&self.name)?;
        command::validate_discounts(&self.discounts)
    }
}

#[derive(Serialize)]
struct SaveCatalogPromotionWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    promotion_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    active: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    rule: Patch<RuleWire>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    discounts: Patch<Vec<DiscountWire>>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    period: Patch<PeriodWire>,
}

impl From<&SaveCatalogPromotionCommand> for SaveCatalogPromotionWire {
    fn from(command: &SaveCatalogPromotionCommand) -> Self {
        SaveCatalogPromotionWire {
            promotion_id: command.promotion_id,
            name: command.name.clone(),
            active: command.active.clone(),
            rule: command.rule.as_ref().map(RuleWire::from),
            discounts: command
                .discounts
                .as_ref()
                .map(|discounts| discounts.iter().map(DiscountWire::from).collect()),
            period: command.period.as_ref().map(PeriodWire::from),
        }
    }
}

impl Serialize for SaveCatalogPromotionCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SaveCatalogPromotionWire::from(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> Value {
        json!({
            "promotion_id": "7d2b9a54-4c1f-4f1e-9f6a-0b3c2e1d5a77",
            "company_id": 3,
            "name": "Summer sale",
            "active": true,
            "rule": {
                "type": "or",
                "items": [
                    {"type": "product_in_list", "products_ids": [1, 2]},
                    {"type": "product_in_category_list", "categories_ids": [9]}
                ]
            },
            "discounts": [{"type": "percentage", "percentage": 20.0}],
            "period": {"from": "2020-06-01T00:00:00+00:00", "to": "2020-08-31T23:59:59+00:00"}
        })
    }

    #[test]
    fn catalog_promotion_denormalizes() {
        let promotion = denormalize_catalog_promotion(&payload()).unwrap();
        assert_eq!(promotion.company_id(), 3);
        assert_eq!(promotion.name(), "Summer sale");
        assert!(promotion.is_active());
        assert_eq!(promotion.discounts(), &[Discount::Percentage(20.0)]);
        assert_eq!(
            promotion.rule(),
            &CatalogRule::Or(vec![
                CatalogRule::ProductInList(vec![1, 2]),
                CatalogRule::ProductInCategoryList(vec![9]),
            ])
        );
    }

    #[test]
    fn full_command_normalizes_back_to_the_payload() {
        let promotion = denormalize_catalog_promotion(&payload()).unwrap();
        let mut expected = payload();
        expected.as_object_mut().unwrap().remove("company_id");

        let normalized = serde_json::to_value(SaveCatalogPromotionCommand::from_promotion(&promotion)).unwrap();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn nested_failure_aborts_the_aggregate() {
        let mut broken = payload();
        broken["discounts"] = json!([{"type": "percentage", "percentage": 5}, {"type": "free"}]);
        assert!(matches!(
            denormalize_catalog_promotion(&broken),
            Err(PromotionError::UnexpectedDiscountType(_))
        ));
    }

    #[test]
    fn partial_command_only_carries_set_fields() {
        let command = SaveCatalogPromotionCommand::new().set_name("Flash").set_active(false);
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"name": "Flash", "active": false})
        );
    }

    #[test]
    fn null_and_empty_discounts_are_distinct() {
        let keep = SaveCatalogPromotionCommand::new().set_discounts(None);
        let clear = SaveCatalogPromotionCommand::new().set_discounts(Some(Vec::new()));
        assert_eq!(serde_json::to_value(&keep).unwrap(), json!({"discounts": null}));
        assert_eq!(serde_json::to_value(&clear).unwrap(), json!({"discounts": []}));
    }

    #[test]
    fn validate_rejects_out_of_range_discount() {
        let command = SaveCatalogPromotionCommand::new().set_discounts(Some(vec![Discount::Percentage(120.0)]));
        assert!(matches!(command.validate(), Err(PromotionError::InvalidDiscount(_))));
    }
}
