//! Basket promotions: company-scoped discounts applied at checkout.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PromotionError;
use crate::promotion::command::{self, Patch};
use crate::promotion::discount::{Discount, DiscountWire};
use crate::promotion::period::{PeriodWire, PromotionPeriod};
use crate::promotion::rule::{BasketRule, RuleWire};
use crate::promotion::target::{BasketPromotionTarget, TargetWire};
use crate::promotion::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct BasketPromotion {
    promotion_id: Uuid,
    company_id: u64,
    name: String,
    active: bool,
    rule: BasketRule,
    discounts: Vec<Discount>,
    period: PromotionPeriod,
    coupon: Option<String>,
    target: BasketPromotionTarget,
}

impl BasketPromotion {
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

    pub fn rule(&self) -> &BasketRule {
        &self.rule
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn period(&self) -> &PromotionPeriod {
        &self.period
    }

    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }

    pub fn target(&self) -> &BasketPromotionTarget {
        &self.target
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BasketPromotionWire {
    promotion_id: Uuid,
    company_id: Value,
    name: String,
    active: bool,
    rule: RuleWire,
    #[serde(default)]
    discounts: Vec<DiscountWire>,
    period: PeriodWire,
    #[serde(default)]
    coupon: Option<String>,
    target: TargetWire,
}

impl TryFrom<BasketPromotionWire> for BasketPromotion {
    type Error = PromotionError;

    fn try_from(wire: BasketPromotionWire) -> Result<Self, Self::Error> {
        Ok(BasketPromotion {
            promotion_id: wire.promotion_id,
            company_id: wire::unsigned(&wire.company_id, "company_id")?,
            name: wire.name,
            active: wire.active,
            rule: BasketRule::try_from(&wire.rule)?,
            discounts: wire
                .discounts
                .into_iter()
                .map(Discount::try_from)
                .collect::<Result<_, _>>()?,
            period: PromotionPeriod::try_from(&wire.period)?,
            coupon: wire.coupon.filter(|code| !code.is_empty()),
            target: BasketPromotionTarget::try_from(&wire.target)?,
        })
    }
}

/// De-normalizes a basket promotion, all-or-nothing.
pub fn denormalize_basket_promotion(value: &Value) -> Result<BasketPromotion, PromotionError> {
    let wire = BasketPromotionWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "promotion",
        value: e.to_string(),
    })?;
    BasketPromotion::try_from(wire)
}

/// Partial create/update payload for a basket promotion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveBasketPromotionCommand {
    promotion_id: Option<Uuid>,
    name: Patch<String>,
    active: Patch<bool>,
    rule: Patch<BasketRule>,
    discounts: Patch<Vec<Discount>>,
    period: Patch<PromotionPeriod>,
    coupon: Patch<String>,
    target: Patch<BasketPromotionTarget>,
}

impl SaveBasketPromotionCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(promotion_id: Uuid) -> Self {
        Self {
            promotion_id: Some(promotion_id),
            ..Self::default()
        }
    }

    /// Full update command carrying every field of `promotion`.
    pub fn from_promotion(promotion: &BasketPromotion) -> Self {
        Self::update(promotion.promotion_id)
            .set_name(promotion.name.clone())
            .set_active(promotion.active)
            .set_rule(promotion.rule.clone())
            .set_discounts(Some(promotion.discounts.clone()))
            .set_period(promotion.period)
            .set_coupon(promotion.coupon.clone())
            .set_target(promotion.target.clone())
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

    pub fn set_rule(mut self, rule: BasketRule) -> Self {
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

    /// `None` removes the coupon code.
    pub fn set_coupon(mut self, coupon: Option<String>) -> Self {
        self.coupon = coupon.into();
        self
    }

    pub fn set_target(mut self, target: BasketPromotionTarget) -> Self {
        self.target = Patch::Value(target);
        self
    }

    pub fn validate(&self) -> Result<(), PromotionError> {
        command::validate_name(&self.name)?;
        command::validate_discounts(&self.discounts)?;
        command::validate_coupon(&self.coupon)?;
        self.target
            .value()
            .map_or(Ok(()), BasketPromotionTarget::validate)
    }
}

#[derive(Serialize)]
struct SaveBasketPromotionWire {
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
    #[serde(skip_serializing_if = "Patch::is_unset")]
    coupon: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    target: Patch<TargetWire>,
}

impl From<&SaveBasketPromotionCommand> for SaveBasketPromotionWire {
    fn from(command: &SaveBasketPromotionCommand) -> Self {
        SaveBasketPromotionWire {
            promotion_id: command.promotion_id,
            name: command.name.clone(),
            active: command.active.clone(),
            rule: command.rule.as_ref().map(RuleWire::from),
            discounts: command
                .discounts
                .as_ref()
                .map(|discounts| discounts.iter().map(DiscountWire::from).collect()),
            period: command.period.as_ref().map(PeriodWire::from),
            coupon: command.coupon.clone(),
            target: command.target.as_ref().map(TargetWire::from),
        }
    }
}

impl Serialize for SaveBasketPromotionCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SaveBasketPromotionWire::from(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> Value {
        json!({
            "promotion_id": "0f8c2d6e-9a1b-4c3d-8e7f-112233445566",
            "company_id": "8",
            "name": "Big basket",
            "active": true,
            "rule": {
                "type": "and",
                "items": [
                    {"type": "basket_price_superior_to", "value": 50},
                    {"type": "max_usage_count", "value": 3}
                ]
            },
            "discounts": [{"type": "fixed", "value": 5.0}],
            "period": {"from": "2020-01-01T00:00:00+00:00", "to": "2020-12-31T23:59:59+00:00"},
            "coupon": "BIG5",
            "target": {"type": "product_in_basket;12,45"}
        })
    }

    #[test]
    fn basket_promotion_with_nested_rule_denormalizes() {
        let promotion = denormalize_basket_promotion(&payload()).unwrap();

        assert_eq!(promotion.company_id(), 8);
        assert_eq!(
            promotion.rule(),
            &BasketRule::And(vec![
                BasketRule::BasketPriceSuperiorTo(50.0),
                BasketRule::MaxUsageCount(3),
            ])
        );
        assert_eq!(promotion.rule().rule_type().as_str(), "and");
        assert_eq!(promotion.coupon(), Some("BIG5"));
        assert_eq!(promotion.target(), &BasketPromotionTarget::Products(vec![12, 45]));
    }

    #[test]
    fn missing_coupon_is_none() {
        let mut without = payload();
        without.as_object_mut().unwrap().remove("coupon");
        assert_eq!(denormalize_basket_promotion(&without).unwrap().coupon(), None);
    }

    #[test]
    fn empty_product_target_aborts_the_aggregate() {
        let mut broken = payload();
        broken["target"] = json!({"type": "product_in_basket;"});
        assert!(matches!(
            denormalize_basket_promotion(&broken),
            Err(PromotionError::EmptyTargetProductIds)
        ));
    }

    #[test]
    fn inverted_period_aborts_the_aggregate() {
        let mut broken = payload();
        broken["period"] = json!({"from": "2021-01-01T00:00:00+00:00", "to": "2020-01-01T00:00:00+00:00"});
        assert!(matches!(
            denormalize_basket_promotion(&broken),
            Err(PromotionError::InvalidPeriod)
        ));
    }

    #[test]
    fn partial_update_keeps_only_identifier_and_set_fields() {
        let id = Uuid::nil();
        let command = SaveBasketPromotionCommand::update(id).set_name("Renamed").set_active(true);
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "promotion_id": "00000000-0000-0000-0000-000000000000",
                "name": "Renamed",
                "active": true
            })
        );
    }

    #[test]
    fn target_and_coupon_normalize() {
        let command = SaveBasketPromotionCommand::new()
            .set_target(BasketPromotionTarget::Products(vec![12, 45, 78]))
            .set_coupon(None);
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"target": {"type": "product_in_basket;12,45,78"}, "coupon": null})
        );
    }

    #[test]
    fn from_promotion_round_trips_the_payload() {
        let mut expected = payload();
        let promotion = denormalize_basket_promotion(&expected).unwrap();
        let object = expected.as_object_mut().unwrap();
        object.remove("company_id");
        object["rule"]["items"][0]["value"] = json!(50.0);

        let normalized = serde_json::to_value(SaveBasketPromotionCommand::from_promotion(&promotion)).unwrap();
        assert_eq!(normalized, expected);
    }

    #[test]
    fn validate_rejects_empty_product_target() {
        let command = SaveBasketPromotionCommand::new().set_target(BasketPromotionTarget::Products(Vec::new()));
        assert!(matches!(command.validate(), Err(PromotionError::EmptyTargetProductIds)));
    }

    #[test]
    fn validate_rejects_blank_coupon() {
        let command = SaveBasketPromotionCommand::new().set_coupon(Some(" ".to_string()));
        assert!(command.validate().is_err());
    }
}
