//! Marketplace promotions: operator-wide coupons not tied to a company.
//!
//! Unlike basket promotions the rule is optional; a promotion without a rule
//! applies unconditionally, which is not the same thing as an empty `and`.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PromotionError;
use crate::promotion::command::{self, Patch};
use crate::promotion::discount::{Discount, DiscountWire};
use crate::promotion::period::{PeriodWire, PromotionPeriod};
use crate::promotion::rule::{BasketRule, RuleWire};
use crate::promotion::target::{BasketPromotionTarget, TargetWire};

#[derive(Debug, Clone, PartialEq)]
pub struct MarketplacePromotion {
    promotion_id: Uuid,
    name: String,
    active: bool,
    is_valid: bool,
    rule: Option<BasketRule>,
    discounts: Vec<Discount>,
    period: PromotionPeriod,
    coupon: String,
    target: BasketPromotionTarget,
}

impl MarketplacePromotion {
    pub fn promotion_id(&self) -> Uuid {
        self.promotion_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Computed by the server; read-only.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn rule(&self) -> Option<&BasketRule> {
        self.rule.as_ref()
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn period(&self) -> &PromotionPeriod {
        &self.period
    }

    pub fn coupon(&self) -> &str {
        &self.coupon
    }

    pub fn target(&self) -> &BasketPromotionTarget {
        &self.target
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MarketplacePromotionWire {
    promotion_id: Uuid,
    name: String,
    active: bool,
    #[serde(rename = "isValid", default)]
    is_valid: bool,
    #[serde(default)]
    rule: Option<RuleWire>,
    #[serde(default)]
    discounts: Vec<DiscountWire>,
    period: PeriodWire,
    coupon: String,
    target: TargetWire,
}

impl TryFrom<MarketplacePromotionWire> for MarketplacePromotion {
    type Error = PromotionError;

    fn try_from(wire: MarketplacePromotionWire) -> Result<Self, Self::Error> {
        Ok(MarketplacePromotion {
            promotion_id: wire.promotion_id,
            name: wire.name,
            active: wire.active,
            is_valid: wire.is_valid,
            rule: wire.rule.as_ref().map(BasketRule::try_from).transpose()?,
            discounts: wire
                .discounts
                .into_iter()
                .map(Discount::try_from)
                .collect::<Result<_, _>>()?,
            period: PromotionPeriod::try_from(&wire.period)?,
            coupon: wire.coupon,
            target: BasketPromotionTarget::try_from(&wire.target)?,
        })
    }
}

/// De-normalizes a marketplace promotion, all-or-nothing.
pub fn denormalize_marketplace_promotion(value: &Value) -> Result<MarketplacePromotion, PromotionError> {
    let wire = MarketplacePromotionWire::deserialize(value).map_err(|e| PromotionError::InvalidField {
        field: "promotion",
        value: e.to_string(),
    })?;
    MarketplacePromotion::try_from(wire)
}

/// Partial create/update payload for a marketplace promotion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveMarketplacePromotionCommand {
    promotion_id: Option<Uuid>,
    name: Patch<String>,
    active: Patch<bool>,
    rule: Patch<BasketRule>,
    discounts: Patch<Vec<Discount>>,
    period: Patch<PromotionPeriod>,
    coupon: Patch<String>,
    target: Patch<BasketPromotionTarget>,
}

impl SaveMarketplacePromotionCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(promotion_id: Uuid) -> Self {
        Self {
            promotion_id: Some(promotion_id),
            ..Self::default()
        }
    }

    /// Full update command carrying every writable field of `promotion`.
    pub fn from_promotion(promotion: &MarketplacePromotion) -> Self {
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

    /// `None` removes the rule, making the promotion unconditional.
    pub fn set_rule(mut self, rule: Option<BasketRule>) -> Self {
        self.rule = rule.into();
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

    pub fn set_coupon(mut self, coupon: impl Into<String>) -> Self {
        self.coupon = Patch::Value(coupon.into());
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
struct SaveMarketplacePromotionWire {
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

impl From<&SaveMarketplacePromotionCommand> for SaveMarketplacePromotionWire {
    fn from(command: &SaveMarketplacePromotionCommand) -> Self {
        SaveMarketplacePromotionWire {
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

impl Serialize for SaveMarketplacePromotionCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SaveMarketplacePromotionWire::from(self).serialize(serializer)
    }
}
