//! Typed promotion model and its wire (de-)normalization.
//!
//! Three aggregates share one vocabulary: [`Discount`], the recursive rule
//! families [`BasketRule`] and [`CatalogRule`], [`BasketPromotionTarget`] and
//! [`PromotionPeriod`]. Wire payloads are decoded into private serde DTOs and
//! converted with `TryFrom`; any nested failure aborts the whole conversion.
//! Writes go through save commands, which serialize only the fields that were
//! set.

pub mod basket;
pub mod catalog;
pub mod command;
pub mod discount;
pub mod marketplace;
pub mod period;
pub mod rule;
pub mod target;
mod wire;

pub use basket::{denormalize_basket_promotion, BasketPromotion, SaveBasketPromotionCommand};
pub use catalog::{denormalize_catalog_promotion, CatalogPromotion, SaveCatalogPromotionCommand};
pub use command::Patch;
pub use discount::{denormalize_discount, normalize_discount, Discount};
pub use marketplace::{
    denormalize_marketplace_promotion, MarketplacePromotion, SaveMarketplacePromotionCommand,
};
pub use period::{denormalize_period, normalize_period, PromotionPeriod};
pub use rule::{
    denormalize_basket_rule, denormalize_catalog_rule, normalize_basket_rule,
    normalize_catalog_rule, BasketRule, BasketRuleType, CatalogRule, CatalogRuleType,
};
pub use target::{
    denormalize_target, normalize_target, pack_target, unpack_target, BasketPromotionTarget,
};
