//! Client core for the marketplace promotion API.
//!
//! # Overview
//! Turns the API's loosely typed promotion payloads into typed values
//! (catalog, basket and marketplace promotions with their rule trees,
//! discounts, targets and periods) and turns save commands back into wire
//! JSON. HTTP is modelled as data: `PromotionClient` builds `HttpRequest`
//! values and parses `HttpResponse` values while the host performs the I/O.
//!
//! # Design
//! - Each variant family is a closed enum; de-normalizers match on it
//!   exhaustively and reject unknown wire tags.
//! - De-normalization is all-or-nothing: a nested failure aborts the
//!   aggregate and no partial promotion is ever returned.
//! - Save commands track unset/null/value per field so partial updates only
//!   send what the caller touched.
//! - Everything here is synchronous and side-effect free apart from
//!   `tracing` events emitted by the client.

pub mod client;
pub mod error;
pub mod http;
pub mod promotion;

pub use client::PromotionClient;
pub use error::{ApiError, PromotionError, RuleFamily};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use promotion::{
    BasketPromotion, BasketPromotionTarget, BasketRule, CatalogPromotion, CatalogRule, Discount,
    MarketplacePromotion, Patch, PromotionPeriod, SaveBasketPromotionCommand,
    SaveCatalogPromotionCommand, SaveMarketplacePromotionCommand,
};
