//! Error types for the promotion SDK.
//!
//! # Design
//! `PromotionError` covers everything that can go wrong while turning a wire
//! payload into typed promotions (or validating a save command). Every
//! failure aborts the whole de-normalization call; nothing is recovered
//! locally. `ApiError` wraps it together with the transport-level outcomes
//! the client can observe in an `HttpResponse`.

use thiserror::Error;
use uuid::Uuid;

/// Which rule vocabulary a tag was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    Basket,
    Catalog,
}

impl std::fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleFamily::Basket => f.write_str("basket"),
            RuleFamily::Catalog => f.write_str("catalog"),
        }
    }
}

/// De-normalization and validation failures.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// Discount `type` is missing or not one of `percentage`, `fixed`.
    #[error("unexpected discount type: {0:?}")]
    UnexpectedDiscountType(Option<String>),

    /// Rule `type` is not part of the closed tag set of its family.
    #[error("unexpected {family} rule type: {found:?}")]
    UnexpectedRuleType { family: RuleFamily, found: String },

    /// Target discriminant is not one of `basket`, `product_in_basket`, `shipping`.
    #[error("unexpected target type: {0:?}")]
    UnexpectedTargetType(String),

    /// A `product_in_basket` target carries no product ids.
    #[error("product target has no product ids")]
    EmptyTargetProductIds,

    /// A `product_in_basket` target carries an id that is not an integer.
    #[error("invalid product id in target: {0:?}")]
    InvalidTargetProductId(String),

    /// The period starts after it ends.
    #[error("promotion cannot start after it ends")]
    InvalidPeriod,

    /// A period bound is not an RFC 3339 date-time.
    #[error("invalid date in field `{field}`")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    /// A field required by the payload variant is absent.
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    /// A field is present but holds a value of the wrong shape.
    #[error("invalid value for field `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },

    /// A discount amount is out of its allowed range.
    #[error("invalid discount: {0}")]
    InvalidDiscount(String),
}

/// Errors returned by `PromotionClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401; the caller must authenticate.
    #[error("authentication required")]
    Unauthorized,

    /// The server returned a non-success status other than 401 and 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// An update command carries a `promotion_id` other than the one in the path.
    #[error("command targets promotion {command} but the request path targets {path}")]
    PromotionIdMismatch { path: Uuid, command: Uuid },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body is not the JSON shape the endpoint promises.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The payload decoded but does not describe a valid promotion.
    #[error(transparent)]
    Promotion(#[from] PromotionError),
}
