//! Verify de-normalization and build/parse methods against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector names a wire payload and either the expected normalized form
//! or the expected error variant. Comparing parsed JSON (not raw strings)
//! avoids false negatives from field-ordering differences.

use marketplace_core::promotion::{
    denormalize_basket_rule, denormalize_catalog_rule, denormalize_discount, denormalize_period,
    denormalize_target, normalize_basket_rule, normalize_catalog_rule, normalize_discount,
    normalize_period, normalize_target,
};
use marketplace_core::{
    ApiError, HttpMethod, HttpResponse, PromotionClient, PromotionError,
    SaveBasketPromotionCommand, SaveCatalogPromotionCommand, SaveMarketplacePromotionCommand,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> PromotionClient {
    PromotionClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn promotion_error_name(err: &PromotionError) -> &'static str {
    match err {
        PromotionError::UnexpectedDiscountType(_) => "UnexpectedDiscountType",
        PromotionError::UnexpectedRuleType { .. } => "UnexpectedRuleType",
        PromotionError::UnexpectedTargetType(_) => "UnexpectedTargetType",
        PromotionError::EmptyTargetProductIds => "EmptyTargetProductIds",
        PromotionError::InvalidTargetProductId(_) => "InvalidTargetProductId",
        PromotionError::InvalidPeriod => "InvalidPeriod",
        PromotionError::InvalidDate { .. } => "InvalidDate",
        PromotionError::MissingField { .. } => "MissingField",
        PromotionError::InvalidField { .. } => "InvalidField",
        PromotionError::InvalidDiscount(_) => "InvalidDiscount",
    }
}

fn api_error_name(err: &ApiError) -> &'static str {
    match err {
        ApiError::NotFound => "NotFound",
        ApiError::Unauthorized => "Unauthorized",
        ApiError::Http { .. } => "Http",
        ApiError::PromotionIdMismatch { .. } => "PromotionIdMismatch",
        ApiError::Serialization(_) => "Serialization",
        ApiError::Deserialization(_) => "Deserialization",
        ApiError::Promotion(_) => "Promotion",
    }
}

/// Runs one `{ wire, normalized?, error? }` case through a decode/encode pair.
fn check_case<T>(
    case: &Value,
    denormalize: impl Fn(&Value) -> Result<T, PromotionError>,
    normalize: impl Fn(&T) -> Value,
) {
    let name = case["name"].as_str().unwrap();
    let wire = &case["wire"];

    match case.get("error").and_then(Value::as_str) {
        Some(expected) => {
            let err = match denormalize(wire) {
                Ok(_) => panic!("{name}: expected {expected}, got a value"),
                Err(err) => err,
            };
            assert_eq!(promotion_error_name(&err), expected, "{name}: error variant");
        }
        None => {
            let value = denormalize(wire).unwrap_or_else(|e| panic!("{name}: {e}"));
            let expected = case.get("normalized").unwrap_or(wire);
            assert_eq!(&normalize(&value), expected, "{name}: normalized");
        }
    }
}

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn response(status: u64, body: String) -> HttpResponse {
    HttpResponse {
        status: status as u16,
        headers: Vec::new(),
        body,
    }
}

fn expected_headers(expected_req: &Value) -> Vec<(String, String)> {
    expected_req["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[test]
fn rule_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/rules.json"));

    for case in vectors["cases"].as_array().unwrap() {
        match case["family"].as_str().unwrap() {
            "basket" => check_case(case, denormalize_basket_rule, normalize_basket_rule),
            "catalog" => check_case(case, denormalize_catalog_rule, normalize_catalog_rule),
            other => panic!("unknown rule family: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Discounts, targets, periods
// ---------------------------------------------------------------------------

#[test]
fn discount_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/fragments.json"));
    for case in vectors["discounts"].as_array().unwrap() {
        check_case(case, denormalize_discount, normalize_discount);
    }
}

#[test]
fn target_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/fragments.json"));
    for case in vectors["targets"].as_array().unwrap() {
        check_case(case, denormalize_target, normalize_target);
    }
}

#[test]
fn period_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/fragments.json"));
    for case in vectors["periods"].as_array().unwrap() {
        check_case(case, denormalize_period, normalize_period);
    }
}

// ---------------------------------------------------------------------------
// Promotions: parse a response, then build the full update for it
// ---------------------------------------------------------------------------

#[test]
fn promotion_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/promotions.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let sim = response(sim["status"].as_u64().unwrap(), sim["body"].to_string());

        let req = match case["collection"].as_str().unwrap() {
            "catalog" => {
                let promotion = c.parse_get_catalog_promotion(sim).unwrap();
                let command = SaveCatalogPromotionCommand::from_promotion(&promotion);
                c.build_update_catalog_promotion(promotion.promotion_id(), &command)
            }
            "basket" => {
                let promotion = c.parse_get_basket_promotion(sim).unwrap();
                let command = SaveBasketPromotionCommand::from_promotion(&promotion);
                c.build_update_basket_promotion(promotion.promotion_id(), &command)
            }
            "marketplace" => {
                let promotion = c.parse_get_marketplace_promotion(sim).unwrap();
                let command = SaveMarketplacePromotionCommand::from_promotion(&promotion);
                c.build_update_marketplace_promotion(promotion.promotion_id(), &command)
            }
            other => panic!("unknown collection: {other}"),
        }
        .unwrap_or_else(|e| panic!("{name}: {e}"));

        let expected_req = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");
        assert_eq!(req.headers, expected_headers(expected_req), "{name}: headers");

        let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");
    }
}

#[test]
fn error_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/promotions.json"));

    let c = client();
    for case in vectors["errors"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = response(
            case["status"].as_u64().unwrap(),
            case["body"].as_str().unwrap().to_string(),
        );

        let err = match case["collection"].as_str().unwrap() {
            "catalog" => c.parse_get_catalog_promotion(sim).map(drop),
            "basket" => c.parse_get_basket_promotion(sim).map(drop),
            "marketplace" => c.parse_get_marketplace_promotion(sim).map(drop),
            other => panic!("unknown collection: {other}"),
        }
        .unwrap_err();

        assert_eq!(api_error_name(&err), case["error"].as_str().unwrap(), "{name}: error variant");
    }
}
