//! Stateless HTTP request builder and response parser for the promotion API.
//!
//! # Design
//! `PromotionClient` holds only its configuration (`base_url`, optional API
//! key) and carries no mutable state between calls. Each operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. The host executes the actual HTTP
//! round trip. Parsing decodes the body into wire DTOs and then
//! de-normalizes them; a body that decodes but describes an invalid
//! promotion surfaces as `ApiError::Promotion`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, PromotionError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::promotion::basket::BasketPromotionWire;
use crate::promotion::catalog::CatalogPromotionWire;
use crate::promotion::marketplace::MarketplacePromotionWire;
use crate::promotion::{
    BasketPromotion, CatalogPromotion, MarketplacePromotion, SaveBasketPromotionCommand,
    SaveCatalogPromotionCommand, SaveMarketplacePromotionCommand,
};

/// The three promotion collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Catalog,
    Basket,
    Marketplace,
}

impl Collection {
    fn segment(self) -> &'static str {
        match self {
            Collection::Catalog => "catalog",
            Collection::Basket => "basket",
            Collection::Marketplace => "marketplace",
        }
    }

    fn update_method(self) -> HttpMethod {
        match self {
            Collection::Catalog | Collection::Basket => HttpMethod::Put,
            Collection::Marketplace => HttpMethod::Patch,
        }
    }
}

/// Synchronous, stateless client for the promotion API.
#[derive(Debug, Clone)]
pub struct PromotionClient {
    base_url: String,
    api_key: Option<String>,
}

impl PromotionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attaches `authorization: Bearer <key>` to every built request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    // -----------------------------------------------------------------------
    // Catalog promotions
    // -----------------------------------------------------------------------

    pub fn build_list_catalog_promotions(&self) -> HttpRequest {
        self.build_list(Collection::Catalog)
    }

    pub fn build_get_catalog_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_get(Collection::Catalog, id)
    }

    pub fn build_create_catalog_promotion(
        &self,
        command: &SaveCatalogPromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        self.build_create(Collection::Catalog, command)
    }

    pub fn build_update_catalog_promotion(
        &self,
        id: Uuid,
        command: &SaveCatalogPromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        check_command_id(id, command.promotion_id())?;
        self.build_update(Collection::Catalog, id, command)
    }

    pub fn build_delete_catalog_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_delete(Collection::Catalog, id)
    }

    pub fn parse_list_catalog_promotions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CatalogPromotion>, ApiError> {
        parse_many::<CatalogPromotionWire, _>(response, 200)
    }

    pub fn parse_get_catalog_promotion(&self, response: HttpResponse) -> Result<CatalogPromotion, ApiError> {
        parse_one::<CatalogPromotionWire, _>(response, 200)
    }

    pub fn parse_create_catalog_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<CatalogPromotion, ApiError> {
        parse_one::<CatalogPromotionWire, _>(response, 201)
    }

    pub fn parse_update_catalog_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<CatalogPromotion, ApiError> {
        parse_one::<CatalogPromotionWire, _>(response, 200)
    }

    pub fn parse_delete_catalog_promotion(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    // -----------------------------------------------------------------------
    // Basket promotions
    // -----------------------------------------------------------------------

    pub fn build_list_basket_promotions(&self) -> HttpRequest {
        self.build_list(Collection::Basket)
    }

    pub fn build_get_basket_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_get(Collection::Basket, id)
    }

    pub fn build_create_basket_promotion(
        &self,
        command: &SaveBasketPromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        self.build_create(Collection::Basket, command)
    }

    pub fn build_update_basket_promotion(
        &self,
        id: Uuid,
        command: &SaveBasketPromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        check_command_id(id, command.promotion_id())?;
        self.build_update(Collection::Basket, id, command)
    }

    pub fn build_delete_basket_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_delete(Collection::Basket, id)
    }

    pub fn parse_list_basket_promotions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<BasketPromotion>, ApiError> {
        parse_many::<BasketPromotionWire, _>(response, 200)
    }

    pub fn parse_get_basket_promotion(&self, response: HttpResponse) -> Result<BasketPromotion, ApiError> {
        parse_one::<BasketPromotionWire, _>(response, 200)
    }

    pub fn parse_create_basket_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<BasketPromotion, ApiError> {
        parse_one::<BasketPromotionWire, _>(response, 201)
    }

    pub fn parse_update_basket_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<BasketPromotion, ApiError> {
        parse_one::<BasketPromotionWire, _>(response, 200)
    }

    pub fn parse_delete_basket_promotion(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    // -----------------------------------------------------------------------
    // Marketplace promotions
    // -----------------------------------------------------------------------

    pub fn build_list_marketplace_promotions(&self) -> HttpRequest {
        self.build_list(Collection::Marketplace)
    }

    pub fn build_get_marketplace_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_get(Collection::Marketplace, id)
    }

    pub fn build_create_marketplace_promotion(
        &self,
        command: &SaveMarketplacePromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        self.build_create(Collection::Marketplace, command)
    }

    pub fn build_update_marketplace_promotion(
        &self,
        id: Uuid,
        command: &SaveMarketplacePromotionCommand,
    ) -> Result<HttpRequest, ApiError> {
        command.validate()?;
        check_command_id(id, command.promotion_id())?;
        self.build_update(Collection::Marketplace, id, command)
    }

    pub fn build_delete_marketplace_promotion(&self, id: Uuid) -> HttpRequest {
        self.build_delete(Collection::Marketplace, id)
    }

    pub fn parse_list_marketplace_promotions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<MarketplacePromotion>, ApiError> {
        parse_many::<MarketplacePromotionWire, _>(response, 200)
    }

    pub fn parse_get_marketplace_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<MarketplacePromotion, ApiError> {
        parse_one::<MarketplacePromotionWire, _>(response, 200)
    }

    pub fn parse_create_marketplace_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<MarketplacePromotion, ApiError> {
        parse_one::<MarketplacePromotionWire, _>(response, 201)
    }

    pub fn parse_update_marketplace_promotion(
        &self,
        response: HttpResponse,
    ) -> Result<MarketplacePromotion, ApiError> {
        parse_one::<MarketplacePromotionWire, _>(response, 200)
    }

    pub fn parse_delete_marketplace_promotion(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    // -----------------------------------------------------------------------
    // Shared builders
    // -----------------------------------------------------------------------

    fn collection_path(&self, collection: Collection) -> String {
        format!("{}/promotions/{}", self.base_url, collection.segment())
    }

    fn item_path(&self, collection: Collection, id: Uuid) -> String {
        format!("{}/{id}", self.collection_path(collection))
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(api_key) = &self.api_key {
            headers.push(("authorization".to_string(), format!("Bearer {api_key}")));
        }

        debug!(method = method.as_str(), %path, has_body = body.is_some(), "built promotion request");

        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }

    fn build_list(&self, collection: Collection) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_path(collection), None)
    }

    fn build_get(&self, collection: Collection, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Get, self.item_path(collection, id), None)
    }

    fn build_create<C: Serialize>(&self, collection: Collection, command: &C) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(command).map_err(ApiError::Serialization)?;
        Ok(self.request(HttpMethod::Post, self.collection_path(collection), Some(body)))
    }

    fn build_update<C: Serialize>(
        &self,
        collection: Collection,
        id: Uuid,
        command: &C,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(command).map_err(ApiError::Serialization)?;
        Ok(self.request(collection.update_method(), self.item_path(collection, id), Some(body)))
    }

    fn build_delete(&self, collection: Collection, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, self.item_path(collection, id), None)
    }
}

/// An update command built with `update(id)` must address the same promotion
/// as the request path. Commands built with `new()` carry no id and pass.
fn check_command_id(path: Uuid, command: Option<Uuid>) -> Result<(), ApiError> {
    match command {
        Some(command) if command != path => Err(ApiError::PromotionIdMismatch { path, command }),
        _ => Ok(()),
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }

    warn!(status = response.status, expected, "unexpected promotion API status");

    match response.status {
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}

fn parse_one<W, T>(response: HttpResponse, expected: u16) -> Result<T, ApiError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = PromotionError>,
{
    check_status(&response, expected)?;
    let wire: W = serde_json::from_str(&response.body).map_err(ApiError::Deserialization)?;
    let promotion = T::try_from(wire)?;
    debug!(status = response.status, "parsed promotion");
    Ok(promotion)
}

fn parse_many<W, T>(response: HttpResponse, expected: u16) -> Result<Vec<T>, ApiError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = PromotionError>,
{
    check_status(&response, expected)?;
    let wires: Vec<W> = serde_json::from_str(&response.body).map_err(ApiError::Deserialization)?;
    let promotions = wires
        .into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(status = response.status, count = promotions.len(), "parsed promotion list");
    Ok(promotions)
}
