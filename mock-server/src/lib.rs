//! In-memory stand-in for the marketplace promotion API.
//!
//! Stores raw promotion payloads per collection and applies the server-side
//! half of the partial-update contract: keys absent from an update are kept,
//! `discounts: null` keeps the stored discounts, any other `null` overwrites.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub mod config;

/// Promotion collections served under `/promotions/{collection}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Catalog,
    Basket,
    Marketplace,
}

pub type Promotion = Map<String, Value>;

pub type Db = Arc<RwLock<HashMap<Collection, Vec<Promotion>>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    api_key: Option<String>,
}

pub fn app() -> Router {
    app_with_api_key(None)
}

/// Router that rejects requests without `authorization: Bearer <api_key>`
/// when `api_key` is set.
pub fn app_with_api_key(api_key: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        api_key,
    };
    Router::new()
        .route(
            "/promotions/{collection}",
            get(list_promotions).post(create_promotion),
        )
        .route(
            "/promotions/{collection}/{id}",
            get(get_promotion)
                .put(update_promotion)
                .patch(update_promotion)
                .delete(delete_promotion),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_api_key(api_key)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let Some(expected) = &state.api_key else {
        return Ok(());
    };
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        warn!("rejected request with missing or wrong api key");
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn id_of(promotion: &Promotion) -> Option<&str> {
    promotion.get("promotion_id").and_then(Value::as_str)
}

/// Whether the promotion is active and `now` falls inside its period.
fn is_valid(promotion: &Promotion, now: DateTime<Utc>) -> bool {
    let active = promotion.get("active").and_then(Value::as_bool).unwrap_or(false);
    let bound = |key: &str| {
        promotion
            .get("period")
            .and_then(|period| period.get(key))
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|instant| instant.with_timezone(&Utc))
    };
    match (bound("from"), bound("to")) {
        (Some(from), Some(to)) => active && from <= now && now <= to,
        _ => false,
    }
}

/// Fill in what the real server derives itself.
fn apply_server_fields(collection: Collection, promotion: &mut Promotion) {
    match collection {
        Collection::Catalog | Collection::Basket => {
            promotion.entry("company_id").or_insert_with(|| Value::from(1));
        }
        Collection::Marketplace => {
            promotion.remove("company_id");
            let valid = is_valid(promotion, Utc::now());
            promotion.insert("isValid".to_string(), Value::Bool(valid));
        }
    }
}

async fn list_promotions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(collection): Path<Collection>,
) -> Result<Json<Vec<Promotion>>, StatusCode> {
    authorize(&state, &headers)?;
    let db = state.db.read().await;
    Ok(Json(db.get(&collection).cloned().unwrap_or_default()))
}

async fn create_promotion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(collection): Path<Collection>,
    Json(mut input): Json<Promotion>,
) -> Result<(StatusCode, Json<Promotion>), StatusCode> {
    authorize(&state, &headers)?;
    if !input.get("name").is_some_and(Value::is_string) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let id = Uuid::new_v4();
    input.insert("promotion_id".to_string(), Value::String(id.to_string()));
    if input.get("discounts").map_or(true, Value::is_null) {
        input.insert("discounts".to_string(), Value::Array(Vec::new()));
    }
    if collection != Collection::Catalog {
        input
            .entry("target")
            .or_insert_with(|| serde_json::json!({"type": "basket"}));
    }
    if collection == Collection::Marketplace {
        input.entry("rule").or_insert(Value::Null);
    }
    apply_server_fields(collection, &mut input);

    info!(?collection, %id, "created promotion");
    state
        .db
        .write()
        .await
        .entry(collection)
        .or_default()
        .push(input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_promotion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(Collection, Uuid)>,
) -> Result<Json<Promotion>, StatusCode> {
    authorize(&state, &headers)?;
    let id = id.to_string();
    let db = state.db.read().await;
    db.get(&collection)
        .and_then(|promotions| promotions.iter().find(|p| id_of(p) == Some(id.as_str())))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_promotion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(Collection, Uuid)>,
    Json(input): Json<Promotion>,
) -> Result<Json<Promotion>, StatusCode> {
    authorize(&state, &headers)?;
    let id = id.to_string();
    let mut db = state.db.write().await;
    let promotion = db
        .get_mut(&collection)
        .and_then(|promotions| promotions.iter_mut().find(|p| id_of(p) == Some(id.as_str())))
        .ok_or(StatusCode::NOT_FOUND)?;

    for (key, value) in input {
        if key == "promotion_id" || (key == "discounts" && value.is_null()) {
            continue;
        }
        promotion.insert(key, value);
    }
    apply_server_fields(collection, promotion);

    info!(?collection, %id, "updated promotion");
    Ok(Json(promotion.clone()))
}

async fn delete_promotion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(Collection, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let id = id.to_string();
    let mut db = state.db.write().await;
    let promotions = db.get_mut(&collection).ok_or(StatusCode::NOT_FOUND)?;
    let position = promotions
        .iter()
        .position(|p| id_of(p) == Some(id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;
    promotions.remove(position);

    info!(?collection, %id, "deleted promotion");
    Ok(StatusCode::NO_CONTENT)
}
