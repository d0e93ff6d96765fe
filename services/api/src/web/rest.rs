//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the profile, product and marketplace endpoints
//! and the master definition for the OpenAPI specification.

use crate::web::{
    ai, auth,
    middleware::{session_id_from_headers, AuthenticatedArtisan},
    state::AppState,
    store_error,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use futures::future::join_all;
use kalakriti_core::{
    localization::{is_supported_language, SOURCE_LANGUAGE, SUPPORTED_LANGUAGES},
    ArtisanRecord, CatalogEntry, NewProduct, ProductId, ProductRecord, ProfileUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        get_profile_handler,
        update_profile_handler,
        list_products_handler,
        add_product_handler,
        catalog_handler,
        translate_handler,
        languages_handler,
        set_language_handler,
        ai::descriptions_handler,
        ai::social_plan_handler,
        ai::image_handler,
        ai::select_product_handler,
        ai::chat_handler,
        ai::history_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest, auth::LoginRequest, auth::AuthResponse,
            ProfileResponse, ProfileRequest, ProductResponse, AddProductRequest, AddProductResponse,
            CatalogItem, TranslateResponse, LanguageOption, LanguageRequest,
            ai::DescriptionsRequest, ai::DescriptionsResponse, ai::SocialPlanRequest,
            ai::SocialPlanResponse, ai::SocialPostResponse, ai::ImageRequest, ai::ImageResponse,
            ai::SelectProductRequest, ai::ChatRequest, ai::ChatResponse, ai::TurnResponse,
            ai::HistoryResponse, ai::GenerationErrorResponse,
        )
    ),
    tags(
        (name = "KalaKriti Marketplace API", description = "Artisan accounts, product listings and AI writing tools.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub username: String,
    pub name: String,
    pub craft: String,
    pub art_description: String,
    pub product_count: usize,
}

impl From<ArtisanRecord> for ProfileResponse {
    fn from(artisan: ArtisanRecord) -> Self {
        Self {
            product_count: artisan.products.len(),
            username: artisan.username,
            name: artisan.display_name,
            craft: artisan.craft_type,
            art_description: artisan.story_text,
        }
    }
}

/// Fields left out are kept as they are.
#[derive(Deserialize, ToSchema, Default)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub craft: Option<String>,
    pub art_description: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub materials: String,
    pub craft_type: String,
    pub description_story: String,
    pub description_bullets: String,
    pub description_social: String,
}

impl ProductResponse {
    fn new(product_id: ProductId, product: ProductRecord) -> Self {
        Self {
            product_id,
            name: product.name,
            price: product.price,
            materials: product.materials,
            craft_type: product.craft_type,
            description_story: product.description_story,
            description_bullets: product.description_bullets,
            description_social: product.description_social,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AddProductRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub description_story: String,
    #[serde(default)]
    pub description_bullets: String,
    #[serde(default)]
    pub description_social: String,
}

#[derive(Serialize, ToSchema)]
pub struct AddProductResponse {
    pub product_id: String,
}

/// One marketplace listing, with its text in the requested language.
#[derive(Serialize, ToSchema)]
pub struct CatalogItem {
    pub product_id: String,
    pub artisan_username: String,
    pub artisan_name: String,
    pub artisan_story: String,
    pub name: String,
    pub price: f64,
    pub craft_type: String,
    pub description_story: String,
    pub description_bullets: String,
}

#[derive(Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Case-insensitive match on product name or craft.
    pub q: Option<String>,
    /// Target language code. Defaults to the session's language, then English.
    pub lang: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TranslateQuery {
    pub text: String,
    pub lang: String,
}

#[derive(Serialize, ToSchema)]
pub struct TranslateResponse {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct LanguageOption {
    pub name: String,
    pub code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LanguageRequest {
    pub language: String,
}

fn check_language(code: &str) -> Result<(), (StatusCode, String)> {
    if is_supported_language(code) {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, format!("Unsupported language '{}'", code)))
    }
}

//=========================================================================================
// Profile and Product Handlers
//=========================================================================================

/// Get the logged-in artisan's profile.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let record = state.store.get_artisan(&artisan.username).await.map_err(store_error)?;
    Ok(Json(record.into()))
}

/// Merge the supplied fields into the artisan's profile.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = ProfileResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let update = ProfileUpdate {
        display_name: req.name,
        craft_type: req.craft,
        story_text: req.art_description,
    };
    let record = state
        .store
        .update_profile(&artisan.username, update)
        .await
        .map_err(store_error)?;
    Ok(Json(record.into()))
}

/// List the artisan's own products.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "The artisan's products", body = [ProductResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
) -> Result<Json<Vec<ProductResponse>>, (StatusCode, String)> {
    let products = state
        .store
        .list_products(&artisan.username)
        .await
        .map_err(store_error)?;
    Ok(Json(
        products
            .into_iter()
            .map(|(id, product)| ProductResponse::new(id, product))
            .collect(),
    ))
}

/// Add a product to the artisan's store.
#[utoipa::path(
    post,
    path = "/products",
    request_body = AddProductRequest,
    responses(
        (status = 201, description = "Product added", body = AddProductResponse),
        (status = 400, description = "Missing name or invalid price"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn add_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<AddProductRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let product = NewProduct {
        name: req.name,
        price: req.price,
        materials: req.materials,
        description_story: req.description_story,
        description_bullets: req.description_bullets,
        description_social: req.description_social,
    };
    let product_id = state
        .store
        .add_product(&artisan.username, product)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(AddProductResponse { product_id })))
}

//=========================================================================================
// Marketplace and Localization Handlers
//=========================================================================================

/// Browse every artisan's products, optionally filtered and translated.
#[utoipa::path(
    get,
    path = "/catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Marketplace listing", body = [CatalogItem]),
        (status = 400, description = "Unsupported language")
    )
)]
pub async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogItem>>, (StatusCode, String)> {
    let lang = match query.lang {
        Some(lang) => lang,
        None => session_language(&state, &headers).await,
    };
    check_language(&lang)?;

    let entries = state.store.catalog(query.q.as_deref()).await;
    let items = join_all(entries.into_iter().map(|entry| localize_entry(&state, entry, &lang))).await;
    Ok(Json(items))
}

/// The language chosen in the caller's session, if they are logged in.
async fn session_language(state: &AppState, headers: &HeaderMap) -> String {
    match session_id_from_headers(headers) {
        Some(session_id) => state
            .sessions
            .get(&session_id)
            .await
            .map(|ctx| ctx.language)
            .unwrap_or_else(|| SOURCE_LANGUAGE.to_string()),
        None => SOURCE_LANGUAGE.to_string(),
    }
}

async fn localize_entry(state: &AppState, entry: CatalogEntry, lang: &str) -> CatalogItem {
    let localizer = &state.localizer;
    let product = entry.product;
    CatalogItem {
        artisan_name: localizer.translate(&entry.artisan_name, lang).await,
        artisan_story: localizer.translate(&entry.artisan_story, lang).await,
        name: localizer.translate(&product.name, lang).await,
        description_story: localizer.translate(&product.description_story, lang).await,
        description_bullets: localizer.translate(&product.description_bullets, lang).await,
        product_id: entry.product_id,
        artisan_username: entry.artisan_username,
        price: product.price,
        craft_type: product.craft_type,
    }
}

/// Translate a single UI string. Falls back to the original text on any failure.
#[utoipa::path(
    get,
    path = "/translate",
    params(TranslateQuery),
    responses(
        (status = 200, description = "Translated (or original) text", body = TranslateResponse),
        (status = 400, description = "Unsupported language")
    )
)]
pub async fn translate_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranslateQuery>,
) -> Result<Json<TranslateResponse>, (StatusCode, String)> {
    check_language(&query.lang)?;
    let text = state.localizer.translate(&query.text, &query.lang).await;
    Ok(Json(TranslateResponse { text }))
}

/// The languages visitors can choose from.
#[utoipa::path(
    get,
    path = "/languages",
    responses((status = 200, description = "Supported languages", body = [LanguageOption]))
)]
pub async fn languages_handler() -> Json<Vec<LanguageOption>> {
    Json(
        SUPPORTED_LANGUAGES
            .iter()
            .map(|(name, code)| LanguageOption {
                name: name.to_string(),
                code: code.to_string(),
            })
            .collect(),
    )
}

/// Remember the artisan's preferred language for this session.
#[utoipa::path(
    put,
    path = "/session/language",
    request_body = LanguageRequest,
    responses(
        (status = 204, description = "Language saved"),
        (status = 400, description = "Unsupported language"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn set_language_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<LanguageRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    check_language(&req.language)?;
    state
        .sessions
        .update(&artisan.session_id, |ctx| ctx.language = req.language)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "Session expired".to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
