//! services/api/src/web/ai.rs
//!
//! Handlers for the AI writing tools (product descriptions, post planner,
//! image generation) and the customer assistant chat.
//!
//! Provider failures are never raised as faults: they come back as a JSON
//! `{ "error": ... }` body the caller can show to the artisan.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use kalakriti_core::{render_bullets, ArtisanRecord, GenerationError, ImageGenError, Role, Turn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::{middleware::AuthenticatedArtisan, state::AppState, store_error};

type HandlerResult<T> = Result<Json<T>, Response>;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct GenerationErrorResponse {
    pub error: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DescriptionsRequest {
    pub product_name: String,
    pub materials: String,
}

#[derive(Serialize, ToSchema)]
pub struct DescriptionsResponse {
    pub story_driven: String,
    pub bullet_points: Vec<String>,
    /// The bullet points as stored on a product: `- item` lines.
    pub bullets_text: String,
    pub social_media_caption: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SocialPlanRequest {
    pub product_name: String,
    pub campaign_goal: String,
}

#[derive(Serialize, ToSchema)]
pub struct SocialPostResponse {
    pub day_title: String,
    pub suggested_image: String,
    pub caption: String,
}

#[derive(Serialize, ToSchema)]
pub struct SocialPlanResponse {
    pub plan_title: String,
    pub posts: Vec<SocialPostResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Serialize, ToSchema)]
pub struct ImageResponse {
    pub url: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectProductRequest {
    pub product_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Switches the conversation to this product first. Defaults to the selected one.
    pub product_id: Option<String>,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct TurnResponse {
    pub role: String,
    pub content: String,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub turns: Vec<TurnResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub product_id: Option<String>,
    pub turns: Vec<TurnResponse>,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

fn session_expired() -> Response {
    (StatusCode::UNAUTHORIZED, "Session expired".to_string()).into_response()
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(GenerationErrorResponse { error: message })).into_response()
}

fn generation_failure(e: GenerationError) -> Response {
    let status = match e {
        GenerationError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        GenerationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_body(status, e.to_string())
}

fn image_failure(e: ImageGenError) -> Response {
    let status = match e {
        ImageGenError::ProviderUnconfigured => StatusCode::SERVICE_UNAVAILABLE,
        ImageGenError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ImageGenError::ProviderError(_) => StatusCode::BAD_GATEWAY,
    };
    error_body(status, e.to_string())
}

/// The AI tools need the artisan's name and story to write anything meaningful.
async fn completed_profile(state: &AppState, username: &str) -> Result<ArtisanRecord, Response> {
    let artisan = state
        .store
        .get_artisan(username)
        .await
        .map_err(|e| store_error(e).into_response())?;
    if !artisan.profile_complete() {
        return Err((
            StatusCode::PRECONDITION_FAILED,
            "Please complete your Artisan Profile first! The AI needs your story.".to_string(),
        )
            .into_response());
    }
    Ok(artisan)
}

//=========================================================================================
// Writing Tools
//=========================================================================================

/// Generate story-driven, bulleted and social descriptions for a product.
#[utoipa::path(
    post,
    path = "/ai/descriptions",
    request_body = DescriptionsRequest,
    responses(
        (status = 200, description = "Generated descriptions", body = DescriptionsResponse),
        (status = 400, description = "Product name or materials missing"),
        (status = 412, description = "Profile incomplete"),
        (status = 502, description = "Provider failed or replied with unusable output", body = GenerationErrorResponse),
        (status = 503, description = "Text model not configured", body = GenerationErrorResponse),
        (status = 504, description = "Provider timed out", body = GenerationErrorResponse)
    )
)]
pub async fn descriptions_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<DescriptionsRequest>,
) -> HandlerResult<DescriptionsResponse> {
    if req.product_name.trim().is_empty() || req.materials.trim().is_empty() {
        return Err(bad_request("Please provide a Product Name and Materials."));
    }
    let profile = completed_profile(&state, &artisan.username).await?;

    let descriptions = state
        .generator
        .generate_product_descriptions(&profile.story_text, &req.product_name, &req.materials)
        .await
        .map_err(generation_failure)?;

    Ok(Json(DescriptionsResponse {
        bullets_text: render_bullets(&descriptions.bullet_points),
        story_driven: descriptions.story_driven,
        bullet_points: descriptions.bullet_points,
        social_media_caption: descriptions.social_caption,
    }))
}

/// Generate a three-day social media plan for a product.
#[utoipa::path(
    post,
    path = "/ai/social-plan",
    request_body = SocialPlanRequest,
    responses(
        (status = 200, description = "Generated plan", body = SocialPlanResponse),
        (status = 400, description = "Product name or goal missing"),
        (status = 412, description = "Profile incomplete"),
        (status = 502, description = "Provider failed or replied with unusable output", body = GenerationErrorResponse),
        (status = 503, description = "Text model not configured", body = GenerationErrorResponse),
        (status = 504, description = "Provider timed out", body = GenerationErrorResponse)
    )
)]
pub async fn social_plan_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<SocialPlanRequest>,
) -> HandlerResult<SocialPlanResponse> {
    if req.product_name.trim().is_empty() || req.campaign_goal.trim().is_empty() {
        return Err(bad_request("Please provide a product name and a campaign goal."));
    }
    let profile = completed_profile(&state, &artisan.username).await?;

    let plan = state
        .generator
        .generate_social_plan(&profile.story_text, &req.product_name, &req.campaign_goal)
        .await
        .map_err(generation_failure)?;

    Ok(Json(SocialPlanResponse {
        plan_title: plan.plan_title,
        posts: plan
            .posts
            .into_iter()
            .map(|post| SocialPostResponse {
                day_title: post.day_title,
                suggested_image: post.suggested_image,
                caption: post.caption,
            })
            .collect(),
    }))
}

/// Generate an image from a text prompt.
#[utoipa::path(
    post,
    path = "/ai/image",
    request_body = ImageRequest,
    responses(
        (status = 200, description = "Image URL", body = ImageResponse),
        (status = 400, description = "Prompt missing"),
        (status = 502, description = "Provider failed", body = GenerationErrorResponse),
        (status = 503, description = "Image provider not configured", body = GenerationErrorResponse),
        (status = 504, description = "Provider timed out", body = GenerationErrorResponse)
    )
)]
pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<ImageRequest>,
) -> HandlerResult<ImageResponse> {
    if req.prompt.trim().is_empty() {
        return Err(bad_request("Please describe the image you want."));
    }
    info!(username = %artisan.username, "Image requested");
    let url = state
        .images
        .generate_image(&req.prompt)
        .await
        .map_err(image_failure)?;
    Ok(Json(ImageResponse { url }))
}

//=========================================================================================
// Customer Assistant
//=========================================================================================

/// Pick the product the assistant talks about. A different product clears the chat.
#[utoipa::path(
    post,
    path = "/assistant/select",
    request_body = SelectProductRequest,
    responses(
        (status = 200, description = "Current transcript", body = HistoryResponse),
        (status = 404, description = "Not one of the artisan's products")
    )
)]
pub async fn select_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<SelectProductRequest>,
) -> HandlerResult<HistoryResponse> {
    let record = state
        .store
        .get_artisan(&artisan.username)
        .await
        .map_err(|e| store_error(e).into_response())?;
    if !record.products.contains_key(&req.product_id) {
        return Err((StatusCode::NOT_FOUND, "Unknown product".to_string()).into_response());
    }

    let history = state
        .sessions
        .update(&artisan.session_id, |ctx| {
            ctx.conversation.select_product(&req.product_id);
            HistoryResponse {
                product_id: ctx.conversation.product_id().map(str::to_string),
                turns: ctx.conversation.turns().iter().map(TurnResponse::from).collect(),
            }
        })
        .await
        .ok_or_else(session_expired)?;
    Ok(Json(history))
}

/// Ask the assistant a question about the selected product.
#[utoipa::path(
    post,
    path = "/assistant/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply and transcript", body = ChatResponse),
        (status = 400, description = "Empty message or no product selected"),
        (status = 404, description = "Not one of the artisan's products"),
        (status = 502, description = "Provider failed", body = GenerationErrorResponse),
        (status = 503, description = "Text model not configured", body = GenerationErrorResponse),
        (status = 504, description = "Provider timed out", body = GenerationErrorResponse)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
    Json(req): Json<ChatRequest>,
) -> HandlerResult<ChatResponse> {
    if req.message.trim().is_empty() {
        return Err(bad_request("Please type a question."));
    }

    let session = state
        .sessions
        .get(&artisan.session_id)
        .await
        .ok_or_else(session_expired)?;
    let product_id = req
        .product_id
        .or_else(|| session.conversation.product_id().map(str::to_string))
        .ok_or_else(|| bad_request("Select one of your products first."))?;

    let record = state
        .store
        .get_artisan(&artisan.username)
        .await
        .map_err(|e| store_error(e).into_response())?;
    let product = record
        .products
        .get(&product_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Unknown product".to_string()).into_response())?;

    // 1. Record the question and snapshot the transcript
    let (transcript, selection) = state
        .sessions
        .update(&artisan.session_id, |ctx| {
            ctx.conversation.select_product(&product_id);
            ctx.conversation.append_turn(Role::User, req.message.clone());
            (ctx.conversation.turns().to_vec(), ctx.conversation.selection())
        })
        .await
        .ok_or_else(session_expired)?;

    // 2. Ask the model with the whole transcript as context
    let reply = state
        .generator
        .answer_customer_query(&record.story_text, product, &transcript)
        .await
        .map_err(generation_failure)?;

    // 3. Record the answer, unless the transcript was reset meanwhile
    let turns = state
        .sessions
        .update(&artisan.session_id, |ctx| {
            if ctx.conversation.selection() == selection {
                ctx.conversation.append_turn(Role::Assistant, reply.clone());
            }
            ctx.conversation.turns().iter().map(TurnResponse::from).collect()
        })
        .await
        .ok_or_else(session_expired)?;

    Ok(Json(ChatResponse { reply, turns }))
}

/// The current assistant transcript.
#[utoipa::path(
    get,
    path = "/assistant/history",
    responses((status = 200, description = "Current transcript", body = HistoryResponse))
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(artisan): Extension<AuthenticatedArtisan>,
) -> HandlerResult<HistoryResponse> {
    let session = state
        .sessions
        .get(&artisan.session_id)
        .await
        .ok_or_else(session_expired)?;
    Ok(Json(HistoryResponse {
        product_id: session.conversation.product_id().map(str::to_string),
        turns: session.conversation.turns().iter().map(TurnResponse::from).collect(),
    }))
}
