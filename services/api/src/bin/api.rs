//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileStore, GeminiTextAdapter, GoogleTranslateAdapter, OpenAiImageAdapter, OpenAiTextAdapter},
    config::{Config, TextProvider},
    error::ApiError,
    web::{
        self,
        rest::ApiDoc,
        state::{AppState, SessionRegistry},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use kalakriti_core::{
    ContentGenerator, ImageGateway, ImageGenerationService, Localizer, TextGenerationService,
    TranslationService,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn openai_client(api_key: &str) -> Client<OpenAIConfig> {
    Client::with_config(OpenAIConfig::new().with_api_key(api_key))
}

/// Builds the configured text model, or `None` when it cannot be used.
fn text_model(config: &Config) -> Option<Arc<dyn TextGenerationService>> {
    match config.text_provider {
        TextProvider::Gemini => {
            let Some(api_key) = config.google_api_key.clone() else {
                error!("GOOGLE_API_KEY is not set. AI text generation is disabled.");
                return None;
            };
            match GeminiTextAdapter::new(api_key, config.gemini_model.clone(), config.request_timeout) {
                Ok(adapter) => Some(Arc::new(adapter)),
                Err(e) => {
                    error!("Failed to initialize the Gemini model: {}", e);
                    None
                }
            }
        }
        TextProvider::OpenAi => {
            let Some(api_key) = config.openai_api_key.as_deref() else {
                error!("OPENAI_API_KEY is not set. AI text generation is disabled.");
                return None;
            };
            Some(Arc::new(OpenAiTextAdapter::new(
                openai_client(api_key),
                config.openai_text_model.clone(),
            )))
        }
    }
}

fn translator(config: &Config) -> Option<Arc<dyn TranslationService>> {
    let Some(api_key) = config.translate_api_key.clone() else {
        warn!("No translation key configured. Text will be shown in English only.");
        return None;
    };
    match GoogleTranslateAdapter::new(api_key, config.request_timeout) {
        Ok(adapter) => Some(Arc::new(adapter)),
        Err(e) => {
            error!("Failed to initialize the translation client: {}", e);
            None
        }
    }
}

fn image_model(config: &Config) -> Option<Arc<dyn ImageGenerationService>> {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        warn!("OPENAI_API_KEY is not set. Image generation is disabled.");
        return None;
    };
    Some(Arc::new(OpenAiImageAdapter::new(
        openai_client(api_key),
        config.image_model.clone(),
    )))
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Record Store ---
    info!("Opening record store at {}", config.database_path.display());
    let store = Arc::new(FileStore::open(config.database_path.clone()).await?);

    // --- 3. Initialize Service Gateways ---
    let generator = ContentGenerator::new(text_model(&config), config.request_timeout);
    let localizer = Localizer::new(
        translator(&config),
        config.request_timeout,
        config.translation_cache_capacity,
    );
    let images = ImageGateway::new(image_model(&config), config.request_timeout);
    info!(
        text = generator.is_configured(),
        translation = localizer.is_configured(),
        images = images.is_configured(),
        "Gateways initialized"
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
        generator,
        localizer,
        images,
        sessions: Arc::new(SessionRegistry::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:8501"))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
