pub mod conversation;
pub mod domain;
pub mod extraction;
pub mod generation;
pub mod imaging;
pub mod localization;
pub mod ports;
pub mod prompts;

pub use conversation::{ConversationContext, Role, Turn};
pub use domain::{
    render_bullets, ArtisanRecord, CatalogEntry, NewProduct, ProductDescriptions, ProductId, ProductRecord,
    ProfileUpdate, SocialPlan, SocialPost,
};
pub use generation::{ContentGenerator, GenerationError};
pub use imaging::{ImageGateway, ImageGenError};
pub use localization::Localizer;
pub use ports::{
    ImageGenerationService, PortError, PortResult, RecordStore, StoreError, StoreResult, TextGenerationService,
    TranslationService,
};
