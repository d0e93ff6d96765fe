pub mod file_store;
pub mod gemini_llm;
pub mod image_gen;
pub mod openai_llm;
pub mod translate;

pub use file_store::FileStore;
pub use gemini_llm::GeminiTextAdapter;
pub use image_gen::OpenAiImageAdapter;
pub use openai_llm::OpenAiTextAdapter;
pub use translate::GoogleTranslateAdapter;
