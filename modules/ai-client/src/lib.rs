pub mod error;
pub mod gemini;
pub mod schema;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use gemini::Gemini;
pub use schema::PromptSchema;
pub use traits::{GenerationRequest, TextGenerator};
pub use util::truncate_to_char_boundary;
