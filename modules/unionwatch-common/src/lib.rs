pub mod config;
pub mod error;
pub mod key;
pub mod lenient;
pub mod news;
pub mod types;

pub use config::Config;
pub use error::{PipelineError, StoreError};
pub use key::EntryKey;
pub use news::NewsItem;
pub use types::*;
