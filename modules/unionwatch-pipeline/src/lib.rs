pub mod analyst;
pub mod editor;
pub mod feed;
pub mod identity;
pub mod merge;
pub mod prompts;
pub mod recover;
pub mod store;
pub mod suggestions;
pub mod triage;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyst::Analyst;
pub use editor::EditorSession;
pub use identity::{resolve, Resolution, ResolutionStatus};
pub use merge::{merge, propose, Proposal};
pub use recover::recover;
pub use store::{JsonFileStore, RecordStore};
pub use suggestions::{Suggestion, SuggestionId, SuggestionList};
pub use triage::{TriageOptions, TriageReport, TriageStats};
