//! Reviewable output of a batch run.
//!
//! Nothing here is committed. Accepting a suggestion produces a [`Proposal`]
//! through the same resolve-and-merge path as single-link analysis;
//! rejecting one just drops it.

use serde::Serialize;
use unionwatch_common::{ExtractionResult, UnionRecord};
use uuid::Uuid;

use crate::merge::{propose, Proposal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SuggestionId(Uuid);

impl SuggestionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SuggestionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: SuggestionId,
    pub result: ExtractionResult,
    /// Title of the news item the suggestion came from.
    pub item_title: String,
}

/// Ordered like the input items. Duplicates are left for the operator.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ExtractionResult, item_title: impl Into<String>) -> SuggestionId {
        let id = SuggestionId::new();
        self.items.push(Suggestion {
            id,
            result,
            item_title: item_title.into(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.items.iter()
    }

    pub fn get(&self, id: SuggestionId) -> Option<&Suggestion> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Remove the suggestion and merge it into (a copy of) its union.
    pub fn accept(&mut self, id: SuggestionId, known: &[UnionRecord]) -> Option<Proposal> {
        let suggestion = self.take(id)?;
        Some(propose(suggestion.result, known))
    }

    pub fn reject(&mut self, id: SuggestionId) -> Option<Suggestion> {
        self.take(id)
    }

    fn take(&mut self, id: SuggestionId) -> Option<Suggestion> {
        let index = self.items.iter().position(|s| s.id == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unionwatch_common::{
        ActionRecord, EntryKey, ExtractionPayload, UnionIdentity,
    };

    fn result(id: &str, title: &str) -> ExtractionResult {
        ExtractionResult {
            union: UnionIdentity {
                name: id.to_uppercase(),
                id: id.to_string(),
            },
            payload: ExtractionPayload::Action(ActionRecord {
                title: title.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn accept_removes_and_merges() {
        let mut list = SuggestionList::new();
        let first = list.push(result("ate", "paro"), "cable 1");
        let second = list.push(result("uom", "asamblea"), "cable 2");

        let mut existing = UnionRecord::stub(&UnionIdentity {
            name: "ATE".to_string(),
            id: "ate".to_string(),
        });
        existing
            .actions
            .insert(EntryKey::from("old"), ActionRecord::default());
        let known = vec![existing];

        let proposal = list.accept(first, &known).unwrap();
        assert_eq!(proposal.record.actions.len(), 2);
        assert_eq!(list.len(), 1);
        assert!(list.get(first).is_none());
        assert!(list.get(second).is_some());
        assert_eq!(known[0].actions.len(), 1);
    }

    #[test]
    fn reject_only_removes() {
        let mut list = SuggestionList::new();
        let id = list.push(result("ate", "paro"), "cable");
        let rejected = list.reject(id).unwrap();
        assert_eq!(rejected.item_title, "cable");
        assert!(list.is_empty());
        assert!(list.reject(id).is_none());
    }

    #[test]
    fn accepting_twice_yields_nothing() {
        let mut list = SuggestionList::new();
        let id = list.push(result("ate", "paro"), "cable");
        assert!(list.accept(id, &[]).is_some());
        assert!(list.accept(id, &[]).is_none());
    }

    #[test]
    fn duplicates_are_kept() {
        let mut list = SuggestionList::new();
        list.push(result("ate", "paro"), "cable 1");
        list.push(result("ate", "paro"), "cable 2");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn id_round_trips_through_text() {
        let mut list = SuggestionList::new();
        let id = list.push(result("ate", "paro"), "cable");
        let parsed: SuggestionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
