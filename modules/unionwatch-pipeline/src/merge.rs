//! Additive merge of an extraction into a union record.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;
use unionwatch_common::{
    EntryKey, ExtractionKind, ExtractionPayload, ExtractionResult, UnionRecord,
};

use crate::identity::{resolve, ResolutionStatus};

/// A proposed next state for one union, awaiting operator review.
/// Nothing is persisted until it is approved.
#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    pub record: UnionRecord,
    pub status: ResolutionStatus,
    pub message: String,
    pub kind: ExtractionKind,
    /// Key the new entry was inserted under.
    pub key: EntryKey,
}

/// Insert `payload` under a fresh key. Existing entries are never touched.
pub fn merge(mut record: UnionRecord, payload: ExtractionPayload) -> (UnionRecord, EntryKey) {
    let kind = payload.kind();
    let key = match payload {
        ExtractionPayload::Action(action) => insert_fresh(&mut record.actions, action),
        ExtractionPayload::Agreement(agreement) => insert_fresh(&mut record.agreements, agreement),
    };
    info!(id = record.id.as_str(), %kind, key = key.as_str(), "Merged extraction into union");
    (record, key)
}

/// Resolve the extraction's union against `known` and merge into the copy.
pub fn propose(result: ExtractionResult, known: &[UnionRecord]) -> Proposal {
    let kind = result.kind();
    let resolution = resolve(&result.union, known);
    let (record, key) = merge(resolution.record, result.payload);
    Proposal {
        record,
        status: resolution.status,
        message: resolution.message,
        kind,
        key,
    }
}

/// Replace every entry key with one from the central generator. Used on
/// research output, where the model invents its own keys.
pub fn rekey_entries(record: &mut UnionRecord) {
    record.actions = rekey(std::mem::take(&mut record.actions));
    record.agreements = rekey(std::mem::take(&mut record.agreements));
}

fn rekey<T>(entries: BTreeMap<EntryKey, T>) -> BTreeMap<EntryKey, T> {
    let mut out = BTreeMap::new();
    for value in entries.into_values() {
        insert_fresh(&mut out, value);
    }
    out
}

fn insert_fresh<T>(entries: &mut BTreeMap<EntryKey, T>, value: T) -> EntryKey {
    loop {
        let key = EntryKey::generate();
        if let Entry::Vacant(slot) = entries.entry(key.clone()) {
            slot.insert(value);
            return key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unionwatch_common::{ActionKind, ActionRecord, AgreementRecord, UnionIdentity};

    fn ate() -> UnionRecord {
        UnionRecord::stub(&UnionIdentity {
            name: "ATE".to_string(),
            id: "ate".to_string(),
        })
    }

    fn action(title: &str) -> ActionRecord {
        ActionRecord {
            title: title.to_string(),
            kind: ActionKind::Rally,
            date: "2026-11-05".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_adds_exactly_one_action() {
        let mut record = ate();
        for i in 0..3 {
            record
                .actions
                .insert(EntryKey::from(format!("old-{i}")), action(&format!("old {i}")));
        }
        let before = record.clone();

        let (merged, key) = merge(record, ExtractionPayload::Action(action("new")));

        assert_eq!(merged.actions.len(), before.actions.len() + 1);
        for (k, v) in &before.actions {
            assert_eq!(merged.actions.get(k), Some(v));
        }
        assert_eq!(merged.actions[&key].title, "new");
        assert_eq!(merged.agreements, before.agreements);
    }

    #[test]
    fn merge_agreement_leaves_actions_alone() {
        let mut record = ate();
        record.actions.insert(EntryKey::from("a"), action("kept"));
        let (merged, key) = merge(
            record,
            ExtractionPayload::Agreement(AgreementRecord {
                increase_percent: "12%".to_string(),
                ..Default::default()
            }),
        );
        assert_eq!(merged.actions.len(), 1);
        assert_eq!(merged.agreements[&key].increase_percent, "12%");
    }

    #[test]
    fn propose_does_not_mutate_known() {
        let mut existing = ate();
        existing.actions.insert(EntryKey::from("a"), action("kept"));
        let known = vec![existing];
        let snapshot = known.clone();

        let proposal = propose(
            ExtractionResult {
                union: UnionIdentity {
                    name: "ATE".to_string(),
                    id: "ate".to_string(),
                },
                payload: ExtractionPayload::Action(action("new")),
            },
            &known,
        );

        assert_eq!(known, snapshot);
        assert_eq!(proposal.status, ResolutionStatus::Matched);
        assert_eq!(proposal.record.actions.len(), 2);
        assert_eq!(proposal.kind, ExtractionKind::Action);
    }

    #[test]
    fn propose_into_new_stub_holds_only_the_new_entry() {
        let proposal = propose(
            ExtractionResult {
                union: UnionIdentity {
                    name: "La Fraternidad".to_string(),
                    id: "la-fraternidad".to_string(),
                },
                payload: ExtractionPayload::Action(action("paro de trenes")),
            },
            &[],
        );
        assert_eq!(proposal.status, ResolutionStatus::Created);
        assert_eq!(proposal.record.actions.len(), 1);
        assert!(proposal.record.agreements.is_empty());
    }

    #[test]
    fn rekey_replaces_model_keys_and_keeps_values() {
        let mut record = ate();
        record
            .agreements
            .insert(EntryKey::from("UUID_GENERADO_1"), AgreementRecord::default());
        record.actions.insert(EntryKey::from("x"), action("one"));
        record.actions.insert(EntryKey::from("y"), action("two"));

        rekey_entries(&mut record);

        assert_eq!(record.agreements.len(), 1);
        assert_eq!(record.actions.len(), 2);
        assert!(!record.agreements.contains_key(&EntryKey::from("UUID_GENERADO_1")));
        assert!(record
            .actions
            .keys()
            .all(|k| uuid::Uuid::parse_str(k.as_str()).is_ok()));
    }
}
