//! Map an extracted `{name, id}` onto a known union, or mint a stub.

use serde::Serialize;
use tracing::info;
use unionwatch_common::{UnionIdentity, UnionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Matched,
    Created,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    /// A private copy; the caller's snapshot is never touched.
    pub record: UnionRecord,
    pub status: ResolutionStatus,
    /// Operator feedback only. Nothing branches on it.
    pub message: String,
}

/// Exact `id` equality only; no fuzzy matching.
pub fn resolve(identity: &UnionIdentity, known: &[UnionRecord]) -> Resolution {
    match known.iter().find(|u| u.id == identity.id) {
        Some(existing) => {
            let message = format!(
                "Matched existing union: {}. Extracted information is ready for review.",
                existing.name
            );
            info!(id = existing.id.as_str(), "Resolved extraction to existing union");
            Resolution {
                record: existing.clone(),
                status: ResolutionStatus::Matched,
                message,
            }
        }
        None => {
            let record = UnionRecord::stub(identity);
            let message = format!("New union detected: {}. Record created.", record.name);
            info!(id = record.id.as_str(), "Created stub for unknown union");
            Resolution {
                record,
                status: ResolutionStatus::Created,
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unionwatch_common::{ActionRecord, EntryKey, GoverningMember, PLACEHOLDER_ADDRESS};

    fn identity(name: &str, id: &str) -> UnionIdentity {
        UnionIdentity {
            name: name.to_string(),
            id: id.to_string(),
        }
    }

    fn known_uom() -> UnionRecord {
        let mut record = UnionRecord::stub(&identity("Unión Obrera Metalúrgica", "uom"));
        record.governing_members.push(GoverningMember {
            name: "Abel Furlán".to_string(),
            role: "Secretario General".to_string(),
        });
        record
            .actions
            .insert(EntryKey::from("k1"), ActionRecord::default());
        record
    }

    #[test]
    fn matching_id_returns_copy_of_existing() {
        let known = vec![known_uom()];
        let resolution = resolve(&identity("UOM", "uom"), &known);
        assert_eq!(resolution.status, ResolutionStatus::Matched);
        assert_eq!(resolution.record, known[0]);
        // Existing name wins over the extracted spelling.
        assert_eq!(resolution.record.name, "Unión Obrera Metalúrgica");
        assert!(resolution.message.starts_with("Matched existing union"));
    }

    #[test]
    fn unknown_id_creates_empty_stub() {
        let known = vec![known_uom()];
        let resolution = resolve(&identity("Sindicato de Camioneros", "camioneros"), &known);
        assert_eq!(resolution.status, ResolutionStatus::Created);
        assert_eq!(resolution.record.id, "camioneros");
        assert!(resolution.record.actions.is_empty());
        assert!(resolution.record.agreements.is_empty());
        assert!(resolution.record.governing_members.is_empty());
        assert_eq!(resolution.record.basic_info.headquarters_address, PLACEHOLDER_ADDRESS);
        assert!(resolution.message.starts_with("New union detected"));
    }

    #[test]
    fn lookup_is_exact() {
        let known = vec![known_uom()];
        let resolution = resolve(&identity("UOM", "UOM"), &known);
        assert_eq!(resolution.status, ResolutionStatus::Created);
    }

    #[test]
    fn mutating_resolution_leaves_known_untouched() {
        let known = vec![known_uom()];
        let before = known.clone();
        let mut resolution = resolve(&identity("UOM", "uom"), &known);
        resolution.record.actions.clear();
        resolution.record.name.push_str(" (edited)");
        assert_eq!(known, before);
    }
}
