use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::key::EntryKey;
use crate::lenient;

/// Headquarters placeholder for records nobody has researched yet.
pub const PLACEHOLDER_ADDRESS: &str = "To be completed";

// --- Union ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GoverningMember {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Position held on the governing committee (e.g. "Secretary General").
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub headquarters_address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website_url: String,
}

impl Default for BasicInfo {
    fn default() -> Self {
        Self {
            headquarters_address: PLACEHOLDER_ADDRESS.to_string(),
            website_url: String::new(),
        }
    }
}

/// One union, keyed by `id` in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnionRecord {
    /// Official display name.
    pub name: String,
    /// Canonical lowercase slug, usually the union's acronym (e.g. "uom").
    pub id: String,
    /// Editorial order; duplicates are left alone.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub governing_members: Vec<GoverningMember>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub basic_info: BasicInfo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub actions: BTreeMap<EntryKey, ActionRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub agreements: BTreeMap<EntryKey, AgreementRecord>,
}

impl UnionRecord {
    /// Minimal skeleton for a union first seen in an extraction.
    pub fn stub(identity: &UnionIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            id: identity.id.clone(),
            governing_members: Vec::new(),
            basic_info: BasicInfo::default(),
            actions: BTreeMap::new(),
            agreements: BTreeMap::new(),
        }
    }

    /// Actions whose date is today or later, soonest first.
    pub fn upcoming_actions(&self, today: NaiveDate) -> Vec<(&EntryKey, &ActionRecord)> {
        let mut upcoming: Vec<_> = self
            .actions
            .iter()
            .filter(|(_, a)| a.status_on(today) == ActionStatus::Upcoming)
            .collect();
        upcoming.sort_by(|a, b| a.1.date.cmp(&b.1.date));
        upcoming
    }
}

/// The `{name, id}` pair a model uses to say which union a text is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnionIdentity {
    pub name: String,
    /// Lowercase slug for the union (e.g. "ctera").
    pub id: String,
}

// --- Actions ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Strike,
    Assembly,
    Rally,
    Meeting,
    Complaint,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Strike => write!(f, "strike"),
            ActionKind::Assembly => write!(f, "assembly"),
            ActionKind::Rally => write!(f, "rally"),
            ActionKind::Meeting => write!(f, "meeting"),
            ActionKind::Complaint => write!(f, "complaint"),
            ActionKind::Other => write!(f, "other"),
        }
    }
}

impl ActionKind {
    /// Case-insensitive; anything unrecognised is `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strike" => ActionKind::Strike,
            "assembly" => ActionKind::Assembly,
            "rally" => ActionKind::Rally,
            "meeting" => ActionKind::Meeting,
            "complaint" => ActionKind::Complaint,
            _ => ActionKind::Other,
        }
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<ActionKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient::string(deserializer).map(|s| ActionKind::parse(&s))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Upcoming,
    Past,
}

/// A labor action: strike, assembly, rally, meeting, complaint or other.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_kind")]
    pub kind: ActionKind,
    /// Date the action takes (or took) place, YYYY-MM-DD. Never the
    /// publication date of an announcement.
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub place: String,
    /// Link to the article the action was taken from.
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

impl ActionRecord {
    /// Status is never stored; it is recomputed against `today` on every read.
    pub fn status_on(&self, today: NaiveDate) -> ActionStatus {
        let upcoming = match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
            Ok(date) => date >= today,
            Err(_) => self.date.trim() >= today.format("%Y-%m-%d").to_string().as_str(),
        };
        if upcoming {
            ActionStatus::Upcoming
        } else {
            ActionStatus::Past
        }
    }
}

// --- Agreements ---

/// A wage settlement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRecord {
    /// Period covered, e.g. "2024-2025".
    #[serde(default, deserialize_with = "lenient::string")]
    pub period: String,
    /// Raise as written in the source, e.g. "15% in three tranches".
    #[serde(default, deserialize_with = "lenient::string")]
    pub increase_percent: String,
    /// YYYY-MM-DD.
    #[serde(default, deserialize_with = "lenient::string")]
    pub signing_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub detail_text: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_url: String,
}

// --- Extraction results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionKind {
    Action,
    Agreement,
}

impl ExtractionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action" => Some(ExtractionKind::Action),
            "agreement" => Some(ExtractionKind::Agreement),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionKind::Action => write!(f, "action"),
            ExtractionKind::Agreement => write!(f, "agreement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ExtractionPayload {
    Action(ActionRecord),
    Agreement(AgreementRecord),
}

impl ExtractionPayload {
    pub fn kind(&self) -> ExtractionKind {
        match self {
            ExtractionPayload::Action(_) => ExtractionKind::Action,
            ExtractionPayload::Agreement(_) => ExtractionKind::Agreement,
        }
    }

    pub fn set_source_url(&mut self, url: &str) {
        match self {
            ExtractionPayload::Action(a) => a.source_url = url.to_string(),
            ExtractionPayload::Agreement(a) => a.source_url = url.to_string(),
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            ExtractionPayload::Action(a) => &a.source_url,
            ExtractionPayload::Agreement(a) => &a.source_url,
        }
    }
}

/// Validated output of analysing one text source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub union: UnionIdentity,
    pub payload: ExtractionPayload,
}

impl ExtractionResult {
    pub fn kind(&self) -> ExtractionKind {
        self.payload.kind()
    }
}
