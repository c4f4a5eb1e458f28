use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One item from a labor-news feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub publish_date: Option<DateTime<Utc>>,
    /// Name of the feed the item came from.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: String,
}

impl NewsItem {
    pub fn publish_day(&self) -> Option<NaiveDate> {
        self.publish_date.map(|d| d.date_naive())
    }
}

/// Newest first; undated items sink to the end.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}
