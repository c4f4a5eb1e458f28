// RSS/Atom feed ingestion for batch triage.
// Produces NewsItem lists, newest first.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};
use unionwatch_common::news::sort_newest_first;
use unionwatch_common::NewsItem;

/// Descriptions are cut to this many characters before prompting.
const DESCRIPTION_MAX_CHARS: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
}

/// Labor-news feeds read by default.
pub const DEFAULT_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "InfoGremiales",
        url: "https://www.infogremiales.com.ar/feed/",
    },
    FeedSource {
        name: "Sonido Gremial",
        url: "https://sonidogremial.com.ar/feed/",
    },
    FeedSource {
        name: "Identidad Sindical",
        url: "https://www.identidadsindical.ar/rss/",
    },
];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));
static SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Drop HTML tags, decode the handful of entities feeds actually use, and
/// collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#8220;", "\u{201c}")
        .replace("&#8221;", "\u{201d}")
        .replace("&#8230;", "\u{2026}")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    SPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Plain-text description capped at [`DESCRIPTION_MAX_CHARS`], with an
/// ellipsis when cut.
pub fn summarize(html: &str) -> String {
    let text = strip_html(html);
    if text.chars().count() <= DESCRIPTION_MAX_CHARS {
        return text;
    }
    let cut: String = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Parse a raw RSS/Atom document into news items from `source_name`.
pub fn parse_feed(source_name: &str, bytes: &[u8]) -> Result<Vec<NewsItem>> {
    let feed = feed_rs::parser::parse(bytes).context("Failed to parse RSS/Atom feed")?;

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            Some(NewsItem {
                title: entry
                    .title
                    .map(|t| strip_html(&t.content))
                    .unwrap_or_default(),
                link,
                publish_date: entry.published.or(entry.updated),
                source: source_name.to_string(),
                description: summarize(&description),
            })
        })
        .collect();

    Ok(items)
}

pub struct FeedService {
    client: reqwest::Client,
}

impl FeedService {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<NewsItem>> {
        let resp = self
            .client
            .get(source.url)
            .header("User-Agent", "unionwatch/0.1")
            .send()
            .await
            .context("Feed fetch failed")?
            .error_for_status()
            .context("Feed returned an error status")?;

        let bytes = resp.bytes().await.context("Failed to read feed body")?;
        let items = parse_feed(source.name, &bytes)?;
        info!(source = source.name, items = items.len(), "feed: parsed successfully");
        Ok(items)
    }

    /// Fetch every source; a failing source contributes nothing.
    pub async fn fetch_all(&self, sources: &[FeedSource]) -> Vec<NewsItem> {
        let fetches = sources.iter().map(|source| async move {
            match self.fetch(source).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(source = source.name, error = %e, "Failed to fetch feed");
                    Vec::new()
                }
            }
        });

        let mut all: Vec<NewsItem> = futures::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect();
        sort_newest_first(&mut all);
        all
    }
}
