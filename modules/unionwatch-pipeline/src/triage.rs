//! Batch triage over news items.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use unionwatch_common::config::DEFAULT_BATCH_LIMIT;
use unionwatch_common::{ExtractionPayload, ExtractionResult, NewsItem, PipelineError};

use crate::suggestions::SuggestionList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageOptions {
    /// Only the first `limit` items are considered per run.
    pub limit: usize,
    /// Requests in flight at once. 1 means strictly sequential.
    pub concurrency: usize,
}

impl Default for TriageOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_BATCH_LIMIT,
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageStats {
    pub items_considered: usize,
    pub items_failed: usize,
    pub suggestions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageReport {
    pub suggestions: SuggestionList,
    pub stats: TriageStats,
}

impl TriageReport {
    pub fn status_message(&self) -> String {
        let outcome = if self.suggestions.is_empty() {
            "Analysis finished, but no relevant union actions were detected in the recent cables."
                .to_string()
        } else {
            format!(
                "{} suggestion(s) from {} cable(s) ready for review.",
                self.stats.suggestions, self.stats.items_considered
            )
        };
        if self.stats.items_failed == 0 {
            return outcome;
        }
        format!(
            "{outcome} {} of {} cable(s) could not be analyzed.",
            self.stats.items_failed, self.stats.items_considered
        )
    }
}

/// Make one item's results safe to suggest: every payload points at the
/// item's link and no action is left undated.
pub(crate) fn finalize_item_results(
    results: &mut [ExtractionResult],
    item: &NewsItem,
    today: NaiveDate,
) {
    for result in results.iter_mut() {
        result.payload.set_source_url(&item.link);
        if let ExtractionPayload::Action(action) = &mut result.payload {
            if action.date.trim().is_empty() {
                action.date = today.format("%Y-%m-%d").to_string();
            }
        }
    }
}

/// Run `extract` over the first `options.limit` items and collect the
/// successes in input order. A failing item is logged and skipped; a
/// configuration error stops the whole run. If every item fails, the last
/// failure is returned instead of an empty report.
pub(crate) async fn run<'a, F, Fut>(
    items: &'a [NewsItem],
    options: TriageOptions,
    extract: F,
) -> Result<TriageReport, PipelineError>
where
    F: Fn(&'a NewsItem) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<ExtractionResult>, PipelineError>>,
{
    let considered = &items[..items.len().min(options.limit)];
    info!(
        items = items.len(),
        considered = considered.len(),
        concurrency = options.concurrency,
        "Starting batch triage"
    );

    let mut outcomes = stream::iter(considered.iter().map(|item| {
        let fut = extract(item);
        async move { (item, fut.await) }
    }))
    .buffered(options.concurrency.max(1));

    let mut suggestions = SuggestionList::new();
    let mut last_failure = None;
    let mut stats = TriageStats {
        items_considered: considered.len(),
        ..Default::default()
    };

    while let Some((item, outcome)) = outcomes.next().await {
        match outcome {
            Ok(results) => {
                for result in results {
                    suggestions.push(result, item.title.clone());
                }
            }
            Err(e) if e.is_fatal_for_batch() => {
                warn!(error = %e, "Aborting batch triage");
                return Err(e);
            }
            Err(e) => {
                stats.items_failed += 1;
                warn!(link = item.link.as_str(), error = %e, "Skipping news item");
                last_failure = Some(e);
            }
        }
    }

    if stats.items_failed == stats.items_considered {
        if let Some(e) = last_failure {
            warn!(failed = stats.items_failed, "Every news item failed");
            return Err(e);
        }
    }

    stats.suggestions = suggestions.len();
    info!(
        considered = stats.items_considered,
        failed = stats.items_failed,
        suggestions = stats.suggestions,
        "Batch triage complete"
    );

    Ok(TriageReport { suggestions, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use unionwatch_common::{ActionRecord, AgreementRecord, UnionIdentity};

    fn item(n: usize) -> NewsItem {
        NewsItem {
            title: format!("cable {n}"),
            link: format!("https://example.org/{n}"),
            publish_date: None,
            source: "Test".to_string(),
            description: String::new(),
        }
    }

    fn hit(id: &str) -> ExtractionResult {
        ExtractionResult {
            union: UnionIdentity {
                name: id.to_string(),
                id: id.to_string(),
            },
            payload: ExtractionPayload::Action(ActionRecord::default()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn limit_caps_items() {
        let items: Vec<NewsItem> = (0..30).map(item).collect();
        let options = TriageOptions { limit: 5, concurrency: 1 };
        let report = run(&items, options, |_| async { Ok(vec![hit("ate")]) })
            .await
            .unwrap();
        assert_eq!(report.stats.items_considered, 5);
        assert_eq!(report.suggestions.len(), 5);
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_kept() {
        let items: Vec<NewsItem> = (1..=3).map(item).collect();
        let report = run(&items, TriageOptions::default(), |item| {
            let title = item.title.clone();
            async move {
                match title.as_str() {
                    "cable 2" => Err(PipelineError::Recovery {
                        snippet: "garbage".to_string(),
                    }),
                    "cable 1" => Ok(vec![hit("first")]),
                    _ => Ok(vec![hit("third")]),
                }
            }
        })
        .await
        .unwrap();

        let ids: Vec<&str> = report.suggestions.iter().map(|s| s.result.union.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "third"]);
        assert_eq!(report.stats.items_failed, 1);
    }

    #[tokio::test]
    async fn concurrent_run_keeps_input_order() {
        let items: Vec<NewsItem> = (0..8).map(item).collect();
        let options = TriageOptions { limit: 20, concurrency: 4 };
        let report = run(&items, options, |item| {
            let n: u64 = item.link.rsplit('/').next().unwrap().parse().unwrap();
            let id = item.title.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(40 - n * 5)).await;
                Ok(vec![hit(&id)])
            }
        })
        .await
        .unwrap();
        let titles: Vec<&str> = report.suggestions.iter().map(|s| s.item_title.as_str()).collect();
        let expected: Vec<String> = (0..8).map(|n| format!("cable {n}")).collect();
        assert_eq!(titles, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn configuration_error_aborts() {
        let items: Vec<NewsItem> = (0..3).map(item).collect();
        let err = run(&items, TriageOptions::default(), |_| async {
            Err(PipelineError::Configuration("no key".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn finalize_forces_link_and_fills_date() {
        let mut results = vec![
            hit("ate"),
            ExtractionResult {
                union: UnionIdentity {
                    name: "UOM".to_string(),
                    id: "uom".to_string(),
                },
                payload: ExtractionPayload::Agreement(AgreementRecord {
                    source_url: "https://elsewhere.example".to_string(),
                    ..Default::default()
                }),
            },
        ];
        let item = item(7);
        finalize_item_results(&mut results, &item, today());

        assert!(results.iter().all(|r| r.payload.source_url() == "https://example.org/7"));
        match &results[0].payload {
            ExtractionPayload::Action(a) => assert_eq!(a.date, "2026-10-19"),
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn status_message_distinguishes_empty() {
        let empty = TriageReport {
            suggestions: SuggestionList::new(),
            stats: TriageStats::default(),
        };
        assert!(empty.status_message().contains("no relevant"));
        assert!(!empty.status_message().contains("could not be analyzed"));
    }

    #[test]
    fn status_message_reports_failed_items() {
        let report = TriageReport {
            suggestions: SuggestionList::new(),
            stats: TriageStats {
                items_considered: 5,
                items_failed: 2,
                suggestions: 0,
            },
        };
        assert!(report.status_message().contains("2 of 5 cable(s) could not be analyzed"));
    }

    #[tokio::test]
    async fn all_items_failing_returns_the_failure() {
        let items: Vec<NewsItem> = (0..3).map(item).collect();
        let err = run(&items, TriageOptions::default(), |_| async {
            Err(PipelineError::Transport("quota exceeded".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Transport(_)));
    }

    #[tokio::test]
    async fn empty_input_is_an_empty_report() {
        let report = run(&[], TriageOptions::default(), |_| async { Ok(vec![hit("ate")]) })
            .await
            .unwrap();
        assert_eq!(report.stats.items_considered, 0);
        assert!(report.suggestions.is_empty());
    }
}
