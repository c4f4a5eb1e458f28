//! Entry points that talk to the text-generation service.
//!
//! Each call is independent and holds no shared state. Recovery and
//! validation are pure; the generation request is the only await point, and
//! its failure leaves nothing half-built.

use ai_client::{Gemini, GenerationRequest, TextGenerator};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use unionwatch_common::{Config, ExtractionResult, NewsItem, PipelineError, UnionRecord};

use crate::merge::{propose, rekey_entries, Proposal};
use crate::prompts;
use crate::recover::recover;
use crate::triage::{self, finalize_item_results, TriageOptions, TriageReport};
use crate::validate::{validate_batch, validate_extraction, validate_union_record};

pub struct Analyst {
    generator: Box<dyn TextGenerator>,
    options: TriageOptions,
    reference_date: Option<NaiveDate>,
}

impl Analyst {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            options: TriageOptions::default(),
            reference_date: None,
        }
    }

    /// Gemini-backed analyst. The credential comes from `config` only.
    pub fn from_config(config: &Config) -> Self {
        let gemini = Gemini::new(config.gemini_api_key.clone(), config.gemini_model.as_str());
        Self::new(Box::new(gemini)).with_options(TriageOptions {
            limit: config.batch_limit,
            concurrency: config.batch_concurrency,
        })
    }

    pub fn with_options(mut self, options: TriageOptions) -> Self {
        self.options = options;
        self
    }

    /// Pin "today" instead of reading the clock.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    async fn ask(&self, request: GenerationRequest) -> Result<String, PipelineError> {
        self.generator.generate(request).await.map_err(|e| {
            warn!(error = %e, "Text generation failed");
            PipelineError::from(e)
        })
    }

    /// Full institutional record for a union, ready for review.
    pub async fn research(&self, union_name: &str) -> Result<UnionRecord, PipelineError> {
        let union_name = union_name.trim();
        if union_name.is_empty() {
            return Err(PipelineError::Validation("union name is empty".to_string()));
        }
        info!(union_name, "Researching union");

        let reply = self.ask(prompts::research(union_name, self.today())).await?;
        let mut record = validate_union_record(recover(&reply)?)?;
        rekey_entries(&mut record);

        info!(
            id = record.id.as_str(),
            members = record.governing_members.len(),
            agreements = record.agreements.len(),
            "Research complete"
        );
        Ok(record)
    }

    /// One extraction from one link. The payload's source is always `url`.
    pub async fn extract_from_link(&self, url: &str) -> Result<ExtractionResult, PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PipelineError::Validation("link is empty".to_string()));
        }
        info!(url, "Analyzing link");

        let reply = self.ask(prompts::link_analysis(url, self.today())).await?;
        let mut result = validate_extraction(&recover(&reply)?)?;
        result.payload.set_source_url(url);
        Ok(result)
    }

    /// Single-link analysis merged into (a copy of) the matching union.
    pub async fn analyze_link(
        &self,
        url: &str,
        known: &[UnionRecord],
    ) -> Result<Proposal, PipelineError> {
        let result = self.extract_from_link(url).await?;
        Ok(propose(result, known))
    }

    /// Extraction for one news item. Non-array replies yield no results.
    pub async fn extract_from_item(
        &self,
        item: &NewsItem,
        today: NaiveDate,
    ) -> Result<Vec<ExtractionResult>, PipelineError> {
        let reply = self.ask(prompts::news_item(item, today)).await?;
        let mut results = validate_batch(&recover(&reply)?);
        finalize_item_results(&mut results, item, today);
        Ok(results)
    }

    /// Run extraction over the first N items and collect reviewable
    /// suggestions. Nothing is merged or committed here.
    pub async fn triage(
        &self,
        items: &[NewsItem],
        today: NaiveDate,
    ) -> Result<TriageReport, PipelineError> {
        triage::run(items, self.options, |item| self.extract_from_item(item, today)).await
    }
}
