use ai_client::{truncate_to_char_boundary, GenerationRequest, PromptSchema};
use chrono::NaiveDate;
use schemars::JsonSchema;
use unionwatch_common::{
    ActionRecord, AgreementRecord, ExtractionKind, NewsItem, UnionIdentity, UnionRecord,
};

/// Per-item description cap inside batch prompts.
const DESCRIPTION_MAX_BYTES: usize = 2_000;

/// Wire shape of one extraction, used only to render its schema.
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ExtractionWire {
    union: UnionIdentity,
    kind: ExtractionKind,
    data: PayloadWire,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
#[serde(untagged)]
enum PayloadWire {
    Action(ActionRecord),
    Agreement(AgreementRecord),
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =============================================================================
// Full research
// =============================================================================

pub fn research(union_name: &str, today: NaiveDate) -> GenerationRequest {
    let instructions = format!(
        r#"You are a labor-union intelligence analyst. Research one union and
structure its institutional data.

Return ONLY a valid JSON object. No markdown. Start directly with "{{".

WHAT TO FIND:
1. Official name and acronym. The acronym, lowercased and hyphenated, is the "id".
2. Governing committee: secretary general and key deputies, in order of rank.
3. Contact data: headquarters address and website.
4. The latest signed wage agreement currently in force.
5. Do NOT look for labor actions (strikes, rallies...). "actions" must be {{}}.

Today's date is {today}.

Keys of "agreements" may be any placeholder string; they are replaced.

JSON SCHEMA:
{schema}"#,
        today = iso(today),
        schema = UnionRecord::prompt_schema_string(),
    );

    let prompt = format!(
        r#"Research the union "{union_name}".
1. Get its current governing committee.
2. Find its headquarters address and website.
3. Find its latest signed wage agreement (percentages and date).
4. Do not generate labor actions; leave that object empty."#
    );

    GenerationRequest::new(prompt, instructions).with_web_search()
}

// =============================================================================
// Single-link analysis
// =============================================================================

pub fn link_analysis(url: &str, today: NaiveDate) -> GenerationRequest {
    let instructions = format!(
        r#"Analyze the content at the given link and extract structured union information.

INSTRUCTIONS:
1. Identify the union. Normalize its name and give a lowercase slug as "id".
2. Decide whether the article describes a LABOR ACTION ("action": strike,
   assembly, rally, meeting, complaint) or a WAGE AGREEMENT ("agreement").
3. "sourceUrl" MUST be exactly "{url}".
4. Today's date is {today}. A future event keeps its announced date.

Return ONLY one JSON object matching this schema:
{schema}"#,
        today = iso(today),
        schema = ExtractionWire::prompt_schema_string(),
    );

    GenerationRequest::new(format!("Analyze this link: {url}"), instructions).with_web_search()
}

// =============================================================================
// Batch triage
// =============================================================================

pub fn news_item(item: &NewsItem, today: NaiveDate) -> GenerationRequest {
    let instructions = format!(
        r#"You are a union-intelligence engine. You read news cables and detect concrete labor events.
Today's date: {today}.

CRITICAL RULES:
1. FILTER: ignore opinion pieces, general politics and irrelevant internal news.
   Only report strikes, rallies, assemblies, wage agreements or serious complaints.
   If the cable has nothing relevant, return [].

2. ANNOUNCEMENT vs EXECUTION:
   - "Union X announces a strike for December 9" -> report the FUTURE action,
     dated on the announced day, not on the publication date.
   - A march that ALREADY happened is reported with its actual past date.

3. DATES: resolve relative dates ("next Thursday") from the cable's date, or
   from today ({today}) when the cable has none. NEVER leave a date empty.

4. "sourceUrl" is the cable's link.

Return ONLY a JSON array whose elements match this schema:
{schema}"#,
        today = iso(today),
        schema = ExtractionWire::prompt_schema_string(),
    );

    let date = item
        .publish_day()
        .map(iso)
        .unwrap_or_else(|| "unknown".to_string());
    let description = truncate_to_char_boundary(&item.description, DESCRIPTION_MAX_BYTES);
    let prompt = format!(
        "Analyze this cable and extract union actions:\n\nDate: {date} | Title: {} | Desc: {} | Link: {}",
        item.title, description, item.link
    );

    GenerationRequest::new(prompt, instructions)
}
