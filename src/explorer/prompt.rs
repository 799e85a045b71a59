// src/explorer/prompt.rs
// Pure prompt construction. These functions turn (schema, history, findings,
// summaries) into the four prompt texts the engine needs; the engine is
// responsible for logging timestamped copies into the artifacts.

use serde_json::Value;

use super::types::{Finding, QueryRecord, SummaryRecord};
use crate::db::QueryResult;
use crate::schema::SchemaView;

/// Field names scanned (case-insensitively, as substrings) in a batch's
/// first result rows to collect factual anchors for summarization.
const ANCHOR_KEYWORDS: [&str; 4] = ["count", "total", "unique", "percentage"];

const REASONING_PLACEHOLDER: &str = "No reasoning provided";

pub fn reasoning_placeholder() -> String {
    REASONING_PLACEHOLDER.to_string()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render rows as an aligned-enough text table, in declared column order.
fn render_table(result: &QueryResult, limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&result.columns.join(" | "));
    out.push('\n');
    for row in result.rows.iter().take(limit) {
        let cells: Vec<String> = result
            .columns
            .iter()
            .map(|col| row.get(col).map(render_value).unwrap_or_default())
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    out
}

/// Best-effort column type from the first non-null value in the sample.
fn infer_column_types(result: &QueryResult) -> String {
    let mut out = String::new();
    for col in &result.columns {
        let inferred = result
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .find(|v| !v.is_null())
            .map(|v| match v {
                Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
                Value::Number(_) => "float",
                Value::Bool(_) => "boolean",
                Value::String(_) => "text",
                _ => "other",
            })
            .unwrap_or("null");
        out.push_str(&format!("{}: {}\n", col, inferred));
    }
    out
}

fn render_findings(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|f| format!("- {}", f.finding))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Next-query prompt with hierarchical context selection: once at least one
/// summary exists, the last two summaries plus the last five findings stand
/// in for the older history; before that (cold start) the first ten findings
/// are shown. The last three raw history records are always appended
/// verbatim for recency.
pub fn build_exploration(
    schema: &SchemaView,
    history: &[QueryRecord],
    findings: &[Finding],
    summaries: &[SummaryRecord],
    max_queries: usize,
) -> String {
    let mut prompt = format!(
        "You are an expert data analyst exploring a database to understand its \
         structure, content, and blind spots.\n\n\
         You have run {} queries so far, and can run up to {} total queries.\n\n\
         DATABASE SCHEMA:\n{}\n\
         EXPLORATION HISTORY:",
        history.len(),
        max_queries,
        schema.render(),
    );

    if history.is_empty() {
        prompt.push_str("\nThis is the first query.\n");
    } else {
        if !summaries.is_empty() {
            prompt.push_str("\n\n=== PREVIOUS INSIGHTS (SUMMARIZED) ===\n");
            let start = summaries.len().saturating_sub(2);
            for (i, summary) in summaries[start..].iter().enumerate() {
                prompt.push_str(&format!(
                    "Batch {}: {}\n",
                    start + i + 1,
                    summary.summary_content
                ));
            }
            prompt.push_str("\n=== CURRENT BATCH FINDINGS ===\n");
            let tail = findings.len().saturating_sub(5);
            prompt.push_str(&render_findings(&findings[tail..]));
            prompt.push('\n');
        } else {
            prompt.push_str("\n=== CURRENT FINDINGS ===\n");
            let head = findings.len().min(10);
            prompt.push_str(&render_findings(&findings[..head]));
            prompt.push('\n');
        }

        let start = history.len().saturating_sub(3);
        for entry in &history[start..] {
            prompt.push_str(&format!(
                "\n=== Query {} ===\nSQL: {}\nResult Summary: {}\nAnalysis: {}\n",
                entry.query_num, entry.sql, entry.result_summary, entry.analysis
            ));
        }
    }

    prompt.push_str(
        "\nBased on the schema and previous exploration, generate:\n\
         1. The next SQL query to run (must be valid SQL for the target engine)\n\
         2. Brief explanation of what you're trying to learn\n\n\
         Focus on:\n\
         - Understanding data distribution and patterns\n\
         - Finding relationships between tables\n\
         - Identifying data quality issues\n\
         - Discovering business insights\n\n\
         Return ONLY:\n\
         SQL: [your query]\n\
         REASONING: [why you chose this query]\n\n\
         Keep SQL concise and efficient.",
    );
    prompt
}

/// Result-analysis prompt: small results are embedded whole, larger ones as
/// a 5-row head plus inferred per-column types.
pub fn build_analysis(result: &QueryResult, sql: &str) -> String {
    let (summary, sample_info) = if result.is_empty() {
        (
            "Query returned no results".to_string(),
            "No data to analyze".to_string(),
        )
    } else if result.row_count() <= 10 {
        (
            result.summary(),
            format!("All data:\n{}", render_table(result, result.row_count())),
        )
    } else {
        (
            result.summary(),
            format!(
                "Sample (first 5 rows):\n{}\nColumn types:\n{}",
                render_table(result, 5),
                infer_column_types(result)
            ),
        )
    };

    format!(
        "Analyze these SQL results for insights:\n\n\
         SQL Query: {}\n{}\n\n{}\n\n\
         Provide analysis in this format:\n\
         1. What we learned: Key insights from this query\n\
         2. Implications: What these results tell us about the data\n\
         3. Next directions: What to explore next\n\n\
         Keep it concise.",
        sql, summary, sample_info
    )
}

/// Scan a record's first result row for metric-looking fields. The resulting
/// `name=value` pairs anchor the summary's numbers against paraphrase drift.
fn factual_anchors(batch: &[QueryRecord]) -> Vec<String> {
    let mut anchors = Vec::new();
    for record in batch {
        let Some(first_row) = record.results_data.first() else {
            continue;
        };
        let pairs: Vec<String> = first_row
            .iter()
            .filter(|(key, _)| {
                let lower = key.to_lowercase();
                ANCHOR_KEYWORDS.iter().any(|kw| lower.contains(kw))
            })
            .map(|(key, value)| format!("{}={}", key, render_value(value)))
            .collect();
        if !pairs.is_empty() {
            anchors.push(format!("Q{}: {}", record.query_num, pairs.join(", ")));
        }
    }
    anchors
}

/// Batch summarization prompt: factual anchors the summary must reproduce
/// verbatim, then a fixed four-section structured-prose instruction, then
/// the batch's queries as truncated SQL plus result summaries.
pub fn build_summary(batch: &[QueryRecord]) -> String {
    let anchors = factual_anchors(batch);
    let first = batch.first().map(|q| q.query_num).unwrap_or(0);
    let last = batch.last().map(|q| q.query_num).unwrap_or(0);

    let history_context: Vec<String> = batch
        .iter()
        .map(|q| {
            format!(
                "Q{}: {}... -> {}",
                q.query_num,
                truncate_chars(&q.sql, 100),
                q.result_summary
            )
        })
        .collect();

    format!(
        "Based on queries {} through {}, create a structured summary:\n\n\
         CRITICAL: Use these exact numerical facts as anchors for accuracy:\n{}\n\n\
         ## TABLE INSIGHTS\n\
         For each table explored:\n\
         - Data coverage patterns (sparse/dense areas)\n\
         - Key relationships discovered\n\
         - Data quality observations\n\n\
         ## RELATIONSHIP PATTERNS\n\
         - Foreign key patterns found\n\
         - Cross-table connections\n\
         - Data flow insights\n\n\
         ## DATA QUALITY FINDINGS\n\
         - Missing data patterns\n\
         - Anomalies or inconsistencies\n\
         - Completeness observations\n\n\
         ## KEY DISCOVERIES\n\
         - Most important insights from this batch\n\
         - Patterns that emerged across queries\n\
         - Questions raised for future exploration\n\n\
         Previous queries in this batch:\n{}\n\n\
         Format as structured text with clear headers, not bullet points. \
         Be concise but comprehensive.",
        first,
        last,
        anchors.join("\n"),
        history_context.join("\n"),
    )
}

/// Final-report prompt: schema statistics, summaries truncated to their
/// first 200 characters (the full content stays in the artifacts), and the
/// first 15 findings.
pub fn build_report(
    schema: &SchemaView,
    history_len: usize,
    findings: &[Finding],
    summaries: &[SummaryRecord],
) -> String {
    let mut summaries_context = String::new();
    if !summaries.is_empty() {
        summaries_context.push_str("\nBATCH SUMMARIES GENERATED:\n");
        for (i, s) in summaries.iter().enumerate() {
            summaries_context.push_str(&format!(
                "Batch {} ({}): {}...\n",
                i + 1,
                s.batch_range,
                truncate_chars(&s.summary_content, 200)
            ));
        }
    }

    let head = findings.len().min(15);
    format!(
        "Generate a summary report of database exploration.\n\n\
         SCHEMA SUMMARY:\n\
         - Tables: {}\n\
         - Total queries run: {}\n\
         - Summaries generated: {}\n\
         {}\n\
         KEY FINDINGS:\n{}\n\n\
         Generate a markdown report with these sections:\n\
         1. Data Structure Overview\n\
         2. Key Discoveries\n\
         3. Data Quality Insights\n\
         4. Recommendations\n\n\
         Make it concise but actionable.",
        schema.table_count(),
        history_len,
        summaries.len(),
        summaries_context,
        render_findings(&findings[..head]),
    )
}
