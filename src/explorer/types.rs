// src/explorer/types.rs
// Record types accumulated over one exploration session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Row;

/// One successful iteration: the query the model chose, why, and what it and
/// the analysis pass produced. Immutable once appended to the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// 1-based, monotonically increasing.
    pub query_num: usize,
    pub sql: String,
    pub reasoning: String,
    pub result_summary: String,
    pub row_count: usize,
    pub column_count: usize,
    /// Bounded inline sample: all rows when small, otherwise a head slice
    /// with `results_truncated` set.
    pub results_data: Vec<Row>,
    pub results_truncated: bool,
    pub analysis: String,
    pub timestamp: DateTime<Utc>,
}

/// A single extracted insight from model analysis text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding: String,
    pub timestamp: DateTime<Utc>,
}

/// Compacted digest of one batch of queries. Never truncated or merged;
/// only the most recent two are surfaced back into prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Inclusive query-number interval, e.g. "queries_4_to_6".
    pub batch_range: String,
    pub summary_content: String,
    pub query_count: usize,
    pub queries_summarized: Vec<usize>,
    pub timestamp: DateTime<Utc>,
}

/// What one iteration of the loop produced. Exactly one of these per
/// consumed query-budget slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// A QueryRecord was appended (and possibly a summary triggered).
    Recorded { query_num: usize, summarized: bool },
    /// The model response had no `SQL:` marker.
    ParseFailure { query_num: usize },
    /// The query executor rejected the SQL.
    ExecutionFailure { query_num: usize, message: String },
}

impl IterationOutcome {
    /// One-line status the CLI prints per iteration.
    pub fn status_line(&self, result_summary: Option<&str>) -> String {
        match self {
            IterationOutcome::Recorded {
                query_num,
                summarized: true,
            } => format!(
                "Query {}: {} (batch summary generated)",
                query_num,
                result_summary.unwrap_or("ok")
            ),
            IterationOutcome::Recorded { query_num, .. } => {
                format!("Query {}: {}", query_num, result_summary.unwrap_or("ok"))
            }
            IterationOutcome::ParseFailure { query_num } => {
                format!("Query {}: Could not parse model response", query_num)
            }
            IterationOutcome::ExecutionFailure { query_num, message } => {
                format!("Query {}: {}", query_num, message)
            }
        }
    }
}
