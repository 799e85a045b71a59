// src/explorer/artifacts.rs
// Append-only session log: every prompt, response, record, and error, kept
// for export and debugging. Nothing in here is ever pruned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Finding, QueryRecord, SummaryRecord};
use crate::error::Error;
use crate::schema::SchemaModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub llm_provider: String,
    pub max_queries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub table_count: usize,
    pub relationship_count: usize,
    pub schema_data: SchemaModel,
}

/// Deep copy of the findings list at one moment, for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingsSnapshot {
    pub query_num: usize,
    pub timestamp: DateTime<Utc>,
    pub new_findings: Vec<Finding>,
    pub total_findings_count: usize,
    pub all_findings_snapshot: Vec<Finding>,
}

/// Exploration prompts, labeled by the iteration they were built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptLog {
    pub query_num: usize,
    pub timestamp: DateTime<Utc>,
    pub prompt_text: String,
}

/// Analysis and summary prompts. The label is either an iteration number or
/// a batch range like "SUMMARY_4-6".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingPrompt {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub thinking_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingResponse {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub thinking_response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub error_type: String,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub timestamp: DateTime<Utc>,
    pub report_prompt: String,
    pub report_content: String,
    pub total_queries_run: usize,
    pub total_findings: usize,
    pub total_summaries: usize,
}

/// The session-scoped structured log, serialized as the export surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArtifacts {
    pub session_metadata: SessionMetadata,
    pub schema: SchemaSnapshot,
    pub query_history: Vec<QueryRecord>,
    pub findings_history: Vec<FindingsSnapshot>,
    pub thinking_prompts: Vec<ThinkingPrompt>,
    pub thinking_responses: Vec<ThinkingResponse>,
    pub prompts: Vec<PromptLog>,
    pub hierarchical_summaries: Vec<SummaryRecord>,
    pub summary_trigger_points: Vec<usize>,
    pub final_report: Option<FinalReport>,
    pub errors: Vec<ErrorRecord>,
}

impl SessionArtifacts {
    pub fn new(session_id: String, llm_provider: String, max_queries: usize) -> Self {
        Self {
            session_metadata: SessionMetadata {
                session_id,
                start_time: Utc::now(),
                llm_provider,
                max_queries,
            },
            schema: SchemaSnapshot::default(),
            query_history: Vec::new(),
            findings_history: Vec::new(),
            thinking_prompts: Vec::new(),
            thinking_responses: Vec::new(),
            prompts: Vec::new(),
            hierarchical_summaries: Vec::new(),
            summary_trigger_points: Vec::new(),
            final_report: None,
            errors: Vec::new(),
        }
    }

    pub fn record_schema(&mut self, model: SchemaModel) {
        self.schema = SchemaSnapshot {
            timestamp: Some(Utc::now()),
            table_count: model.tables.len(),
            relationship_count: model.relationships.len(),
            schema_data: model,
        };
    }

    pub fn log_prompt(&mut self, query_num: usize, prompt_text: String) {
        self.prompts.push(PromptLog {
            query_num,
            timestamp: Utc::now(),
            prompt_text,
        });
    }

    pub fn log_thinking_prompt(&mut self, label: String, thinking_prompt: String) {
        self.thinking_prompts.push(ThinkingPrompt {
            label,
            timestamp: Utc::now(),
            thinking_prompt,
        });
    }

    pub fn log_thinking_response(&mut self, label: String, thinking_response: String) {
        self.thinking_responses.push(ThinkingResponse {
            label,
            timestamp: Utc::now(),
            thinking_response,
        });
    }

    pub fn record_query(&mut self, record: &QueryRecord) {
        self.query_history.push(record.clone());
    }

    pub fn snapshot_findings(
        &mut self,
        query_num: usize,
        new_findings: Vec<Finding>,
        all_findings: &[Finding],
    ) {
        self.findings_history.push(FindingsSnapshot {
            query_num,
            timestamp: Utc::now(),
            total_findings_count: all_findings.len(),
            all_findings_snapshot: all_findings.to_vec(),
            new_findings,
        });
    }

    pub fn record_summary(&mut self, summary: SummaryRecord, trigger_point: usize) {
        self.hierarchical_summaries.push(summary);
        self.summary_trigger_points.push(trigger_point);
    }

    pub fn record_error(&mut self, error: &Error) {
        let (error_type, sql, table) = match error {
            Error::Connection(_) => ("CONNECTION_ERROR", None, None),
            Error::SchemaAccess(_) => ("SCHEMA_ACCESS_ERROR", None, None),
            Error::TableDiscovery(_) => ("TABLE_DISCOVERY_ERROR", None, None),
            Error::ColumnDiscovery { table, .. } => {
                ("COLUMN_DISCOVERY_ERROR", None, Some(table.clone()))
            }
            Error::QueryExecution { sql, .. } => {
                ("QUERY_EXECUTION_ERROR", Some(sql.clone()), None)
            }
            Error::Parse(_) => ("PARSE_ERROR", None, None),
        };
        self.errors.push(ErrorRecord {
            timestamp: Utc::now(),
            error_type: error_type.to_string(),
            error_message: error.to_string(),
            sql,
            table,
        });
    }

    pub fn set_final_report(&mut self, report_prompt: String, report_content: String) {
        self.final_report = Some(FinalReport {
            timestamp: Utc::now(),
            report_prompt,
            report_content,
            total_queries_run: self.query_history.len(),
            total_findings: self
                .findings_history
                .last()
                .map(|s| s.total_findings_count)
                .unwrap_or(0),
            total_summaries: self.hierarchical_summaries.len(),
        });
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_types() {
        let mut artifacts = SessionArtifacts::new("s".to_string(), "anthropic".to_string(), 5);
        artifacts.record_error(&Error::QueryExecution {
            sql: "SELECT nope".to_string(),
            message: "no such table".to_string(),
        });
        artifacts.record_error(&Error::ColumnDiscovery {
            table: "users".to_string(),
            message: "locked".to_string(),
        });

        assert_eq!(artifacts.errors[0].error_type, "QUERY_EXECUTION_ERROR");
        assert_eq!(artifacts.errors[0].sql.as_deref(), Some("SELECT nope"));
        assert_eq!(artifacts.errors[1].error_type, "COLUMN_DISCOVERY_ERROR");
        assert_eq!(artifacts.errors[1].table.as_deref(), Some("users"));
    }

    #[test]
    fn test_export_has_expected_keys() {
        let artifacts = SessionArtifacts::new("s".to_string(), "openai".to_string(), 3);
        let json = artifacts.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "session_metadata",
            "schema",
            "query_history",
            "findings_history",
            "thinking_prompts",
            "thinking_responses",
            "prompts",
            "hierarchical_summaries",
            "summary_trigger_points",
            "final_report",
            "errors",
        ] {
            assert!(value.get(key).is_some(), "missing export key: {}", key);
        }
    }
}
