// src/explorer/engine.rs
// The iteration state machine. Drives ask -> parse -> execute -> analyze ->
// extract -> maybe-summarize until the query budget is spent. Per-iteration
// failures are absorbed, never fatal: every iteration consumes its budget
// slot and produces exactly one outcome.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::artifacts::SessionArtifacts;
use super::findings;
use super::prompt;
use super::summarizer::Summarizer;
use super::types::{Finding, IterationOutcome, QueryRecord, SummaryRecord};
use crate::config::CONFIG;
use crate::db::QueryExecutor;
use crate::error::Error;
use crate::llm::TextGenerator;
use crate::schema::SchemaView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_queries: usize,
    pub summary_batch_size: usize,
    pub findings_cap: usize,
    pub findings_keep: usize,
    pub result_sample_max: usize,
    pub result_sample_truncated: usize,
    pub max_output_tokens: u32,
    pub summary_output_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_queries: CONFIG.max_queries,
            summary_batch_size: CONFIG.summary_batch_size,
            findings_cap: CONFIG.findings_cap,
            findings_keep: CONFIG.findings_keep,
            result_sample_max: CONFIG.result_sample_max,
            result_sample_truncated: CONFIG.result_sample_truncated,
            max_output_tokens: CONFIG.max_output_tokens,
            summary_output_tokens: CONFIG.summary_output_tokens,
        }
    }
}

/// One exploration run, from schema acquisition through final report. The
/// unit of isolation: strictly sequential, single caller, no shared state.
pub struct ExplorationSession {
    generator: Arc<dyn TextGenerator>,
    executor: Arc<dyn QueryExecutor>,
    schema: SchemaView,
    config: SessionConfig,
    summarizer: Summarizer,
    phase: SessionPhase,
    query_count: usize,
    history: Vec<QueryRecord>,
    findings: Vec<Finding>,
    summaries: Vec<SummaryRecord>,
    artifacts: SessionArtifacts,
}

impl ExplorationSession {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        executor: Arc<dyn QueryExecutor>,
        schema: SchemaView,
        config: SessionConfig,
    ) -> Self {
        let mut artifacts = SessionArtifacts::new(
            Uuid::new_v4().to_string(),
            generator.name().to_string(),
            config.max_queries,
        );
        artifacts.record_schema(schema.to_model());

        let summarizer = Summarizer::new(
            generator.clone(),
            config.summary_batch_size,
            config.findings_cap,
            config.findings_keep,
            config.summary_output_tokens,
        );

        Self {
            generator,
            executor,
            schema,
            config,
            summarizer,
            phase: SessionPhase::Idle,
            query_count: 0,
            history: Vec::new(),
            findings: Vec::new(),
            summaries: Vec::new(),
            artifacts,
        }
    }

    /// Log discovery-time degradations (e.g. column listing failures) into
    /// the session's error log before the loop starts.
    pub fn record_discovery_errors(&mut self, errors: &[Error]) {
        for error in errors {
            self.artifacts.record_error(error);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn query_count(&self) -> usize {
        self.query_count
    }

    pub fn history(&self) -> &[QueryRecord] {
        &self.history
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn summaries(&self) -> &[SummaryRecord] {
        &self.summaries
    }

    pub fn artifacts(&self) -> &SessionArtifacts {
        &self.artifacts
    }

    /// Split a model response on the literal `SQL:` and `REASONING:`
    /// markers. `SQL:` is required; `REASONING:` falls back to a placeholder.
    fn parse_response(response: &str) -> Result<(String, String), Error> {
        let Some(after_sql) = response.split("SQL:").nth(1) else {
            return Err(Error::Parse("SQL:"));
        };
        let (sql, reasoning) = match after_sql.split_once("REASONING:") {
            Some((sql, reasoning)) => (sql.trim(), reasoning.trim().to_string()),
            None => (after_sql.trim(), prompt::reasoning_placeholder()),
        };
        Ok((sql.to_string(), reasoning))
    }

    async fn run_iteration(&mut self) -> IterationOutcome {
        self.query_count += 1;
        let query_num = self.query_count;

        // The generator never throws; errors come back as text and simply
        // fail the SQL: parse below.
        let exploration_prompt = prompt::build_exploration(
            &self.schema,
            &self.history,
            &self.findings,
            &self.summaries,
            self.config.max_queries,
        );
        self.artifacts.log_prompt(query_num, exploration_prompt.clone());
        let response = self
            .generator
            .generate(&exploration_prompt, self.config.max_output_tokens)
            .await;

        let (sql, reasoning) = match Self::parse_response(&response) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Query {}: unparseable model response", query_num);
                self.artifacts.record_error(&e);
                return IterationOutcome::ParseFailure { query_num };
            }
        };

        let result = match self.executor.execute(&sql).await {
            Ok(result) => result,
            Err(e) => {
                // Slot consumed, no retry.
                warn!("Query {} failed: {}", query_num, e);
                let message = e.to_string();
                self.artifacts.record_error(&e);
                return IterationOutcome::ExecutionFailure { query_num, message };
            }
        };
        let result_summary = result.summary();

        let analysis_prompt = prompt::build_analysis(&result, &sql);
        self.artifacts
            .log_thinking_prompt(query_num.to_string(), analysis_prompt.clone());
        let analysis = self
            .generator
            .generate(&analysis_prompt, self.config.max_output_tokens)
            .await;
        self.artifacts
            .log_thinking_response(query_num.to_string(), analysis.clone());

        let new_findings = findings::extract(&analysis);
        self.findings.extend(new_findings.iter().cloned());
        self.artifacts
            .snapshot_findings(query_num, new_findings, &self.findings);

        let truncated = result.row_count() > self.config.result_sample_max;
        let sample = if truncated {
            result.rows[..self.config.result_sample_truncated.min(result.rows.len())].to_vec()
        } else {
            result.rows.clone()
        };
        let record = QueryRecord {
            query_num,
            sql,
            reasoning,
            result_summary,
            row_count: result.row_count(),
            column_count: result.column_count(),
            results_data: sample,
            results_truncated: truncated,
            analysis,
            timestamp: chrono::Utc::now(),
        };
        self.artifacts.record_query(&record);
        self.history.push(record);

        let mut summarized = false;
        if self
            .summarizer
            .should_trigger(self.query_count, self.history.len())
        {
            let summary = self
                .summarizer
                .trigger(
                    &self.history,
                    self.query_count,
                    &mut self.findings,
                    &mut self.artifacts,
                )
                .await;
            self.summaries.push(summary);
            summarized = true;
        }

        IterationOutcome::Recorded {
            query_num,
            summarized,
        }
    }

    /// Run the loop to completion. Termination is purely count-based:
    /// exactly `max_queries` iterations are attempted no matter how many
    /// succeed. Returns one status line per iteration plus a closing line.
    pub async fn run(&mut self) -> Vec<String> {
        self.phase = SessionPhase::Running;
        info!(
            "Starting exploration: {} queries budgeted against {} tables",
            self.config.max_queries,
            self.schema.table_count()
        );

        let mut status_lines = Vec::new();
        while self.query_count < self.config.max_queries {
            let outcome = self.run_iteration().await;
            let result_summary = match &outcome {
                IterationOutcome::Recorded { .. } => self
                    .history
                    .last()
                    .map(|record| record.result_summary.clone()),
                _ => None,
            };
            status_lines.push(outcome.status_line(result_summary.as_deref()));
        }

        self.phase = SessionPhase::Completed;
        status_lines.push(format!(
            "Exploration complete: {} queries executed, {} summaries generated",
            self.history.len(),
            self.summaries.len()
        ));
        status_lines
    }

    /// Synthesize the final report. Pure with respect to current state, so
    /// an interim report at any point is fine too.
    pub async fn generate_report(&mut self) -> String {
        let report_prompt = prompt::build_report(
            &self.schema,
            self.history.len(),
            &self.findings,
            &self.summaries,
        );
        let report = self
            .generator
            .generate(&report_prompt, self.config.max_output_tokens)
            .await;
        self.artifacts.set_final_report(report_prompt, report.clone());
        report
    }
}
