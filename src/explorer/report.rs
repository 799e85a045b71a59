// src/explorer/report.rs
// Final narrative report rendering around the model-generated body.

use super::artifacts::SessionArtifacts;

/// Wrap the model's report body with session statistics for file output.
pub fn render_markdown(artifacts: &SessionArtifacts, body: &str) -> String {
    let meta = &artifacts.session_metadata;
    format!(
        "# Database Exploration Report\n\n\
         - Session: {}\n\
         - Provider: {}\n\
         - Started: {}\n\
         - Queries run: {} of {} budgeted\n\
         - Batch summaries: {}\n\
         - Errors logged: {}\n\n\
         {}\n",
        meta.session_id,
        meta.llm_provider,
        meta.start_time.to_rfc3339(),
        artifacts.query_history.len(),
        meta.max_queries,
        artifacts.hierarchical_summaries.len(),
        artifacts.errors.len(),
        body.trim_end(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_stats_and_body() {
        let artifacts = SessionArtifacts::new("abc".to_string(), "anthropic".to_string(), 7);
        let report = render_markdown(&artifacts, "## Findings\nnothing yet");
        assert!(report.starts_with("# Database Exploration Report"));
        assert!(report.contains("Session: abc"));
        assert!(report.contains("Queries run: 0 of 7 budgeted"));
        assert!(report.contains("## Findings"));
    }
}
