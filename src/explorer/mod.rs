// src/explorer/mod.rs
// The exploration engine: prompt construction, the iteration state machine,
// findings extraction, hierarchical summarization, artifact capture, and
// report generation.

pub mod artifacts;
pub mod engine;
pub mod findings;
pub mod prompt;
pub mod report;
pub mod summarizer;
pub mod types;

pub use artifacts::SessionArtifacts;
pub use engine::{ExplorationSession, SessionConfig, SessionPhase};
pub use types::{Finding, IterationOutcome, QueryRecord, SummaryRecord};
