// src/error.rs
// Error taxonomy for the exploration engine.
//
// Failures above iteration granularity (connection, schema discovery)
// propagate to the caller. Everything inside the running loop is caught per
// iteration and converted into an artifact record; the loop never aborts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Could not open the database at session start. Fatal.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The target schema exists but could not be read.
    #[error("schema access failed: {0}")]
    SchemaAccess(String),

    /// Table listing failed across all discovery strategies.
    #[error("table discovery failed: {0}")]
    TableDiscovery(String),

    /// Column listing failed for one table. The table is kept with empty
    /// columns and discovery continues.
    #[error("column discovery failed for table {table}: {message}")]
    ColumnDiscovery { table: String, message: String },

    /// A model-generated query failed to execute. Non-fatal to the loop;
    /// the iteration's budget slot is still consumed.
    #[error("query execution failed: {message}")]
    QueryExecution { sql: String, message: String },

    /// A required field was missing from the model response.
    #[error("could not parse model response: missing {0}")]
    Parse(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
