// src/main.rs
// datascout - autonomous LLM-driven exploration agent for relational databases

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use datascout::config::CONFIG;
use datascout::db::{SchemaProvider, SqliteBackend};
use datascout::explorer::{report, ExplorationSession, SessionConfig};
use datascout::llm;
use datascout::schema::SchemaView;

#[derive(Parser)]
#[command(name = "datascout")]
#[command(about = "Autonomous LLM-driven exploration agent for relational databases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore a database and produce a report (default)
    Explore {
        /// Database URL (e.g. sqlite:./data.db)
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<String>,

        /// LLM provider: anthropic or openai
        #[arg(short, long)]
        provider: Option<String>,

        /// Total query budget for the session
        #[arg(short, long)]
        max_queries: Option<usize>,

        /// Comma-separated table subset to explore (default: all tables)
        #[arg(short, long)]
        tables: Option<String>,

        /// Write the session artifacts as JSON
        #[arg(long, default_value = "artifacts.json")]
        export: PathBuf,

        /// Write the final report as markdown
        #[arg(long, default_value = "report.md")]
        report: PathBuf,
    },

    /// Discover and print the schema without exploring
    Schema {
        /// Database URL (e.g. sqlite:./data.db)
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<String>,
    },
}

async fn run_schema(database: Option<String>) -> Result<()> {
    let url = database.unwrap_or_else(|| CONFIG.database_url.clone());
    let backend = SqliteBackend::connect(&url).await?;
    let discovery = backend.introspect().await?;
    for error in &discovery.errors {
        eprintln!("warning: {}", error);
    }
    let view = SchemaView::full(Arc::new(discovery.model));
    print!("{}", view.render());
    Ok(())
}

async fn run_explore(
    database: Option<String>,
    provider: Option<String>,
    max_queries: Option<usize>,
    tables: Option<String>,
    export: PathBuf,
    report_path: PathBuf,
) -> Result<()> {
    let url = database.unwrap_or_else(|| CONFIG.database_url.clone());
    let provider = provider.unwrap_or_else(|| CONFIG.llm_provider.clone());

    let backend = Arc::new(SqliteBackend::connect(&url).await?);
    let discovery = backend.introspect().await?;
    info!(
        "Discovered {} tables, {} relationships",
        discovery.model.tables.len(),
        discovery.model.relationships.len()
    );

    let model = Arc::new(discovery.model);
    let view = match tables {
        Some(list) => SchemaView::subset(
            model,
            list.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        ),
        None => SchemaView::full(model),
    };

    let generator = llm::for_provider(&provider)?;
    let mut config = SessionConfig::default();
    if let Some(max) = max_queries {
        config.max_queries = max;
    }

    let mut session = ExplorationSession::new(generator, backend, view, config);
    session.record_discovery_errors(&discovery.errors);

    for line in session.run().await {
        println!("{}", line);
    }

    let body = session.generate_report().await;
    let rendered = report::render_markdown(session.artifacts(), &body);
    std::fs::write(&report_path, rendered)?;
    std::fs::write(&export, session.artifacts().to_json()?)?;
    println!("Report written to {}", report_path.display());
    println!("Artifacts written to {}", export.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Schema { database }) => run_schema(database).await,
        Some(Commands::Explore {
            database,
            provider,
            max_queries,
            tables,
            export,
            report,
        }) => run_explore(database, provider, max_queries, tables, export, report).await,
        None => {
            run_explore(
                None,
                None,
                None,
                None,
                PathBuf::from("artifacts.json"),
                PathBuf::from("report.md"),
            )
            .await
        }
    }
}
