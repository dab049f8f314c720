mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sg_engine::graph::{MemoryGraphSink, PgGraphStore};
use sg_engine::{Pipeline, ShapePolicy};
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(
    name = "structgraph",
    version,
    about = "Extract Go structs, interfaces and methods into a graph database"
)]
struct Cli {
    /// Go source file to extract
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Config file (defaults to <config dir>/structgraph/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on the first method with an unsupported signature instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Print the extracted model as JSON and skip the database
    #[arg(long)]
    dry_run: bool,

    /// Apply schema migrations before writing
    #[arg(long)]
    migrate: bool,

    /// Delete previously stored nodes of the file's package before writing
    #[arg(long)]
    replace: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("structgraph={level},sg_engine={level}"))
            }),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let policy = ShapePolicy::from_strict(cli.strict || config.extract.strict);
    let pipeline = Pipeline::new(policy);

    let extraction = pipeline
        .extract_file(&cli.file)
        .with_context(|| format!("failed to extract {}", cli.file.display()))?;
    let model = &extraction.model;

    tracing::info!(
        packages = model.packages().len(),
        types = model.type_count(),
        methods = model.method_count(),
        skipped = extraction.diagnostics.len(),
        "extracted model"
    );

    if cli.dry_run {
        let sink = MemoryGraphSink::new();
        let summary = pipeline.persist(&sink, model).await?;
        tracing::info!(
            nodes = summary.nodes,
            edges = summary.edges,
            "dry run, nothing written to the database"
        );
        println!("{}", serde_json::to_string_pretty(model)?);
        return Ok(());
    }

    let url = cli.database_url.or(config.database.url).context(
        "no database configured: pass --database-url, set DATABASE_URL, \
         or add [database] url to the config file",
    )?;
    let store = PgGraphStore::connect(&url)
        .await
        .context("failed to connect to database")?;

    if cli.migrate {
        store.migrate().await.context("failed to run migrations")?;
    }

    let written = if cli.replace {
        pipeline.replace(&store, model).await
    } else {
        pipeline.persist(&store, model).await
    };
    let summary = written.context("failed to write graph")?;

    println!(
        "Stored {} nodes and {} edges from {}",
        summary.nodes,
        summary.edges,
        cli.file.display()
    );
    Ok(())
}
