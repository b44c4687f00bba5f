use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use paperrag_retrieval::{RagConfig, RagEngine};
use paperrag_vector_store::EmbeddingModel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paperrag")]
#[command(about = "Chunk, embed, index and retrieve document text", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for results)
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding model id
    #[arg(long, global = true)]
    embed_model: Option<String>,

    /// Vector index file (overrides PAPERRAG_INDEX_PATH)
    #[arg(long, global = true)]
    index_path: Option<PathBuf>,

    /// Metadata ledger file (overrides PAPERRAG_METADATA_PATH)
    #[arg(long, global = true)]
    metadata_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a document's text into the index
    Ingest(IngestArgs),

    /// Retrieve the chunks nearest to a query
    Query(QueryArgs),

    /// Show index statistics
    Stats,
}

#[derive(Args)]
#[command(group = clap::ArgGroup::new("source").required(true))]
struct IngestArgs {
    /// Opaque identifier of the document's record in the host system
    #[arg(long)]
    document_id: i64,

    /// Read the document text from a file
    #[arg(long, group = "source")]
    file: Option<PathBuf>,

    /// Pass the document text inline
    #[arg(long, group = "source")]
    text: Option<String>,

    /// Chunk window size in characters (overrides PAPERRAG_CHUNK_SIZE)
    #[arg(long)]
    chunk_size: Option<usize>,
}

#[derive(Args)]
struct QueryArgs {
    /// Query text
    query: String,

    /// Number of chunks to retrieve
    #[arg(long, default_value_t = 5)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = RagConfig::from_env();
    if let Some(model_id) = &cli.embed_model {
        config.model_id = model_id.clone();
    }
    if let Some(path) = &cli.index_path {
        config.index_path = path.clone();
    }
    if let Some(path) = &cli.metadata_path {
        config.metadata_path = path.clone();
    }

    match cli.command {
        Commands::Ingest(args) => ingest(config, args).await,
        Commands::Query(args) => query(config, args).await,
        Commands::Stats => stats(config).await,
    }
}

async fn ingest(mut config: RagConfig, args: IngestArgs) -> Result<()> {
    if let Some(size) = args.chunk_size {
        config.chunk_size = size;
    }

    let text = match (&args.file, &args.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => unreachable!("clap enforces one text source"),
    };

    let mut engine = open_engine(config).await?;
    let stored = engine
        .ingest(args.document_id, &text)
        .await
        .context("Ingestion failed")?;

    println!("{stored}");
    Ok(())
}

async fn query(config: RagConfig, args: QueryArgs) -> Result<()> {
    let engine = open_engine(config).await?;
    let results = engine
        .retrieve(&args.query, args.top_k)
        .await
        .context("Retrieval failed")?;

    for record in results {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

async fn stats(config: RagConfig) -> Result<()> {
    let engine = open_engine(config).await?;
    println!(
        "{}",
        serde_json::json!({
            "chunks": engine.count(),
            "dimension": engine.dimension(),
        })
    );
    Ok(())
}

async fn open_engine(config: RagConfig) -> Result<RagEngine> {
    let embedder = EmbeddingModel::new(&config.model_id);
    RagEngine::open(config, embedder)
        .await
        .context("Failed to open index")
}
