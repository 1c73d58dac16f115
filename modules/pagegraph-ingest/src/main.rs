use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pagegraph_common::{Config, ExtractorSource, Normalizer};
use pagegraph_graph::{GraphClient, GraphReader, GraphWriter};
use pagegraph_ingest::{
    load_pages, GazetteerExtractor, Ingestor, MentionExtractor, NerServiceExtractor,
};

#[derive(Parser)]
#[command(name = "pagegraph")]
#[command(about = "Build an entity co-mention graph from extracted document pages")]
#[command(version)]
struct Cli {
    /// JSON array of pages (overrides DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// NER service base URL (overrides NER_URL)
    #[arg(long, global = true)]
    ner_url: Option<String>,

    /// Gazetteer JSON file (overrides GAZETTEER_PATH)
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from every page and upsert them into the graph (default)
    Ingest,

    /// List entities co-mentioned with an entity, strongest first
    Query {
        /// Entity id, e.g. "person:alice"
        entity_id: String,

        #[arg(short, long, default_value_t = 25)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pagegraph=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    // An explicit --gazetteer beats NER_URL from the environment; --ner-url beats both.
    match (cli.ner_url, cli.gazetteer) {
        (Some(url), gazetteer) => {
            config.ner_url = Some(url);
            if gazetteer.is_some() {
                config.gazetteer_path = gazetteer;
            }
        }
        (None, Some(path)) => {
            config.ner_url = None;
            config.gazetteer_path = Some(path);
        }
        (None, None) => {}
    }
    config.log_redacted();

    let client = GraphClient::from_config(&config).await?;

    match cli.command.unwrap_or(Commands::Ingest) {
        Commands::Ingest => ingest(&config, client).await,
        Commands::Query { entity_id, limit } => query(client, &entity_id, limit).await,
    }
}

async fn ingest(config: &Config, client: GraphClient) -> Result<()> {
    let extractor: Box<dyn MentionExtractor> = match config.extractor_source()? {
        ExtractorSource::NerService { url, model } => {
            info!(url = url.as_str(), model = model.as_str(), "Using NER service");
            Box::new(NerServiceExtractor::new(&url, &model))
        }
        ExtractorSource::Gazetteer(path) => Box::new(GazetteerExtractor::from_path(&path)?),
    };

    let normalizer = config
        .extra_tags
        .iter()
        .fold(Normalizer::new(), |n, (tag, category)| n.with_tag(tag, *category));

    let pages = load_pages(&config.data_path)?;

    let ingestor = Ingestor::new(GraphWriter::new(client), extractor, normalizer);
    ingestor.prepare().await?;
    let stats = ingestor.run(&pages).await?;

    info!("Ingest complete. {stats}");
    info!("Try in Neo4j Browser: MATCH (a)-[r:RELATES_TO]->(b) RETURN a, r, b LIMIT 200;");
    Ok(())
}

async fn query(client: GraphClient, entity_id: &str, limit: i64) -> Result<()> {
    let reader = GraphReader::new(client);

    let Some(entity) = reader.entity(entity_id).await? else {
        println!("No entity {entity_id}");
        return Ok(());
    };
    println!(
        "{} [{}] {} ({} refs)",
        entity.entity_id,
        entity.labels.join(","),
        entity.name,
        entity.refs.len()
    );

    for co in reader.co_mentions(entity_id, limit).await? {
        println!("  {:>4}  {}  ({})", co.count, co.name, co.entity_id);
        for r in &co.refs {
            println!("          {r}");
        }
    }
    Ok(())
}
