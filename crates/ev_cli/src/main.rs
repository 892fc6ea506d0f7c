use clap::Parser;
use ev_core::{init_logging, ArticleStorage, FetchRequest, Fetcher, InferenceModel, Result, TagExtractor};
use ev_fetch::{write_digest, EvidenceFetcher, FetchConfig};
use ev_inference::{create_model, InferenceConfig, KeywordExtractor, ModelKind};
use ev_report::{query_by_tags, store_records, ArticleRecord, InstructionGenerator, ReportConfig, ReportOrchestrator};
use ev_storage::{create_storage, StorageConfig, StorageKind};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "evr", author, version, about = "Evidence-backed research reports", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "sqlite", env = "EV_STORAGE", help = "Storage backend. Available backends: sqlite (default), memory")]
    storage: String,
    #[arg(long, env = "EV_DB_PATH")]
    db_path: Option<PathBuf>,
    #[arg(long, default_value = "openai", env = "EV_MODEL", help = "Model to use for inference. Available models: openai (default), dummy")]
    model: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, env = "EV_MODEL_NAME")]
    model_name: Option<String>,
    #[arg(long, env = "JINA_API_KEY", hide_env_values = true)]
    reader_api_key: Option<String>,
    /// Cached articles needed before fresh ones are no longer fetched
    #[arg(long, env = "EV_MIN_ARTICLES", default_value_t = 7)]
    min_articles: usize,
    /// Tags an article must share with the query to count as cached evidence
    #[arg(long, env = "EV_MIN_TAG_MATCHES", default_value_t = 4)]
    min_tag_matches: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Answer a question with a report built from cached and fresh evidence
    Report {
        query: String,
        /// Extra instructions appended after the base report prompt
        #[arg(long)]
        instructions: Option<String>,
        /// Ask the model for query-specific instructions
        #[arg(long, conflicts_with = "instructions")]
        dynamic: bool,
        /// Keep fetched entries whose summary is an error message
        #[arg(long)]
        keep_failed: bool,
    },
    /// Print the tags extracted from a query
    Tags {
        query: String,
        #[arg(long, default_value_t = 5)]
        top_n: usize,
    },
    /// List cached articles matching a query's tags
    Lookup {
        query: String,
        #[arg(long)]
        min_matches: Option<usize>,
    },
    /// Search, read and summarize articles without touching the store
    Fetch {
        #[arg(long, conflicts_with = "urls", required_unless_present = "urls")]
        query: Option<String>,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Write a plain-text digest of the results
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Insert or refresh articles from a JSON array file
    Store {
        file: PathBuf,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000", env = "EV_ADDR")]
        addr: String,
    },
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        ReportConfig {
            min_article_threshold: self.min_articles,
            min_tag_matches: self.min_tag_matches,
            ..ReportConfig::default()
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        FetchConfig { reader_api_key: self.reader_api_key.clone(), ..FetchConfig::default() }
    }

    async fn storage(&self) -> Result<Arc<dyn ArticleStorage>> {
        let kind: StorageKind = self.storage.parse()?;
        let mut config = StorageConfig::new(kind);
        if let Some(path) = &self.db_path {
            config = config.with_path(path);
        }
        let storage = create_storage(&config).await?;
        info!("💾 Checking storage connection...");
        let count = storage.count().await?;
        info!("✨ Storage initialized successfully (using {}, {} cached articles)", kind, count);
        Ok(storage)
    }

    async fn model(&self) -> Result<Arc<dyn InferenceModel>> {
        let mut config = InferenceConfig {
            kind: self.model.parse::<ModelKind>()?,
            api_key: self.api_key.clone(),
            ..InferenceConfig::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model_name) = &self.model_name {
            config.model_name = model_name.clone();
        }
        let model = create_model(&config).await?;
        info!("🧠 Inference model initialized successfully (using {})", model.name());
        Ok(model)
    }

    async fn orchestrator(&self, config: ReportConfig) -> Result<(ReportOrchestrator, Arc<dyn InferenceModel>)> {
        let storage = self.storage().await?;
        let model = self.model().await?;
        let fetcher = Arc::new(EvidenceFetcher::with_defaults(model.clone(), self.fetch_config()));
        let orchestrator = ReportOrchestrator::new(Arc::new(KeywordExtractor::new()), storage, fetcher, model.clone(), config)?;
        Ok((orchestrator, model))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Report { query, instructions, dynamic, keep_failed } => {
            let config = ReportConfig { skip_failed_fetches: !keep_failed, ..cli.report_config() };
            let (orchestrator, model) = cli.orchestrator(config).await?;
            let extra = match instructions {
                Some(text) => text.clone(),
                None if *dynamic => InstructionGenerator::new(model, orchestrator.config().narrative_temperature).generate(query).await,
                None => String::new(),
            };
            info!("📝 Generating report for '{}'", query);
            let run = orchestrator.run(query, &extra).await?;
            info!(
                "📚 Used {} article(s) ({} cached, {} newly stored)",
                run.articles.len(),
                run.cached_count,
                run.appended
            );
            println!("{}", run.report);
        }
        Commands::Tags { query, top_n } => {
            let tags = KeywordExtractor::new().extract_tags(query, *top_n).await?;
            println!("{}", tags.join(", "));
        }
        Commands::Lookup { query, min_matches } => {
            let storage = cli.storage().await?;
            let tags = KeywordExtractor::new().extract_tags(query, ReportConfig::default().tag_top_n).await?;
            info!("🏷️ Looking up articles tagged {:?}", tags);
            let articles = query_by_tags(storage.as_ref(), &tags, min_matches.unwrap_or(cli.min_tag_matches)).await;
            for article in &articles {
                println!("{}  [{}]  {}", article.retrieval_timestamp.to_rfc3339(), article.tags.join(", "), article.url);
            }
            info!("Found {} article(s)", articles.len());
        }
        Commands::Fetch { query, count, urls, output } => {
            let model = cli.model().await?;
            let fetcher = EvidenceFetcher::with_defaults(model, cli.fetch_config());
            let request = match query {
                Some(query) => FetchRequest::query(query.clone(), *count),
                None => FetchRequest::urls(urls.clone()),
            };
            info!("🦗 Fetching articles...");
            let results = fetcher.fetch(&request).await?;
            for entry in &results {
                println!("{}\n  {}\n", entry.url, entry.summary);
            }
            if let Some(path) = output {
                write_digest(path, &results).await?;
            }
        }
        Commands::Store { file } => {
            let storage = cli.storage().await?;
            let raw = tokio::fs::read_to_string(file).await?;
            let records: Vec<ArticleRecord> = serde_json::from_str(&raw)?;
            let outcome = store_records(storage.as_ref(), records).await?;
            println!(
                "Stored {} article(s) ({} refreshed, {} skipped)",
                outcome.stored, outcome.refreshed, outcome.skipped
            );
        }
        Commands::Serve { addr } => {
            let (orchestrator, model) = cli.orchestrator(cli.report_config()).await?;
            let instructions = InstructionGenerator::new(model, orchestrator.config().narrative_temperature);
            let state = ev_web::AppState {
                orchestrator: Arc::new(orchestrator),
                tagger: Arc::new(KeywordExtractor::new()),
                instructions: Some(Arc::new(instructions)),
            };
            ev_web::serve(state, addr).await?;
        }
    }

    Ok(())
}
