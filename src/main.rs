use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use search_core::constants::{DEFAULT_BASE_URL, DEFAULT_RUNS, DEFAULT_TIMEOUT_SECS};
use search_core::{
    HttpFhirClient, LatencyAggregate, LoggingInterceptor, ResponseTimeInterceptor, SearchConfig,
    SearchRunner, read_query_keys,
};

#[derive(Parser, Debug)]
#[command(name = "patient-search")]
#[command(about = "Search a FHIR server for patients by last name and report response times")]
struct Cli {
    /// File with one patient last name per line
    names_file: PathBuf,

    /// FHIR server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of times every name is searched
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    runs: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Log failed searches and carry on instead of stopping
    #[arg(long)]
    continue_on_error: bool,

    /// Log a line for every request and response
    #[arg(long)]
    log_requests: bool,
}

impl Cli {
    fn search_config(&self) -> search_core::SearchResult<SearchConfig> {
        SearchConfig::new(
            &self.base_url,
            self.runs,
            Duration::from_secs(self.timeout_secs),
        )
        .map(|config| config.with_continue_on_error(self.continue_on_error))
    }
}

/// Entry point for the patient search client
///
/// Reads last names from the given file, searches each one on the FHIR server
/// `--runs` times, and prints the matching patients followed by the average
/// response time of every run. Logs go to stderr and honour `RUST_LOG`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_search=info".parse()?)
                .add_directive("search_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}

/// Request logging is opt-in: at `info` it would add two stderr lines per search
/// around every run.
fn http_client(
    config: &SearchConfig,
    latency: Arc<LatencyAggregate>,
    log_requests: bool,
) -> search_core::ClientResult<HttpFhirClient> {
    let mut builder = HttpFhirClient::builder(config.base_url().clone())
        .timeout(config.timeout())
        .interceptor(Arc::new(ResponseTimeInterceptor::new(latency)));
    if log_requests {
        builder = builder.interceptor(Arc::new(LoggingInterceptor::new()));
    }
    builder.build()
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.search_config()?;
    let names = read_query_keys(&cli.names_file)?;

    tracing::info!(
        "++ Searching {} names against {}",
        names.len(),
        config.base_url()
    );

    let latency = Arc::new(LatencyAggregate::new());
    let client = http_client(&config, latency.clone(), cli.log_requests)?;

    let runner = SearchRunner::new(client, latency, config.runs())
        .continue_on_error(config.continue_on_error());

    let stdout = std::io::stdout();
    let summary = runner.run(&names, &mut stdout.lock()).await?;

    if summary.failed_queries > 0 {
        tracing::warn!("{} searches failed", summary.failed_queries);
    }

    Ok(())
}
