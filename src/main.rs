use std::sync::Arc;

use blocks_route::api::{ApiError, BlocksApi, HttpBlocksApi};
use blocks_route::config::ClientConfig;
use blocks_route::query::QueryClient;
use blocks_route::router::{NavigationOutcome, Outlet, RouteTableError, Router, RouterContext, View};
use blocks_route::routes;
use clap::Parser;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("route table invalid: {0}")]
    Routes(#[from] RouteTableError),
    #[error("navigation to {path} failed: {message}")]
    Navigation { path: String, message: String },
    #[error("no route for {0}")]
    NotFound(String),
}

#[derive(Parser, Debug)]
#[command(name = "blocks-route", about = "Load and render the blocks page against a Prefect API")]
struct Cli {
    /// Prefect API base URL. Overrides `PREFECT_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Path to navigate to.
    #[arg(long, default_value = "/blocks")]
    path: String,
}

/// Prints every mounted view to stdout.
struct StdoutOutlet;

impl Outlet for StdoutOutlet {
    fn mount(&mut self, view: View) {
        println!("{view}");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url.as_deref() {
        config = config.with_api_url(api_url);
    }
    tracing::info!(api_url = %config.api_url, stale_time = ?config.stale_time, "client configured");

    let api: Arc<dyn BlocksApi> = Arc::new(HttpBlocksApi::new(&config)?);
    let table = routes::route_table(&api)?;
    let router = Router::new(table, RouterContext { query_client: QueryClient::new(config.query_options()) });

    match router.navigate(&cli.path, &mut StdoutOutlet).await {
        NavigationOutcome::Rendered(_) => Ok(()),
        NavigationOutcome::Failed(err) => Err(CliError::Navigation { path: cli.path, message: err.to_string() }),
        NavigationOutcome::NotFound(path) => Err(CliError::NotFound(path)),
    }
}
