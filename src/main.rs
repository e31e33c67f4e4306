use anyhow::Result;
use cinescope::app::{self, AppState};
use cinescope::config::AppConfig;
use cinescope::routes::{self, Target};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cinescope")]
#[command(about = "Movie listings, nearby cinemas and weather forecasts", long_about = None)]
#[command(version)]
struct Cli {
    /// Route to open, e.g. /home, /cinema, /search
    #[arg(default_value = "/")]
    path: String,

    /// Query parameter for the view, as KEY=VALUE (repeatable)
    #[arg(short, long = "query", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Print the route table and exit
    #[arg(long)]
    routes: bool,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    cinescope::utils::init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let cli = Cli::parse();
    if cli.routes {
        for route in routes::table() {
            match route.target {
                Target::View(kind) => println!("{:<10} {}", route.path, kind.name()),
                Target::Redirect(to) => println!("{:<10} -> {}", route.path, to),
            }
        }
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    info!("All required environment variables are set");
    let router = app::build_router(AppState::from_config(&config)?);

    let uri = app::navigation_uri(&cli.path, &cli.params);
    let navigation = app::navigate(&router, &uri).await?;
    let rendered = serde_json::to_string_pretty(&navigation.body)?;
    if !navigation.is_success() {
        eprintln!("{rendered}");
        anyhow::bail!("{} returned {}", navigation.uri, navigation.status);
    }
    println!("{rendered}");
    Ok(())
}
