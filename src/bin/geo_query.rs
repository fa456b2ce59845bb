use anyhow::Result;
use clap::Parser;
use geo_prompt::config::ModelConfig;
use geo_prompt::{StructuredDataGenerator, classify, geojson, process_prompt};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geo_query")]
#[command(about = "Classify a geographic prompt and generate structured map data", long_about = None)]
struct Cli {
    /// Natural-language prompt, e.g. "Show the route from Boston to Chicago"
    prompt: String,

    /// Print a GeoJSON FeatureCollection instead of the raw record
    #[arg(long)]
    geojson: bool,

    /// Only run the local classifier, no model call
    #[arg(long)]
    classify_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geo_prompt=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.classify_only {
        let analysis = classify(&cli.prompt);
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let config = ModelConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    let generator = StructuredDataGenerator::from_config(&config)?;

    let processed = match process_prompt(&generator, &cli.prompt).await {
        Ok(processed) => processed,
        Err(e) => {
            if let Some(content) = e.content() {
                eprintln!("Model output:\n{}", content);
            }
            return Err(e.into());
        }
    };

    let output = if cli.geojson {
        geojson::to_feature_collection(&processed.query)
    } else {
        serde_json::to_value(&processed)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
