pub mod classifier;
pub mod clients;
pub mod config;
pub mod error;
pub mod generator;
pub mod geojson;
pub mod prompts;
pub mod repair;
pub mod schemas;
pub mod validation;

use serde::Serialize;

pub use classifier::classify;
pub use error::{GenerationError, Result};
pub use generator::StructuredDataGenerator;
pub use schemas::{ProcessedQuery, QueryAnalysis, QueryType};

/// Classification plus the structured data generated for one prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedPrompt {
    pub analysis: QueryAnalysis,
    pub query: ProcessedQuery,
}

/// Run a prompt through classification and structured generation
pub async fn process_prompt(
    generator: &StructuredDataGenerator,
    prompt: &str,
) -> Result<ProcessedPrompt> {
    let analysis = classify(prompt);
    let query = generator.generate(prompt, &analysis).await?;
    Ok(ProcessedPrompt { analysis, query })
}
