//! Analyze a GitHub repository and print the learning digest.
//!
//! Run with: cargo run -p ingest --example analyze_repo -- https://github.com/karpathy/micrograd
//!
//! Optional environment variables in .env:
//!   GITHUB_ACCESS_TOKEN - raises the API rate limit

use ingest::{learning_content, GitHubFetcher};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = env::args()
        .nth(1)
        .unwrap_or_else(|| "https://github.com/karpathy/micrograd".to_string());

    let fetcher = GitHubFetcher::from_env()?;
    println!("Authenticated: {}", fetcher.is_authenticated());
    println!("Analyzing {}...\n", url);

    let analysis = fetcher.analyze_repository(&url).await?;

    println!("=== {} ({} stars) ===", analysis.name, analysis.stars);
    println!("Key files: {}", analysis.key_files.len());
    println!("Structure:\n{}\n", analysis.structure.summary(20));
    println!("=== Learning digest ===");
    println!("{}", learning_content(&analysis));

    Ok(())
}
