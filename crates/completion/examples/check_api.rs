//! Quick check that the configured completion endpoint accepts our requests.
//!
//! Run with: cargo run -p completion --example check_api
//!
//! Make sure to set environment variables in .env:
//!   OPENAI_API_KEY - API key for authentication
//!   MODEL_NAME     - optional, defaults to gpt-5-mini

use completion::{
    ChatMessage, CompletionClient, CompletionOptions, ModelProfile, ReasoningEffort, Verbosity,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = match CompletionClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let profile = client.profile();
    println!("API key found");
    println!("Testing model: {} ({:?})", client.config().model, profile);

    let options = CompletionOptions::new()
        .max_tokens(50)
        .verbosity(Verbosity::Low)
        .reasoning_effort(ReasoningEffort::Low);

    let messages = vec![
        ChatMessage::system("You are a helpful assistant."),
        ChatMessage::user("Say 'API test successful' in 5 words or less."),
    ];

    let request = client.build_request(messages.clone(), &options);
    println!("Request body: {}", serde_json::to_string_pretty(&request)?);

    println!("\nTesting API call...");
    match client.complete(messages, options).await {
        Ok(text) => {
            println!("API call successful!");
            println!("Response: {}", text);
        }
        Err(e) => {
            eprintln!("API call failed: {}", e);
            if profile == ModelProfile::Standard {
                eprintln!("Hint: try MODEL_NAME=gpt-5-mini or gpt-4-turbo-preview");
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
