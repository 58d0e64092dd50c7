// gemcache - Gemini context caching client and memoizing proxy
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use gemcache::cli::{Args, ClientCommand, Command};
use gemcache::config::{AppConfig, API_KEY_ENV};
use gemcache::demo::{self, DemoOptions};
use gemcache::gemini::{default_generation_options, CachedContent, CachedContentApi, GeminiClient};
use gemcache::recommend;
use gemcache::server::create_router;
use gemcache::utils::logging::{self, mask_secret};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags win
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.gemini.default_model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.gemini.timeout_seconds = timeout;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gemcache v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Check => check(&config),
        Command::Config => print_config(&config),
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            config.server.host = host.unwrap_or(config.server.host);
            config.server.port = port.unwrap_or(config.server.port);
            config.server.static_dir = static_dir.or(config.server.static_dir);
            serve(config).await
        }
        Command::Client(command) => {
            // Phase 3: Build the API client; fails fast without a key
            let client = GeminiClient::new(&config.gemini)?;
            run_client_command(&client, command).await
        }
    }
}

async fn run_client_command(client: &GeminiClient, command: ClientCommand) -> Result<()> {
    let model = client.default_model().to_string();

    match command {
        ClientCommand::Demo { cleanup } => {
            println!("=== Gemini API Context Caching Demo ===");
            let report = demo::run_caching_demo(client, &DemoOptions { model, cleanup })
                .await
                .context("Error in cache demo")?;

            println!("\nCreated cached content: {}", report.cache_name);
            println!("Expires: {}", format_expiry(report.expire_time));
            println!("Cached contents listed: {}", report.listed);
            for (i, timed) in report.answers.iter().enumerate() {
                println!("\nPrompt: '{}'", timed.prompt);
                println!("\nResponse:\n{}", timed.answer.text);
                println!("Query {} time: {:.2} seconds", i + 1, timed.elapsed.as_secs_f64());
            }
            println!(
                "\nUpdated expiry time to: {}",
                format_expiry(report.extended_expire_time)
            );
            if report.deleted {
                println!("Deleted {}", report.cache_name);
            }
            println!("\n=== Demo completed ===");
        }
        ClientCommand::Create {
            text,
            file,
            ttl,
            display_name,
        } => {
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };
            anyhow::ensure!(!content.trim().is_empty(), "Nothing to cache");

            let display_name = display_name.unwrap_or_else(|| {
                format!("gemcache {}", chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S"))
            });
            let cached = client
                .create_cached_content(&content, &model, ttl, &display_name)
                .await?;
            print_cached(&cached);
        }
        ClientCommand::List => {
            let all = client.list_cached_contents().await?;
            if all.is_empty() {
                println!("No cached contents");
            }
            for cached in &all {
                print_cached(cached);
            }
        }
        ClientCommand::Get { name } => {
            let cached = client.get_cached_content(&name).await?;
            println!("{}", serde_json::to_string_pretty(&cached)?);
        }
        ClientCommand::Generate {
            prompt,
            cache,
            options,
        } => {
            let options = options.over(default_generation_options());
            let start = std::time::Instant::now();
            let answer = match cache {
                Some(name) => {
                    client
                        .generate_with_cached_content(&name, &prompt, &options)
                        .await?
                }
                None => client.generate_content(&model, &prompt, &options).await?,
            };
            println!("{}", answer.text);
            if let Some(usage) = answer.usage {
                info!(
                    "Tokens: prompt={:?} cached={:?} output={:?}",
                    usage.prompt_token_count,
                    usage.cached_content_token_count,
                    usage.candidates_token_count
                );
            }
            info!("Query time: {:.2} seconds", start.elapsed().as_secs_f64());
        }
        ClientCommand::UpdateTtl { name, ttl } => {
            let updated = client.update_expiry(&name, ttl).await?;
            println!("Updated expiry time to: {}", format_expiry(updated.expire_time));
        }
        ClientCommand::Delete { name } => {
            client.delete_cached_content(&name).await?;
            println!("Deleted successfully");
        }
        ClientCommand::Story => {
            let story = demo::generate_story(client, &model).await?;
            println!("\n----- GENERATED STORY -----\n");
            println!("{}", story.text);
            println!("\n----- END OF STORY -----\n");
        }
        ClientCommand::Recommend => recommend_interactive(client, &model).await?,
    }

    Ok(())
}

async fn recommend_interactive(client: &GeminiClient, model: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Enter your favorite movie genres (comma-separated): ");
    let movie_genres = lines.next_line().await?.unwrap_or_default();
    println!("Enter your favorite music genres (comma-separated): ");
    let music_genres = lines.next_line().await?.unwrap_or_default();
    println!("Enter any additional preferences (optional): ");
    let additional = lines.next_line().await?;

    let prompt =
        recommend::recommendation_prompt(&movie_genres, &music_genres, additional.as_deref());
    let answer = client
        .generate_content(model, &prompt, &default_generation_options())
        .await?;

    println!("\n----- MOVIE RECOMMENDATIONS -----\n");
    println!("{}", answer.text);
    println!("\n----- END OF RECOMMENDATIONS -----\n");

    let recs = recommend::parse_recommendations(&answer.text);
    info!(
        "Parsed {} recommendations, {:.0}% with a release year",
        recs.len(),
        recommend::year_format_ratio(&recs) * 100.0
    );
    Ok(())
}

fn check(config: &AppConfig) -> Result<()> {
    println!("gemcache v{}", env!("CARGO_PKG_VERSION"));
    println!("API base: {}", config.gemini.api_base_url);
    println!("Model: {}", config.gemini.default_model);

    if config.gemini.api_key.trim().is_empty() {
        println!("❌ Error: {} not found in environment or .env file", API_KEY_ENV);
    } else {
        println!("✅ API key loaded: {}", mask_secret(&config.gemini.api_key));
    }
    Ok(())
}

fn print_config(config: &AppConfig) -> Result<()> {
    let mut shown = config.clone();
    if !shown.gemini.api_key.is_empty() {
        shown.gemini.api_key = mask_secret(&shown.gemini.api_key);
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    let gemini_client = GeminiClient::new(&config.gemini)?;

    let app = create_router(&config, gemini_client)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}/", addr);
    info!("API proxy available at http://{}/api/gemini", addr);
    info!("Cache statistics available at http://{}/api/cache-stats", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

fn print_cached(cached: &CachedContent) {
    println!(
        "- {}: {} (Expires: {})",
        cached.name,
        cached.display_name.as_deref().unwrap_or("<no display name>"),
        format_expiry(cached.expire_time)
    );
}

fn format_expiry(expire_time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    expire_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
