// CLI module for gemcache
// Author: kelexine (https://github.com/kelexine)

use crate::gemini::GenerationOptions;
use crate::utils::duration::parse_ttl;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// gemcache - Gemini context caching and content generation from the command line
#[derive(Parser, Debug)]
#[command(name = "gemcache", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.gemcache/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model used for generation and new caches
    #[arg(long, global = true, env = "GEMCACHE_MODEL")]
    pub model: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Client(ClientCommand),

    /// Check that the API key and configuration are in place
    Check,

    /// Print the effective configuration
    Config,

    /// Run the local memoizing proxy
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Serve files from this directory for non-API paths
        #[arg(long)]
        static_dir: Option<String>,
    },
}

/// Commands that talk to the Gemini API and need a credential.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Walk through create, list, query, extend and (optionally) delete
    Demo {
        /// Delete the cached content at the end
        #[arg(long)]
        cleanup: bool,
    },

    /// Cache text (from --text, --file or stdin) on the service
    Create {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,

        /// Lifetime, e.g. "86400s" or "3600"
        #[arg(long, default_value = "86400s", value_parser = ttl_arg)]
        ttl: Duration,

        #[arg(long)]
        display_name: Option<String>,
    },

    /// List cached contents
    List,

    /// Show one cached content
    Get { name: String },

    /// Generate text, optionally on top of a cached content
    Generate {
        prompt: String,

        /// Cached content name or id
        #[arg(long)]
        cache: Option<String>,

        #[command(flatten)]
        options: GenerationArgs,
    },

    /// Replace the TTL of a cached content
    UpdateTtl {
        name: String,

        #[arg(long, default_value = "604800s", value_parser = ttl_arg)]
        ttl: Duration,
    },

    /// Delete a cached content
    Delete { name: String },

    /// Generate a short story
    Story,

    /// Ask for movie recommendations based on your tastes (interactive)
    Recommend,
}

/// Sampling options; unset fields fall back to the demo defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub top_p: Option<f32>,

    #[arg(long)]
    pub top_k: Option<u32>,

    #[arg(long)]
    pub max_output_tokens: Option<u32>,
}

impl GenerationArgs {
    pub fn over(&self, defaults: GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
            max_output_tokens: self.max_output_tokens.or(defaults.max_output_tokens),
        }
    }
}

fn ttl_arg(value: &str) -> Result<Duration, String> {
    parse_ttl(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::default_generation_options;

    #[test]
    fn test_parse_generate_command() {
        let args = Args::try_parse_from([
            "gemcache",
            "--timeout",
            "5",
            "generate",
            "Who is the main character?",
            "--cache",
            "cachedContents/abc123",
            "--temperature",
            "0.2",
        ])
        .unwrap();

        assert_eq!(args.timeout, Some(5));
        match args.command {
            Command::Client(ClientCommand::Generate {
                prompt,
                cache,
                options,
            }) => {
                assert_eq!(prompt, "Who is the main character?");
                assert_eq!(cache.as_deref(), Some("cachedContents/abc123"));
                let merged = options.over(default_generation_options());
                assert_eq!(merged.temperature, Some(0.2));
                assert_eq!(merged.top_k, Some(40));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ttl_defaults_and_validation() {
        let args = Args::try_parse_from(["gemcache", "update-ttl", "abc123"]).unwrap();
        match args.command {
            Command::Client(ClientCommand::UpdateTtl { ttl, .. }) => {
                assert_eq!(ttl, Duration::from_secs(604_800))
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Args::try_parse_from(["gemcache", "update-ttl", "abc123", "--ttl", "soon"]).is_err());
    }

    #[test]
    fn test_local_and_client_commands_share_one_level() {
        let serve = Args::try_parse_from(["gemcache", "serve", "--port", "8000"]).unwrap();
        assert!(matches!(serve.command, Command::Serve { port: Some(8000), .. }));

        let list = Args::try_parse_from(["gemcache", "list"]).unwrap();
        assert!(matches!(list.command, Command::Client(ClientCommand::List)));
    }
}
