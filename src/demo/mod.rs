//! Scripted walkthroughs of the Gemini API.
//!
//! `run_caching_demo` exercises the whole cached-content lifecycle and times
//! two queries against the same cache; `generate_story` is the one-shot
//! generation smoke test.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::Result;
use crate::gemini::{default_generation_options, CachedContentApi, GeneratedText, GenerationOptions};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Reference text cached by the demo.
pub const MOVIE_CONTENT: &str = "\
The Godfather is a 1972 American crime film directed by Francis Ford Coppola.
It stars Marlon Brando as the powerful patriarch of the Corleone crime family.
The story spans 10 years from 1945 to 1955, focusing on the transformation of
Michael Corleone from reluctant family outsider to ruthless mafia boss.

Key characters:
- Vito Corleone: The aging patriarch of the crime family
- Michael Corleone: Vito's youngest son who initially wanted nothing to do with the family business
- Sonny Corleone: The hot-headed eldest son
- Tom Hagen: The family's consigliere (advisor) and adopted son of Vito
- Kay Adams: Michael's girlfriend and eventual wife

The film is known for famous lines like \"I'm gonna make him an offer he can't refuse\"
and the iconic scene with the horse's head in a Hollywood producer's bed.
";

pub const DEMO_QUESTIONS: [&str; 2] = [
    "Who is the main character in this movie and what's their character arc?",
    "What are some of the famous quotes from this movie?",
];

pub const STORY_PROMPT: &str = "Tell me a story in 300 words.";

/// Initial cache lifetime: 24 hours.
pub const DEMO_TTL: Duration = Duration::from_secs(86_400);

/// Lifetime after the expiry update: 7 days.
pub const EXTENDED_TTL: Duration = Duration::from_secs(604_800);

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub model: String,
    /// Delete the cached content once the demo is done.
    pub cleanup: bool,
}

/// Outcome of one demo query.
#[derive(Debug, Clone)]
pub struct TimedAnswer {
    pub prompt: String,
    pub answer: GeneratedText,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct DemoReport {
    pub cache_name: String,
    pub listed: usize,
    pub answers: Vec<TimedAnswer>,
    pub expire_time: Option<DateTime<Utc>>,
    pub extended_expire_time: Option<DateTime<Utc>>,
    pub deleted: bool,
}

/// Run the full context-caching walkthrough.
///
/// Steps: create, list, two timed queries, extend expiry, optionally
/// delete. The first failing step aborts the rest and its error is returned.
pub async fn run_caching_demo(api: &dyn CachedContentApi, options: &DemoOptions) -> Result<DemoReport> {
    let display_name = format!(
        "Movie analysis cache {}",
        Utc::now().format("%Y-%m-%d-%H-%M-%S")
    );

    let cached = api
        .create_cached_content(MOVIE_CONTENT, &options.model, DEMO_TTL, &display_name)
        .await?;
    let cache_name = cached.name.clone();

    let all = api.list_cached_contents().await?;
    if !all.iter().any(|c| c.name == cache_name) {
        warn!("New cached content {} is not listed yet", cache_name);
    }

    let generation = default_generation_options();
    let mut answers = Vec::with_capacity(DEMO_QUESTIONS.len());
    for prompt in DEMO_QUESTIONS {
        let start = Instant::now();
        let answer = api
            .generate_with_cached_content(&cache_name, prompt, &generation)
            .await?;
        let elapsed = start.elapsed();
        info!("Query answered in {:.2} seconds", elapsed.as_secs_f64());

        answers.push(TimedAnswer {
            prompt: prompt.to_string(),
            answer,
            elapsed,
        });
    }

    let extended = api.update_expiry(&cache_name, EXTENDED_TTL).await?;

    if options.cleanup {
        api.delete_cached_content(&cache_name).await?;
    }

    Ok(DemoReport {
        cache_name,
        listed: all.len(),
        answers,
        expire_time: cached.expire_time,
        extended_expire_time: extended.expire_time,
        deleted: options.cleanup,
    })
}

/// Generate the 300-word story with the given model and service defaults.
pub async fn generate_story(api: &dyn CachedContentApi, model: &str) -> Result<GeneratedText> {
    api.generate_content(model, STORY_PROMPT, &GenerationOptions::default())
        .await
}
