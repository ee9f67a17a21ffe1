use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::{DEFAULT_TEMPERATURE, GenerationRequest, TextGenerator};

/// Built-in corpus, one sentence per line.
const CORPUS: &str = "\
Nobody builds better walls than me, believe me.
The fake news media is working overtime tonight.
We are going to win so much you will get tired of winning.
Tremendous crowd tonight, the biggest crowd anyone has ever seen.
The failing newspaper got it totally wrong again.
Our economy is the best economy in the history of our country.
Many people are saying the deal was a total disaster.
Sad to see the ratings collapse at the failing network.
The best people are calling me to say thank you.
We will make lunch great again, and it will be beautiful.
Very unfair treatment from the media, but we are winning.
Nobody has ever seen numbers like these numbers, tremendous.
Covfefe is going to be the word of the year, believe me.
They said it could not be done and we did it anyway.
The crowd was amazing and the people love what we are doing.
";

/// Prompted or not, text ends once it has at least this many words and the
/// chain reaches the end of a sentence.
const MIN_WORDS: usize = 6;
const MAX_WORDS: usize = 40;

/// First-order word chain. Temperature is the chance, at every step, of
/// jumping to a random corpus word instead of following the chain.
pub struct MarkovGenerator {
    chain: HashMap<String, Vec<String>>,
    starts: Vec<String>,
    words: Vec<String>,
    rng: Mutex<StdRng>,
}

impl MarkovGenerator {
    pub fn new() -> Self {
        Self::from_corpus(CORPUS, StdRng::from_os_rng())
    }

    /// Reproducible output for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_corpus(CORPUS, StdRng::seed_from_u64(seed))
    }

    pub fn from_corpus(corpus: &str, rng: StdRng) -> Self {
        let mut chain: HashMap<String, Vec<String>> = HashMap::new();
        let mut starts = Vec::new();
        let mut words = Vec::new();

        for line in corpus.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if let Some(first) = tokens.first() {
                starts.push((*first).to_string());
            }
            for pair in tokens.windows(2) {
                chain
                    .entry(pair[0].to_string())
                    .or_default()
                    .push(pair[1].to_string());
            }
            words.extend(tokens.iter().map(|t| t.to_string()));
        }

        Self {
            chain,
            starts,
            words,
            rng: Mutex::new(rng),
        }
    }

    fn compose(&self, prompt: Option<&str>, temperature: f64) -> Result<String> {
        if self.starts.is_empty() {
            bail!("markov corpus is empty");
        }

        let jump = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 1.0)
        };
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| anyhow!("generator rng poisoned: {}", e))?;

        let mut out: Vec<String> = prompt
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        if out.is_empty() {
            out.extend(self.starts.choose(&mut *rng).cloned());
        }

        while out.len() < MAX_WORDS {
            let current = out.last().map(String::as_str).unwrap_or_default();
            let next = if rng.random_bool(jump) {
                self.words.choose(&mut *rng)
            } else {
                self.chain
                    .get(current)
                    .and_then(|successors| successors.choose(&mut *rng))
            };

            match next {
                Some(word) => out.push(word.clone()),
                None if out.len() < MIN_WORDS => {
                    out.extend(self.starts.choose(&mut *rng).cloned());
                }
                None => break,
            }
        }

        Ok(out.join(" "))
    }
}

impl Default for MarkovGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MarkovGenerator {
    fn name(&self) -> &str {
        "markov"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.compose(request.prompt.as_deref(), request.temperature_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: Option<&str>, temperature: Option<f64>) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.map(str::to_string),
            temperature,
        }
    }

    #[tokio::test]
    async fn same_seed_same_text() {
        let a = MarkovGenerator::with_seed(7);
        let b = MarkovGenerator::with_seed(7);
        let req = request(None, Some(0.3));

        let first = a.generate(&req).await.unwrap();
        assert_eq!(first, b.generate(&req).await.unwrap());
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn prompt_opens_the_text() {
        let generator = MarkovGenerator::with_seed(1);
        let text = generator
            .generate(&request(Some("The crowd"), None))
            .await
            .unwrap();
        assert!(text.starts_with("The crowd"));
        assert!(text.split_whitespace().count() >= MIN_WORDS);
    }

    #[tokio::test]
    async fn unknown_prompt_still_produces_text() {
        let generator = MarkovGenerator::with_seed(3);
        let text = generator
            .generate(&request(Some("zzyzx"), Some(0.0)))
            .await
            .unwrap();
        assert!(text.starts_with("zzyzx "));
        assert!(text.split_whitespace().count() >= MIN_WORDS);
    }

    #[tokio::test]
    async fn out_of_range_temperature_does_not_panic() {
        let generator = MarkovGenerator::with_seed(99);
        let text = generator.generate(&request(None, Some(9.9))).await.unwrap();
        let words = text.split_whitespace().count();
        assert!(words > 0 && words <= MAX_WORDS);
    }

    #[test]
    fn zero_temperature_follows_the_chain() {
        let generator = MarkovGenerator::with_seed(5);
        let text = generator.compose(None, 0.0).unwrap();
        let words: Vec<&str> = text.split_whitespace().collect();

        for pair in words.windows(2) {
            let follows = generator
                .chain
                .get(pair[0])
                .is_some_and(|next| next.iter().any(|w| w == pair[1]));
            let restarts = generator.starts.iter().any(|w| w == pair[1]);
            assert!(follows || restarts, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn empty_corpus_fails() {
        let generator = MarkovGenerator::from_corpus("", StdRng::seed_from_u64(0));
        assert!(generator.compose(None, 0.5).is_err());
    }
}
