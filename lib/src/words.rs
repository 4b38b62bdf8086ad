//! From recognized tiles to a ranked list of words.

use crate::dictionary::{CandidateSource, Dictionary};
use crate::recognizer::Analysis;
use crate::solver::{solve_word, Placement, Strategy};
use crate::tile::{Inventory, BLANK};
use crate::Error;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Shortest word length queried when ranking placements
pub const MIN_RANKED_LENGTH: usize = 5;

/// Default number of dictionary queries in flight
pub const CONCURRENCY: usize = 5;

/// Result of [WordFinder::get_words]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Words {
    /// Raw dictionary words per length, for [Strategy::None]
    ByLength(BTreeMap<usize, Vec<String>>),
    /// All placements, best first
    Ranked(Vec<Placement>),
}

impl Words {
    /// The ranked permutations, best first. Empty for raw word lists.
    pub fn rank(&self) -> Vec<&str> {
        match self {
            Words::ByLength(_) => Vec::new(),
            Words::Ranked(placements) => placements.iter().map(|p| p.permutation.as_str()).collect(),
        }
    }
}

/// Place every candidate word with every possible number of extensions and rank all successful
/// placements in one list, best first.
///
/// The number of extensions is bounded by the blank tiles in `inventory` and by `max_length`.
pub fn rank_words(
    words: &BTreeMap<usize, Vec<String>>,
    inventory: &Inventory,
    max_length: usize,
    strategy: Strategy,
) -> Vec<Placement> {
    let budget = inventory.count_letter(BLANK);
    let mut pool = Vec::new();
    let mut attempts = 0;
    for word in words.values().flatten() {
        let extensions = budget.min(max_length.saturating_sub(word.chars().count()));
        for k in 0..=extensions {
            attempts += 1;
            if let Some(placement) = solve_word(word, inventory, k, strategy) {
                pool.push(placement);
            }
        }
    }
    debug!("{} of {} placements feasible", pool.len(), attempts);
    pool.sort_by(|a, b| b.score.total_cmp(&a.score));
    pool
}

/// Looks up candidate words for recognized tiles and ranks their placements.
pub struct WordFinder<S> {
    source: S,
    concurrency: usize,
}

#[cfg(feature = "qat")]
impl WordFinder<crate::dictionary::Retry<crate::dictionary::QatClient>> {
    /// A finder backed by the QAT service, with the retry and concurrency settings of `config`.
    pub fn from_config(config: &crate::config::Config) -> Self {
        let source = crate::dictionary::Retry::new(
            crate::dictionary::QatClient::default(),
            config.fetch_attempts,
            config.fetch_delay(),
        );
        WordFinder::new(source).with_concurrency(config.concurrency)
    }
}

impl<S: CandidateSource + Sync> WordFinder<S> {
    pub fn new(source: S) -> WordFinder<S> {
        WordFinder {
            source,
            concurrency: CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Query every length in `lengths`, at most `concurrency` at a time.
    ///
    /// A failed query is logged and gives an empty list; the other lengths are not affected.
    /// # Errors
    /// The worker pool can not be created.
    pub fn lookup_all(
        &self,
        lengths: RangeInclusive<usize>,
        pattern: &str,
        dictionary: Dictionary,
    ) -> Result<BTreeMap<usize, Vec<String>>, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()?;
        let results: Vec<(usize, Vec<String>)> = pool.install(|| {
            lengths
                .into_par_iter()
                .map(|length| {
                    let words = match self.source.lookup(length, pattern, dictionary) {
                        Ok(words) => words,
                        Err(err) => {
                            warn!("No words of length {}: {}", length, err);
                            Vec::new()
                        }
                    };
                    debug!("length {}: {} words", length, words.len());
                    (length, words)
                })
                .collect()
        });
        Ok(results.into_iter().collect())
    }

    /// Candidate words for the tiles in `analysis`.
    ///
    /// With [Strategy::None] the raw word lists of lengths `1..=max_length` are returned. Otherwise
    /// lengths from [MIN_RANKED_LENGTH] are queried and all placements are ranked in one list.
    pub fn get_words(
        &self,
        analysis: &Analysis,
        dictionary: Dictionary,
        strategy: Strategy,
    ) -> Result<Words, Error> {
        let inventory = analysis.inventory();
        let pattern = inventory.pattern();
        let max_length = analysis.max_length;
        let min_length = match strategy {
            Strategy::None => 1,
            Strategy::Bold97 | Strategy::Bold975 => MIN_RANKED_LENGTH,
        };
        info!(
            "Looking up {}..={} letter words for {} in {}",
            min_length, max_length, pattern, dictionary
        );
        let words = self.lookup_all(min_length..=max_length, &pattern, dictionary)?;
        match strategy {
            Strategy::None => Ok(Words::ByLength(words)),
            Strategy::Bold97 | Strategy::Bold975 => {
                let ranked = rank_words(&words, &inventory, max_length, strategy);
                info!("{} ranked placements", ranked.len());
                Ok(Words::Ranked(ranked))
            }
        }
    }
}
