//! A library that reads the letter tiles from a word game screenshot and ranks dictionary words
//! placed onto them.
//!
//! Recognition finds the coloured tile regions of a screenshot and matches each one against a
//! small library of letter templates. Every template name carries a font class (`regular`,
//! `bold`, `italic`, `underscore`, `special`) and a letter, a joker `*` or a blank `!`.
//! The recognized tiles are then used to look up candidate words, and each word is laid out on
//! the tiles in the way that scores best.
//!
//! # Basic usage
//! ```no_run
//! # use tileword::{Config, Dictionary, Error, Recognizer, Strategy, WordFinder};
//! let config = Config::default().with_template_dir("templates");
//! let recognizer = Recognizer::from_config(config.clone())?;
//! let analysis = recognizer.analyze("screenshot.png")?;
//! println!("Tiles: {}", analysis.inventory());
//!
//! let finder = WordFinder::from_config(&config);
//! let words = finder.get_words(&analysis, Dictionary::Yawl, Strategy::Bold97)?;
//! for permutation in words.rank().iter().take(10) {
//!     println!("{}", permutation);
//! }
//! # Ok::<(), Error>(())
//! ```
//!
//! In a permutation `_` marks a position filled with a blank tile:
//!
//! ```text
//! _STARTERS
//! STARTERS_
//! ```

mod config;
mod dictionary;
mod error;
mod layout;
mod recognizer;
mod solver;
mod templates;
mod tile;
mod utils;
mod words;

pub use config::Config;
#[cfg(feature = "qat")]
pub use dictionary::{QatClient, QAT_URL};
pub use dictionary::{
    encode_pattern, parse_response, query_pattern, CandidateSource, Dictionary, Retry,
};
pub use error::Error;
pub use layout::{category_colors, Color, Extent, Layout, Margins, Region, RegionFilter};
pub use recognizer::{
    ink_mask, max_length_from_slots, similarity, Analysis, Match, Recognizer, TileRegion,
};
pub use solver::{
    fill_permutation, generate_permutations, letter_points, score_placement, solve_word,
    Placement, Strategy, FILLER,
};
pub use templates::{parse_template_name, Template, TemplateLibrary};
pub use tile::{BBox, Category, Font, Inventory, Tile, TileKey, BLANK, JOKER};
pub use utils::{annotate, collage, save_preview};
pub use words::{rank_words, WordFinder, Words};
