//! Placement of a candidate word onto the player's tiles.
//!
//! A word of length `m` with `k` extensions is laid out on `n = m + k` positions: the word keeps its
//! letter order and the remaining positions are filled with blank tiles. Every such layout (a
//! *permutation*) is filled from a private copy of the inventory, and the fillable layouts are
//! scored with a tiered score where each tier outweighs everything below it.

use crate::tile::{Font, Inventory, TileKey, BLANK, JOKER};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marks an extension position in a permutation
pub const FILLER: char = '_';

const TIER_9: f64 = 1e9;
const TIER_7: f64 = 1e8;
const TIER_5: f64 = 1e7;
const LEFTOVER_JOKER: f64 = 1e6;
const LEFTOVER_BLANK: f64 = 1e5;
const LEFTOVER_BOLD: f64 = 1e4;
const LETTER_SCALE: f64 = 1e-2;
const FILLER_SCALE: f64 = 1e-4;

const PRIORITY_FONTS: [Font; 5] = [
    Font::Bold,
    Font::Underscore,
    Font::Italic,
    Font::Special,
    Font::Regular,
];
const HIGH_FONTS: [Font; 5] = [
    Font::Underscore,
    Font::Italic,
    Font::Special,
    Font::Regular,
    Font::Bold,
];
const LOW_FONTS: [Font; 5] = [
    Font::Italic,
    Font::Underscore,
    Font::Special,
    Font::Regular,
    Font::Bold,
];

/// Tile placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// No placement at all, only raw dictionary words
    None,
    /// Bold tiles go to positions 9 and 7 (1-based)
    Bold97,
    /// Bold tiles go to positions 9, 7 and 5 (1-based)
    Bold975,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::None => "none",
            Strategy::Bold97 => "bold97",
            Strategy::Bold975 => "bold975",
        }
    }

    /// 0-based positions filled first, with bold tiles preferred
    fn priority_positions(self) -> &'static [usize] {
        match self {
            Strategy::None => &[],
            Strategy::Bold97 => &[8, 6],
            Strategy::Bold975 => &[8, 6, 4],
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Strategy::None),
            "bold97" => Ok(Strategy::Bold97),
            "bold975" => Ok(Strategy::Bold975),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

/// Letter value of a tile
pub fn letter_points(letter: char) -> u32 {
    match letter.to_ascii_uppercase() {
        'A' | 'E' | 'I' | 'L' | 'N' | 'O' | 'R' | 'S' | 'T' | 'U' => 1,
        'D' | 'G' => 2,
        'B' | 'C' | 'M' | 'P' => 3,
        'F' | 'H' | 'V' | 'W' | 'Y' => 4,
        'K' => 5,
        'J' | 'X' => 8,
        'Q' | 'Z' | JOKER | BLANK => 10,
        _ => 0,
    }
}

/// A word laid out on tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// The word with [FILLER] at extension positions
    pub permutation: String,
    /// The tile used at each position
    pub slots: Vec<TileKey>,
    /// Tiles not used
    pub leftover: Vec<TileKey>,
    pub score: f64,
}

/// All layouts of `word` with `extensions` filler positions, in generation order.
///
/// The word positions are chosen as `C(n, len(word))` subsets in lexicographic order, so the
/// first permutation has all fillers at the end.
///
/// ```
/// # use tileword::generate_permutations;
/// assert_eq!(generate_permutations("ab", 1), vec!["ab_", "a_b", "_ab"]);
/// ```
pub fn generate_permutations(word: &str, extensions: usize) -> Vec<String> {
    let letters: Vec<char> = word.chars().collect();
    let n = letters.len() + extensions;
    let mut result = Vec::new();
    let mut chosen = Vec::with_capacity(letters.len());
    combinations(n, letters.len(), 0, &mut chosen, &mut |positions| {
        let mut perm = vec![FILLER; n];
        for (&pos, &c) in positions.iter().zip(letters.iter()) {
            perm[pos] = c;
        }
        result.push(perm.into_iter().collect());
    });
    result
}

fn combinations<F: FnMut(&[usize])>(
    n: usize,
    k: usize,
    start: usize,
    chosen: &mut Vec<usize>,
    emit: &mut F,
) {
    if chosen.len() == k {
        emit(chosen);
        return;
    }
    let remaining = k - chosen.len();
    for i in start..=(n - remaining) {
        chosen.push(i);
        combinations(n, k, i + 1, chosen, emit);
        chosen.pop();
    }
}

/// Order in which positions are filled, each with the font preference for that position.
fn fill_order(n: usize, strategy: Strategy) -> Vec<(usize, &'static [Font; 5])> {
    let priority: Vec<usize> = strategy
        .priority_positions()
        .iter()
        .copied()
        .filter(|&p| p < n)
        .collect();
    let mut order: Vec<(usize, &'static [Font; 5])> =
        priority.iter().map(|&p| (p, &PRIORITY_FONTS)).collect();
    for pos in (0..n).rev() {
        if priority.contains(&pos) {
            continue;
        }
        let fonts = if pos >= 4 { &HIGH_FONTS } else { &LOW_FONTS };
        order.push((pos, fonts));
    }
    order
}

/// Assign one tile to every position of `permutation`.
///
/// Filler positions take a blank tile. A letter takes the first font in the position's preference
/// list that has a tile with that letter, else a joker. Returns the tile per position and the
/// leftover tiles, or `None` when some position can not be filled.
pub fn fill_permutation(
    permutation: &str,
    inventory: &Inventory,
    strategy: Strategy,
) -> Option<(Vec<TileKey>, Inventory)> {
    let chars: Vec<char> = permutation.chars().collect();
    if inventory.len() < chars.len() {
        return None;
    }
    let mut remaining = inventory.clone();
    let mut slots: Vec<Option<TileKey>> = vec![None; chars.len()];
    for (pos, fonts) in fill_order(chars.len(), strategy) {
        let c = chars[pos];
        let tile = if c == FILLER {
            remaining.take(|&(_, l)| l == BLANK)?
        } else {
            let letter = c.to_ascii_uppercase();
            let by_font = fonts
                .iter()
                .find_map(|&font| remaining.take(|&t| t == (font, letter)));
            match by_font {
                Some(tile) => tile,
                None => remaining.take(|&(_, l)| l == JOKER)?,
            }
        };
        slots[pos] = Some(tile);
    }
    let slots = slots.into_iter().collect::<Option<Vec<_>>>()?;
    Some((slots, remaining))
}

/// Tiered score of a filled permutation.
///
/// From high to low: length 9 and a bold 9th tile, length 7 and a bold 7th tile, (bold975 only)
/// length 5 and a bold 5th tile, unused jokers, unused blanks, unused bold tiles, underscore tiles
/// by `2^index`, italic tiles by `n - index`, letter values, and early filler positions.
pub fn score_placement(
    permutation: &str,
    slots: &[TileKey],
    leftover: &Inventory,
    strategy: Strategy,
) -> f64 {
    let with_bold_tier = match strategy {
        Strategy::None => return 0.0,
        Strategy::Bold97 => false,
        Strategy::Bold975 => true,
    };
    let n = slots.len();
    let bold_at = |pos: usize| slots.get(pos).map_or(false, |&(f, _)| f == Font::Bold);
    let mut score = 0.0;
    if n >= 9 {
        score += TIER_9;
        if bold_at(8) {
            score += TIER_9;
        }
    }
    if n >= 7 {
        score += TIER_7;
        if bold_at(6) {
            score += TIER_7;
        }
    }
    if with_bold_tier && n >= 5 {
        score += TIER_5;
        if bold_at(4) {
            score += TIER_5;
        }
    }
    score += leftover.count_letter(JOKER) as f64 * LEFTOVER_JOKER;
    score += leftover.count_letter(BLANK) as f64 * LEFTOVER_BLANK;
    score += leftover.count_font(Font::Bold) as f64 * LEFTOVER_BOLD;

    for (index, &(font, letter)) in slots.iter().enumerate() {
        match font {
            Font::Underscore => score += 2f64.powi(index as i32),
            Font::Italic => score += (n - index) as f64,
            _ => {}
        }
        score += letter_points(letter) as f64 * LETTER_SCALE;
    }
    for (index, c) in permutation.chars().enumerate() {
        if c == FILLER {
            score += (n - index) as f64 * FILLER_SCALE;
        }
    }
    score
}

/// Best placement of `word` with exactly `extensions` filler positions.
///
/// Ties keep the first permutation generated. Returns `None` when no permutation can be filled.
pub fn solve_word(
    word: &str,
    inventory: &Inventory,
    extensions: usize,
    strategy: Strategy,
) -> Option<Placement> {
    let word = word.to_uppercase();
    let mut best: Option<Placement> = None;
    for permutation in generate_permutations(&word, extensions) {
        let (slots, leftover) = match fill_permutation(&permutation, inventory, strategy) {
            Some(filled) => filled,
            None => continue,
        };
        let score = score_placement(&permutation, &slots, &leftover, strategy);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Placement {
                permutation,
                slots,
                leftover: leftover.0,
                score,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn inv(tiles: &[(Font, char)]) -> Inventory {
        Inventory::new(tiles.to_vec())
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn test_generate_permutations_count_and_order() {
        for (word, k) in &[("cat", 0), ("cat", 2), ("tiles", 3), ("a", 4), ("abcdefgh", 2)] {
            let perms = generate_permutations(word, *k);
            let n = word.len() + k;
            assert_eq!(perms.len(), binomial(n, word.len()));
            let unique: HashSet<_> = perms.iter().collect();
            assert_eq!(unique.len(), perms.len());
            for p in &perms {
                assert_eq!(p.chars().count(), n);
                let kept: String = p.chars().filter(|&c| c != FILLER).collect();
                assert_eq!(&kept, word);
            }
        }
        assert_eq!(generate_permutations("cat", 0), vec!["cat"]);
        assert_eq!(generate_permutations("", 2), vec!["__"]);
    }

    #[test]
    fn test_fill_prefers_bold_at_priority_positions() {
        // 9 letters: position 8 must take the bold E, other positions avoid bold
        let inventory = inv(&[
            (Font::Regular, 'E'),
            (Font::Bold, 'E'),
            (Font::Regular, 'A'),
            (Font::Regular, 'B'),
            (Font::Regular, 'C'),
            (Font::Regular, 'D'),
            (Font::Regular, 'F'),
            (Font::Regular, 'G'),
            (Font::Regular, 'H'),
        ]);
        let (slots, leftover) = fill_permutation("ABCDFGHEE", &inventory, Strategy::Bold97).unwrap();
        assert_eq!(slots[8], (Font::Bold, 'E'));
        assert_eq!(slots[7], (Font::Regular, 'E'));
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_fill_font_order_by_position() {
        let inventory = inv(&[
            (Font::Italic, 'A'),
            (Font::Underscore, 'A'),
            (Font::Italic, 'A'),
            (Font::Underscore, 'A'),
            (Font::Regular, 'A'),
        ]);
        let (slots, leftover) = fill_permutation("AAAAA", &inventory, Strategy::Bold97).unwrap();
        // position 4 first (underscore first), then 3..0 (italic first)
        assert_eq!(slots[4], (Font::Underscore, 'A'));
        assert_eq!(slots[3], (Font::Italic, 'A'));
        assert_eq!(slots[2], (Font::Italic, 'A'));
        assert_eq!(slots[1], (Font::Underscore, 'A'));
        assert_eq!(slots[0], (Font::Regular, 'A'));
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_fill_joker_and_blank() {
        let inventory = inv(&[
            (Font::Regular, 'C'),
            (Font::Special, JOKER),
            (Font::Regular, BLANK),
            (Font::Regular, 'T'),
        ]);
        let (slots, leftover) = fill_permutation("CAT_", &inventory, Strategy::Bold97).unwrap();
        assert_eq!(
            slots,
            vec![
                (Font::Regular, 'C'),
                (Font::Special, JOKER),
                (Font::Regular, 'T'),
                (Font::Regular, BLANK)
            ]
        );
        assert!(leftover.is_empty());

        // a joker never fills an extension position
        let inventory = inv(&[
            (Font::Regular, 'C'),
            (Font::Regular, 'A'),
            (Font::Regular, 'T'),
            (Font::Special, JOKER),
        ]);
        assert!(fill_permutation("CAT_", &inventory, Strategy::Bold97).is_none());
    }

    #[test]
    fn test_fill_leaves_inventory_untouched() {
        let inventory = inv(&[(Font::Regular, 'C'), (Font::Regular, 'A')]);
        let before = inventory.clone();
        assert!(fill_permutation("CAT", &inventory, Strategy::Bold97).is_none());
        assert!(fill_permutation("CA", &inventory, Strategy::Bold97).is_some());
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_fill_is_deterministic() {
        let inventory = inv(&[
            (Font::Bold, 'S'),
            (Font::Italic, 'T'),
            (Font::Underscore, 'A'),
            (Font::Special, JOKER),
            (Font::Regular, 'R'),
            (Font::Bold, BLANK),
            (Font::Regular, 'E'),
        ]);
        for strategy in &[Strategy::Bold97, Strategy::Bold975] {
            let first = fill_permutation("STAR_E", &inventory, *strategy);
            for _ in 0..10 {
                assert_eq!(fill_permutation("STAR_E", &inventory, *strategy), first);
            }
        }
    }

    #[test]
    fn test_cat_scores_letter_points_only() {
        let inventory = inv(&[(Font::Regular, 'C'), (Font::Regular, 'A'), (Font::Regular, 'T')]);
        let placement = solve_word("cat", &inventory, 0, Strategy::Bold97).unwrap();
        assert_eq!(placement.permutation, "CAT");
        assert!(placement.slots.iter().all(|&(f, _)| f == Font::Regular));
        assert!(placement.leftover.is_empty());
        let expected = (3 + 1 + 1) as f64 * 1e-2;
        assert!((placement.score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_missing_letter_is_infeasible() {
        let inventory = inv(&[
            (Font::Regular, 'C'),
            (Font::Regular, 'A'),
            (Font::Regular, BLANK),
            (Font::Regular, 'X'),
        ]);
        assert!(solve_word("cat", &inventory, 0, Strategy::Bold97).is_none());
        assert!(solve_word("cat", &inventory, 1, Strategy::Bold97).is_none());
    }

    #[test]
    fn test_solve_prefers_early_filler_on_tie() {
        let inventory = inv(&[(Font::Regular, 'A'), (Font::Regular, 'B'), (Font::Regular, BLANK)]);
        let placement = solve_word("ab", &inventory, 1, Strategy::Bold97).unwrap();
        // filler weight n - index is largest at index 0
        assert_eq!(placement.permutation, "_AB");
    }

    #[test]
    fn test_solve_tie_keeps_first_permutation() {
        let inventory = inv(&[(Font::Regular, 'A'), (Font::Regular, 'A')]);
        let placement = solve_word("aa", &inventory, 0, Strategy::Bold97).unwrap();
        assert_eq!(placement.permutation, "AA");
        assert_eq!(placement.slots, vec![(Font::Regular, 'A'); 2]);
    }

    #[test]
    fn test_solve_picks_bold_ninth_position() {
        // 8 letter word + 1 extension: the bold S can only land on position 8 if the word ends there
        let mut tiles: Vec<TileKey> = "PLAYERS"
            .chars()
            .map(|c| (Font::Regular, c))
            .collect();
        tiles.push((Font::Bold, 'S'));
        tiles.push((Font::Regular, BLANK));
        let inventory = Inventory::new(tiles);
        let placement = solve_word("playerss", &inventory, 1, Strategy::Bold97).unwrap();
        assert_eq!(placement.slots.len(), 9);
        assert_eq!(placement.slots[8], (Font::Bold, 'S'));
        assert!(placement.score >= 2e9);
        assert!(!placement.permutation.ends_with(FILLER));
    }

    #[test]
    fn test_bold975_tier() {
        let inventory = inv(&[
            (Font::Regular, 'H'),
            (Font::Regular, 'O'),
            (Font::Regular, 'U'),
            (Font::Regular, 'S'),
            (Font::Bold, 'E'),
        ]);
        let p97 = solve_word("house", &inventory, 0, Strategy::Bold97).unwrap();
        let p975 = solve_word("house", &inventory, 0, Strategy::Bold975).unwrap();
        assert_eq!(p975.slots[4], (Font::Bold, 'E'));
        assert!(p975.score >= 2e7);
        assert!(p97.score < 1e7);
    }

    #[test]
    fn test_none_strategy_scores_nothing() {
        let inventory = inv(&[(Font::Bold, 'A')]);
        let (slots, leftover) = fill_permutation("A", &inventory, Strategy::None).unwrap();
        assert_eq!(score_placement("A", &slots, &leftover, Strategy::None), 0.0);
    }

    #[test]
    fn test_score_tiers_do_not_collide() {
        // a full inventory of 15 tiles, all left over, is the worst case for the lower tiers
        const MAX_TILES: f64 = 15.0;
        let n = 10usize;
        let positional_max: f64 = (0..n).map(|i| 2f64.powi(i as i32)).sum::<f64>();
        let italic_max: f64 = (0..n).map(|i| (n - i) as f64).sum::<f64>();
        let letters_max = n as f64 * 10.0 * LETTER_SCALE;
        let filler_max: f64 = (0..n).map(|i| (n - i) as f64 * FILLER_SCALE).sum::<f64>();
        let per_position = positional_max + italic_max + letters_max + filler_max;
        let leftover_max = MAX_TILES * (LEFTOVER_JOKER + LEFTOVER_BLANK + LEFTOVER_BOLD);

        let below_5 = leftover_max + per_position;
        let below_7 = 2.0 * TIER_5 + below_5;
        let below_9 = 2.0 * TIER_7 + below_7;
        assert!(below_9 < TIER_9);
        assert!(below_7 < TIER_7);

        // the 5 tier needs 5 placed tiles, so at most 10 are left over; the strict bound holds
        // for 9, a tenth unused joker equals one unit of the 5 tier
        const MAX_LEFTOVER: f64 = 9.0;
        assert!(MAX_LEFTOVER * LEFTOVER_JOKER + per_position < TIER_5);
        assert!((MAX_LEFTOVER + 1.0) * LEFTOVER_JOKER >= TIER_5);
        // leftover tiles are either a joker, a blank or a plain tile, counted once
        assert!(MAX_LEFTOVER * LEFTOVER_BLANK + per_position < LEFTOVER_JOKER);
        assert!(MAX_LEFTOVER * LEFTOVER_BOLD + per_position < LEFTOVER_BLANK);
        // one leftover bold tile outweighs every per-position term
        assert!(per_position < LEFTOVER_BOLD);
        // all filler terms together stay below one letter point
        assert!(filler_max < LETTER_SCALE);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("bold975".parse::<Strategy>().unwrap(), Strategy::Bold975);
        assert!(matches!(
            "bold".parse::<Strategy>(),
            Err(Error::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_letter_points() {
        let word: u32 = "QUIZ".chars().map(letter_points).sum();
        assert_eq!(word, 22);
        assert_eq!(letter_points(JOKER), 10);
        assert_eq!(letter_points(BLANK), 10);
    }
}
