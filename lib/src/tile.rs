use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter of a joker tile, it stands in for any letter.
pub const JOKER: char = '*';
/// Letter of a blank tile, it only fills extension positions.
pub const BLANK: char = '!';

/// Tile category, told apart by the tile background colour.
///
/// The declaration order is the iteration order used everywhere a tile inventory is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Regular,
    Improved,
    Special,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Regular, Category::Improved, Category::Special];

    /// Folder name in the template library
    pub fn name(self) -> &'static str {
        match self {
            Category::Regular => "Regular",
            Category::Improved => "Improved",
            Category::Special => "Special",
        }
    }

    /// Prefix of region ids, e.g. `R-1`
    pub fn initial(self) -> char {
        match self {
            Category::Regular => 'R',
            Category::Improved => 'I',
            Category::Special => 'S',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Visual weight or style of the letter on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
    Italic,
    Underscore,
    Special,
}

impl Font {
    pub fn name(self) -> &'static str {
        match self {
            Font::Regular => "regular",
            Font::Bold => "bold",
            Font::Italic => "italic",
            Font::Underscore => "underscore",
            Font::Special => "special",
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Font {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Font::Regular),
            "bold" => Ok(Font::Bold),
            "italic" => Ok(Font::Italic),
            "underscore" => Ok(Font::Underscore),
            "special" => Ok(Font::Special),
            _ => Err(Error::UnknownFont(s.to_string())),
        }
    }
}

/// Bounding box of a detected region, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> BBox {
        BBox {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// `width / height`, infinite for a zero height
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            f64::INFINITY
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// A recognized tile: where it is, what it shows and how sure we are.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub bbox: BBox,
    pub category: Category,
    pub font: Font,
    /// Uppercase letter, [JOKER] or [BLANK]
    pub letter: char,
    pub match_score: f64,
}

/// One `(font, letter)` entry of the tile inventory.
pub type TileKey = (Font, char);

/// The player's tiles in inventory order.
///
/// Solver attempts work on their own copy, the inventory itself is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory(pub Vec<TileKey>);

impl Inventory {
    pub fn new(tiles: Vec<TileKey>) -> Inventory {
        Inventory(tiles)
    }

    pub fn from_tiles<'a, I: IntoIterator<Item = &'a Tile>>(tiles: I) -> Inventory {
        Inventory(tiles.into_iter().map(|t| (t.font, t.letter)).collect())
    }

    pub fn tiles(&self) -> &[TileKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count_letter(&self, letter: char) -> usize {
        self.0.iter().filter(|&&(_, l)| l == letter).count()
    }

    pub fn count_font(&self, font: Font) -> usize {
        self.0.iter().filter(|&&(f, _)| f == font).count()
    }

    /// Remove and return the first tile matching `pred`.
    pub(crate) fn take<P: Fn(&TileKey) -> bool>(&mut self, pred: P) -> Option<TileKey> {
        let pos = self.0.iter().position(|t| pred(t))?;
        Some(self.0.remove(pos))
    }

    /// The dictionary query pattern: lowercase letters, jokers as `.`, blanks dropped.
    pub fn pattern(&self) -> String {
        self.0
            .iter()
            .filter_map(|&(_, letter)| match letter {
                BLANK => None,
                JOKER => Some('.'),
                c => Some(c.to_ascii_lowercase()),
            })
            .collect()
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.0.iter().map(|&(_, l)| l).collect::<String>();
        write!(f, "{}", s)
    }
}
