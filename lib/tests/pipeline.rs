use anyhow::{Context, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tileword::{
    Analysis, CandidateSource, Category, Config, Dictionary, Error, Font, Recognizer, Strategy,
    WordFinder, Words, BLANK, JOKER,
};

const TILE: u32 = 60;
const BACKGROUND: [u8; 3] = [90, 90, 100];

type Glyph = &'static [(u32, u32, u32, u32)];

const GLYPH_C: Glyph = &[(10, 10, 8, 40)];
const GLYPH_A: Glyph = &[(10, 10, 40, 8)];
const GLYPH_T: Glyph = &[(26, 10, 8, 40)];
const GLYPH_S: Glyph = &[(10, 26, 40, 8)];
const GLYPH_JOKER: Glyph = &[(10, 10, 8, 8), (42, 42, 8, 8)];
const GLYPH_BLANK: Glyph = &[(26, 10, 8, 25), (26, 42, 8, 8)];

fn template(glyph: Glyph) -> GrayImage {
    let mut img = GrayImage::from_pixel(TILE, TILE, Luma([255u8]));
    for &(x, y, w, h) in glyph {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Luma([0u8]));
            }
        }
    }
    img
}

fn draw_tile(img: &mut RgbImage, x0: u32, y0: u32, color: [u8; 3], glyph: Glyph) {
    for y in 0..TILE {
        for x in 0..TILE {
            img.put_pixel(x0 + x, y0 + y, Rgb(color));
        }
    }
    for &(x, y, w, h) in glyph {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(x0 + xx, y0 + yy, Rgb([0, 0, 0]));
            }
        }
    }
}

fn write_templates(dir: &Path) -> Result<()> {
    let files: &[(&str, &str, Glyph)] = &[
        ("Regular", "regular_C.png", GLYPH_C),
        ("Regular", "regular_A.png", GLYPH_A),
        ("Regular", "regular_T.png", GLYPH_T),
        ("Improved", "bold_S.png", GLYPH_S),
        ("Improved", "bold_A.png", GLYPH_A),
        ("Special", "special_wildcard.png", GLYPH_JOKER),
        ("Special", "special_exclamation.png", GLYPH_BLANK),
    ];
    for &(category, name, glyph) in files {
        let folder = dir.join(category);
        fs::create_dir_all(&folder)?;
        template(glyph)
            .save(folder.join(name))
            .with_context(|| format!("Failed to save {}", name))?;
    }
    Ok(())
}

/// A 700x600 screenshot: ten empty board slots at the top, six tiles below half height.
fn screenshot() -> RgbImage {
    let mut img = RgbImage::from_pixel(700, 600, Rgb(BACKGROUND));
    for i in 0..10 {
        let x0 = 20 + i * 65;
        for y in 50..100 {
            for x in x0..x0 + 50 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
    }
    let regular = [241, 235, 223];
    draw_tile(&mut img, 50, 400, regular, GLYPH_C);
    draw_tile(&mut img, 150, 400, regular, GLYPH_A);
    draw_tile(&mut img, 250, 400, regular, GLYPH_T);
    draw_tile(&mut img, 350, 400, [186, 255, 137], GLYPH_S);
    draw_tile(&mut img, 450, 400, [253, 216, 75], GLYPH_JOKER);
    draw_tile(&mut img, 550, 400, [254, 254, 202], GLYPH_BLANK);
    img
}

fn analyze(debug_dir: Option<&Path>) -> Result<(tempfile::TempDir, Analysis)> {
    let dir = tempfile::tempdir()?;
    write_templates(&dir.path().join("templates"))?;
    let path = dir.path().join("board.png");
    screenshot().save(&path)?;
    let config = Config::default()
        .with_template_dir(dir.path().join("templates"))
        .with_debug_dir(debug_dir);
    let recognizer = Recognizer::from_config(config)?;
    let analysis = recognizer.analyze(&path)?;
    Ok((dir, analysis))
}

struct FakeQat(BTreeMap<usize, Vec<String>>);

impl CandidateSource for FakeQat {
    fn lookup(&self, length: usize, pattern: &str, _: Dictionary) -> Result<Vec<String>, Error> {
        assert_eq!(pattern, "cats.");
        if length == 7 {
            return Err(Error::FetchFailed {
                pattern: pattern.to_string(),
                attempts: 3,
                last: Box::new(Error::Transport(String::from("status 503"))),
            });
        }
        Ok(self.0.get(&length).cloned().unwrap_or_default())
    }
}

fn fake_source() -> FakeQat {
    let mut words = BTreeMap::new();
    words.insert(5, vec!["tacos".to_string(), "scats".to_string()]);
    words.insert(6, vec!["castle".to_string()]);
    words.insert(7, vec!["catcall".to_string()]);
    FakeQat(words)
}

#[test]
fn test_analyze_screenshot() -> Result<()> {
    let (_dir, analysis) = analyze(None)?;
    assert_eq!(analysis.image, "board.png");
    assert_eq!(analysis.slots.len(), 10);
    assert_eq!(analysis.max_length, 10);

    let regular = &analysis.categories[&Category::Regular];
    let ids: Vec<&str> = regular.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["R-1", "R-2", "R-3"]);
    assert_eq!(regular[0].bbox.x, 50);
    assert_eq!(regular[0].matches.len(), 3);
    assert_eq!(regular[0].matches[0].template, "regular_C.png");
    assert_eq!(regular[0].matches[0].score, 1.0);

    let tiles = analysis.tiles();
    let letters: String = tiles.iter().map(|t| t.letter).collect();
    assert_eq!(letters, format!("CATS{}{}", JOKER, BLANK));
    assert_eq!(tiles[3].font, Font::Bold);
    assert_eq!(tiles[3].category, Category::Improved);
    assert_eq!(analysis.inventory().pattern(), "cats.");
    assert!(analysis.debug_image.is_none());
    Ok(())
}

#[test]
fn test_debug_output() -> Result<()> {
    let out = tempfile::tempdir()?;
    let (_dir, analysis) = analyze(Some(out.path()))?;
    assert_eq!(analysis.debug_image.as_deref(), Some("debug_board.png"));
    assert!(out.path().join("debug_board.png").exists());
    let special = &analysis.categories[&Category::Special];
    assert_eq!(special[1].preview.as_deref(), Some("board_S2.png"));
    assert!(out.path().join("board_S2.png").exists());
    Ok(())
}

#[test]
fn test_no_tiles() -> Result<()> {
    let recognizer = Recognizer::new(Default::default(), Config::default());
    let img = RgbImage::from_pixel(200, 200, Rgb(BACKGROUND));
    match recognizer.analyze_image(&img, "empty.png") {
        Err(Error::NoTiles) => Ok(()),
        other => panic!("expected NoTiles, got {:?}", other.map(|a| a.tile_count())),
    }
}

#[test]
fn test_unreadable_screenshot() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.png");
    fs::write(&path, b"not an image")?;
    let recognizer = Recognizer::new(Default::default(), Config::default());
    assert!(matches!(
        recognizer.analyze(&path),
        Err(Error::ImageError { .. })
    ));
    Ok(())
}

#[test]
fn test_ranked_words() -> Result<()> {
    let (_dir, analysis) = analyze(None)?;
    let finder = WordFinder::new(fake_source()).with_concurrency(5);
    let words = finder.get_words(&analysis, Dictionary::Yawl, Strategy::Bold97)?;
    let placements = match &words {
        Words::Ranked(placements) => placements,
        other => panic!("expected ranked words, got {:?}", other),
    };
    // castle needs two jokers and catcall failed to load
    assert!(placements
        .iter()
        .all(|p| p.permutation.replace('_', "").len() == 5));
    for pair in placements.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let rank = words.rank();
    assert!(rank.contains(&"TACOS"));
    assert!(rank.iter().any(|p| p.contains('_')));
    // the missing O is covered by the joker
    let tacos = placements.iter().find(|p| p.permutation == "TACOS").unwrap();
    assert_eq!(tacos.slots[1], (Font::Regular, 'A'));
    assert_eq!(tacos.slots[3], (Font::Special, JOKER));
    Ok(())
}

#[test]
fn test_raw_word_lists() -> Result<()> {
    let (_dir, analysis) = analyze(None)?;
    let finder = WordFinder::new(fake_source());
    match finder.get_words(&analysis, Dictionary::Ukacd, Strategy::None)? {
        Words::ByLength(words) => {
            assert_eq!(words.keys().copied().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
            assert_eq!(words[&5], vec!["tacos", "scats"]);
            assert!(words[&7].is_empty());
        }
        other => panic!("expected raw lists, got {:?}", other),
    }
    Ok(())
}
