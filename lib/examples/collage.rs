use anyhow::{Context, Result};
use tileword::{category_colors, collage, Category, Config, Layout, Recognizer};

fn run() -> Result<()> {
    let path = std::env::args().nth(1).expect("Usage: collage SCREENSHOT");

    let img = image::open(&path)
        .with_context(|| format!("Failed to open {}", path))?
        .into_rgb8();
    eprintln!("read image from {}", path);
    let recognizer = Recognizer::new(Default::default(), Config::default());
    let layout = Layout::new(&img);
    let mut tiles = Vec::new();
    for &category in Category::ALL.iter() {
        let regions = layout.detect(category_colors(category), &recognizer.tile_filter());
        eprintln!("{}: {} regions", category, regions.len());
        tiles.extend(regions.iter().map(|r| r.bbox));
    }

    let collage = collage(&img, &tiles, None);
    collage.save("collage.png")?;

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
