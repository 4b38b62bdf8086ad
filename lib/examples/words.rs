use anyhow::{Context, Result};
use tileword::{Config, Recognizer, WordFinder, Words};

fn run() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .expect("Usage: words SCREENSHOT [CONFIG_JSON]");
    let config = match args.next() {
        Some(config) => Config::from_json_file(&config)?,
        None => Config::default(),
    };
    let recognizer = Recognizer::from_config(config.clone())?;
    let analysis = recognizer
        .analyze(&path)
        .with_context(|| format!("Failed to analyze {}", path))?;
    eprintln!("tiles: {} max length: {}", analysis.inventory(), analysis.max_length);

    let finder = WordFinder::from_config(&config);
    match finder.get_words(&analysis, config.dictionary, config.strategy)? {
        Words::ByLength(words) => {
            for (length, list) in words.iter().rev() {
                println!("{}: {}", length, list.join(" "));
            }
        }
        Words::Ranked(placements) => {
            for p in placements.iter().take(20) {
                println!("{:>12} {:.4}", p.permutation, p.score);
            }
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
