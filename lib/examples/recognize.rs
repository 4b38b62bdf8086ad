use anyhow::{Context, Result};
use std::time::Instant;
use tileword::{Config, Recognizer};

fn run() -> Result<()> {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .expect("Usage: recognize SCREENSHOT [TEMPLATE_DIR]");
    let template_dir = std::env::args().nth(2).unwrap_or_else(|| "templates".into());
    let config = Config::default().with_template_dir(template_dir);
    let recognizer = Recognizer::from_config(config)?;

    let t0 = Instant::now();
    let analysis = recognizer
        .analyze(&path)
        .with_context(|| format!("Failed to analyze {}", path))?;
    eprintln!("recognize screenshot took {:?}", t0.elapsed());
    eprintln!("tiles: {}", analysis.inventory());
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
