use crate::config::Config;
use crate::layout::{category_colors, Extent, Layout, Margins, Region, RegionFilter, SLOT_COLORS};
use crate::templates::{Template, TemplateLibrary};
use crate::tile::{BBox, Category, Font, Inventory, Tile};
use crate::utils::{annotate, save_preview};
use crate::Error;
use image::imageops::{grayscale, resize, FilterType};
use image::{GenericImageView, GrayImage, Luma, RgbImage};
use imageproc::contrast::threshold;
use imageproc::map::map_pixels;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Gray values up to this are ink
pub const INK_THRESHOLD: u8 = 10;

/// Playable word length bounds derived from the board slots
pub const MIN_WORD_LENGTH: usize = 9;
pub const MAX_WORD_LENGTH: usize = 10;

/// Below this many tiles a screenshot is probably cropped or badly lit
const EXPECTED_TILES: usize = 9;

/// Accepted `w / h` range for tiles and slots
const ASPECT_RATIO: (f64, f64) = (0.8, 1.2);

/// Result of matching one region against one template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub letter: char,
    pub font: Font,
    /// Intersection over union of the ink masks, in `[0, 1]`
    pub score: f64,
    /// Template file name
    pub template: String,
}

/// A detected tile region with all its template matches, best first.
#[derive(Debug, Clone, Serialize)]
pub struct TileRegion {
    /// `<category initial>-<n>`, e.g. `R-1`
    pub id: String,
    pub bbox: BBox,
    pub matches: Vec<Match>,
    /// File name of the preview crop, when debug output is enabled
    pub preview: Option<String>,
}

impl TileRegion {
    pub fn best(&self) -> Option<&Match> {
        self.matches.first()
    }
}

/// Holds the result of [Recognizer::analyze]: the tile regions per category and the playable
/// word length.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// File name of the analyzed screenshot
    pub image: String,
    pub categories: BTreeMap<Category, Vec<TileRegion>>,
    /// Empty board slots
    pub slots: Vec<BBox>,
    pub max_length: usize,
    /// File name of the annotated screenshot, when debug output is enabled
    pub debug_image: Option<String>,
}

impl Analysis {
    /// The recognized tiles, in category order then detection order. Regions without any match
    /// are left out.
    pub fn tiles(&self) -> Vec<Tile> {
        self.categories
            .iter()
            .flat_map(|(&category, regions)| {
                regions.iter().filter_map(move |region| {
                    region.best().map(|m| Tile {
                        bbox: region.bbox,
                        category,
                        font: m.font,
                        letter: m.letter,
                        match_score: m.score,
                    })
                })
            })
            .collect()
    }

    pub fn inventory(&self) -> Inventory {
        Inventory::from_tiles(self.tiles().iter())
    }

    pub fn tile_count(&self) -> usize {
        self.categories.values().map(|v| v.len()).sum()
    }
}

/// Binary ink mask: near-black pixels become 255, everything else 0.
pub fn ink_mask(gray: &GrayImage) -> GrayImage {
    let bw = threshold(gray, INK_THRESHOLD);
    map_pixels(&bw, |_x, _y, p| {
        if p[0] == 0 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Intersection over union of two equally sized binary masks.
///
/// Two empty masks score 0.
pub fn similarity(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (mut intersection, mut union) = (0u64, 0u64);
    for (p, q) in a.pixels().zip(b.pixels()) {
        let (p, q) = (p[0] > 0, q[0] > 0);
        if p && q {
            intersection += 1;
        }
        if p || q {
            union += 1;
        }
    }
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Playable word length from the number of board slots
pub fn max_length_from_slots(count: usize) -> usize {
    if count < MIN_WORD_LENGTH || count > MAX_WORD_LENGTH {
        warn!(
            "Found {} board slots, clamping word length to [{}, {}]",
            count, MIN_WORD_LENGTH, MAX_WORD_LENGTH
        );
    }
    count.max(MIN_WORD_LENGTH).min(MAX_WORD_LENGTH)
}

/// Letter tile recognizer
pub struct Recognizer {
    pub library: TemplateLibrary,
    pub config: Config,
}

impl Recognizer {
    pub fn new(library: TemplateLibrary, config: Config) -> Recognizer {
        Recognizer { library, config }
    }

    /// Load the template library named in `config`.
    pub fn from_config(config: Config) -> Result<Recognizer, Error> {
        let library = TemplateLibrary::load(&config.template_dir)?;
        info!(
            "Loaded {} templates from {}",
            library.len(),
            config.template_dir.display()
        );
        Ok(Recognizer::new(library, config))
    }

    pub fn tile_filter(&self) -> RegionFilter {
        let margins = Margins {
            top: Extent::Fraction(self.config.tile_top_fraction),
            bottom: Extent::from_value(self.config.tile_bottom_margin),
            ..Margins::default()
        };
        RegionFilter::new(Extent::from_value(self.config.tile_min_area))
            .with_aspect_ratio(ASPECT_RATIO.0, ASPECT_RATIO.1)
            .with_margins(margins)
    }

    pub fn slot_filter(&self) -> RegionFilter {
        RegionFilter::new(Extent::from_value(self.config.slot_min_area))
            .with_aspect_ratio(ASPECT_RATIO.0, ASPECT_RATIO.1)
            .with_margins(Margins::inset(Extent::from_value(self.config.slot_margin)))
    }

    /// Match a tile crop against every template of `category`.
    ///
    /// Returns all matches sorted by descending score; equal scores keep library order.
    pub fn classify(&self, crop: &RgbImage, category: Category) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .library
            .get(category)
            .iter()
            .map(|template| Match {
                letter: template.letter,
                font: template.font,
                score: Self::match_template(crop, template),
                template: template.name.clone(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    fn match_template(crop: &RgbImage, template: &Template) -> f64 {
        let image = match &template.image {
            Some(image) => image,
            None => return 0.0,
        };
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 || crop.width() == 0 || crop.height() == 0 {
            return 0.0;
        }
        let gray = if crop.dimensions() == (w, h) {
            grayscale(crop)
        } else {
            grayscale(&resize(crop, w, h, FilterType::Triangle))
        };
        similarity(&ink_mask(&gray), &ink_mask(image))
    }

    /// Recognize a screenshot file.
    ///
    /// # Errors
    /// * The image can not be decoded
    /// * No tile was found at all
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<Analysis, Error> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| Error::ImageError {
                path: path.display().to_string(),
                source,
            })?
            .into_rgb8();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.analyze_image(&img, &name)
    }

    /// Recognize a screenshot that is already in memory. `name` is used for debug file names.
    pub fn analyze_image(&self, img: &RgbImage, name: &str) -> Result<Analysis, Error> {
        let layout = Layout::new(img).with_tolerance(self.config.color_tolerance);
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("screenshot"));
        let mut debug_img = self.config.debug_dir.as_ref().map(|_| img.clone());

        let tile_filter = self.tile_filter();
        let mut categories = BTreeMap::new();
        for &category in Category::ALL.iter() {
            let colors = category_colors(category);
            let regions = layout.detect(colors, &tile_filter);
            info!("{}: {} tile regions", category, regions.len());
            if let Some(debug_img) = debug_img.as_mut() {
                annotate(debug_img, &regions, colors[0]);
            }
            let results = regions
                .iter()
                .map(|region| self.recognize_region(img, category, region, &stem))
                .collect();
            categories.insert(category, results);
        }

        let slots: Vec<BBox> = layout
            .detect(SLOT_COLORS, &self.slot_filter())
            .iter()
            .map(|r| r.bbox)
            .collect();
        debug!("{} board slots", slots.len());
        let max_length = max_length_from_slots(slots.len());

        let debug_image = match (debug_img, &self.config.debug_dir) {
            (Some(debug_img), Some(dir)) => {
                let file_name = format!("debug_{}.png", stem);
                match debug_img.save(dir.join(&file_name)) {
                    Ok(()) => Some(file_name),
                    Err(err) => {
                        error!("Failed to save {}: {}", file_name, err);
                        None
                    }
                }
            }
            _ => None,
        };

        let analysis = Analysis {
            image: name.to_string(),
            categories,
            slots,
            max_length,
            debug_image,
        };
        let count = analysis.tile_count();
        if count == 0 {
            return Err(Error::NoTiles);
        }
        if count < EXPECTED_TILES {
            warn!("Only {} tiles detected", count);
        }
        Ok(analysis)
    }

    fn recognize_region(
        &self,
        img: &RgbImage,
        category: Category,
        region: &Region,
        stem: &str,
    ) -> TileRegion {
        let b = region.bbox;
        let crop = img.view(b.x, b.y, b.width, b.height).to_image();
        let matches = self.classify(&crop, category);
        if let Some(best) = matches.first() {
            debug!(
                "{}-{}: {} {} ({:.3})",
                category.initial(),
                region.id,
                best.font,
                best.letter,
                best.score
            );
        }
        let preview = self.config.debug_dir.as_ref().and_then(|dir| {
            let file_name = format!("{}_{}{}.png", stem, category.initial(), region.id);
            match save_preview(dir.join(&file_name), &crop) {
                Ok(()) => Some(file_name),
                Err(err) => {
                    error!("{}", err);
                    None
                }
            }
        });
        TileRegion {
            id: format!("{}-{}", category.initial(), region.id),
            bbox: b,
            matches,
            preview,
        }
    }
}
