use crate::tile::{BBox, Category};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;
use serde::{Deserialize, Serialize};

/// Per channel colour tolerance
pub const TOLERANCE: u8 = 10;

/// Radius of the structuring element, `2` is a 5x5 square with the L-infinity norm
const KERNEL_RADIUS: u8 = 2;

pub type Color = [u8; 3];

const REGULAR_COLORS: &[Color] = &[[241, 235, 223]];
const IMPROVED_COLORS: &[Color] = &[[186, 255, 137]];
const SPECIAL_COLORS: &[Color] = &[[253, 216, 75], [255, 250, 156], [254, 254, 202]];

/// Colours of the empty board slots
pub const SLOT_COLORS: &[Color] = &[[255, 255, 255], [240, 240, 240]];

/// Tile background colours of a category. Several colours are treated as one.
pub fn category_colors(category: Category) -> &'static [Color] {
    match category {
        Category::Regular => REGULAR_COLORS,
        Category::Improved => IMPROVED_COLORS,
        Category::Special => SPECIAL_COLORS,
    }
}

/// A length that is either absolute pixels or a fraction of an image dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    Pixels(u32),
    Fraction(f64),
}

impl Extent {
    /// Values in `[0, 1]` are fractions, anything larger is a pixel count.
    pub fn from_value(value: f64) -> Extent {
        if (0.0..=1.0).contains(&value) {
            Extent::Fraction(value)
        } else {
            Extent::Pixels(value.max(0.0).round() as u32)
        }
    }

    fn resolve(self, total: u64) -> u64 {
        match self {
            Extent::Pixels(p) => p as u64,
            Extent::Fraction(f) => (f * total as f64).round() as u64,
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Extent::Pixels(0)
    }
}

/// Distance a region must keep from each image edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Extent,
    pub bottom: Extent,
    pub left: Extent,
    pub right: Extent,
}

impl Margins {
    /// Same margin on all four sides
    pub fn inset(extent: Extent) -> Margins {
        Margins {
            top: extent,
            bottom: extent,
            left: extent,
            right: extent,
        }
    }

    fn contains(&self, bbox: &BBox, width: u32, height: u32) -> bool {
        let (w, h) = (width as u64, height as u64);
        let (x0, y0) = (bbox.x as u64, bbox.y as u64);
        let (x1, y1) = (x0 + bbox.width as u64, y0 + bbox.height as u64);
        x0 >= self.left.resolve(w)
            && y0 >= self.top.resolve(h)
            && x1 <= w.saturating_sub(self.right.resolve(w))
            && y1 <= h.saturating_sub(self.bottom.resolve(h))
    }
}

/// Shape constraints a connected component must satisfy to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFilter {
    pub min_area: Extent,
    /// Inclusive `w / h` bounds
    pub aspect_ratio: (f64, f64),
    pub margins: Margins,
}

impl RegionFilter {
    pub fn new(min_area: Extent) -> RegionFilter {
        RegionFilter {
            min_area,
            aspect_ratio: (0.0, f64::INFINITY),
            margins: Margins::default(),
        }
    }

    pub fn with_aspect_ratio(mut self, min: f64, max: f64) -> Self {
        self.aspect_ratio = (min, max);
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    fn accepts(&self, bbox: &BBox, area: u64, width: u32, height: u32) -> bool {
        let min_area = self.min_area.resolve(width as u64 * height as u64);
        let ratio = bbox.aspect_ratio();
        area >= min_area
            && ratio >= self.aspect_ratio.0
            && ratio <= self.aspect_ratio.1
            && self.margins.contains(bbox, width, height)
    }
}

/// A detected region, numbered from 1 in labelling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id: usize,
    pub bbox: BBox,
    pub area: u32,
}

#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

impl ComponentStats {
    fn new(x: u32, y: u32) -> ComponentStats {
        ComponentStats {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
    }

    fn bbox(&self) -> BBox {
        BBox::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x + 1,
            self.max_y - self.min_y + 1,
        )
    }
}

/// Colour segmentation of a screenshot.
///
/// Finds the regions of an image whose colour is close to one of a set of target colours.
/// Only bounding boxes are returned; callers crop the image themselves.
///
/// # Example
/// ```
/// # use tileword::{Extent, Layout, RegionFilter};
/// # use image::{Rgb, RgbImage};
/// let mut img = RgbImage::new(200, 100);
/// for y in 20..80 {
///     for x in 20..80 {
///         img.put_pixel(x, y, Rgb([241, 235, 223]));
///     }
/// }
/// let regions = Layout::new(&img).detect(&[[241, 235, 223]], &RegionFilter::new(Extent::Pixels(100)));
/// assert_eq!(regions.len(), 1);
/// assert_eq!(regions[0].bbox.width, 60);
/// ```
pub struct Layout<'a> {
    img: &'a RgbImage,
    tolerance: u8,
}

impl<'a> Layout<'a> {
    pub fn new(img: &'a RgbImage) -> Layout<'a> {
        Layout {
            img,
            tolerance: TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Binary mask of all pixels within tolerance of any of `colors`, closed then opened to merge
    /// fragments and drop speckles.
    pub fn mask(&self, colors: &[Color]) -> GrayImage {
        let tol = self.tolerance;
        let ranges: Vec<(Color, Color)> = colors
            .iter()
            .map(|c| {
                (
                    [
                        c[0].saturating_sub(tol),
                        c[1].saturating_sub(tol),
                        c[2].saturating_sub(tol),
                    ],
                    [
                        c[0].saturating_add(tol),
                        c[1].saturating_add(tol),
                        c[2].saturating_add(tol),
                    ],
                )
            })
            .collect();
        let (w, h) = self.img.dimensions();
        let mask = GrayImage::from_fn(w, h, |x, y| {
            let p = self.img.get_pixel(x, y).0;
            let hit = ranges
                .iter()
                .any(|(lo, hi)| (0..3).all(|c| p[c] >= lo[c] && p[c] <= hi[c]));
            if hit {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let closed = close(&mask, Norm::LInf, KERNEL_RADIUS);
        open(&closed, Norm::LInf, KERNEL_RADIUS)
    }

    /// Detect the regions of `colors` that pass `filter`.
    pub fn detect(&self, colors: &[Color], filter: &RegionFilter) -> Vec<Region> {
        let mask = self.mask(colors);
        Self::regions(&mask, filter)
    }

    /// Label the 8-connected components of `mask` and keep those that pass `filter`.
    pub fn regions(mask: &GrayImage, filter: &RegionFilter) -> Vec<Region> {
        let (width, height) = mask.dimensions();
        let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
        let mut stats: Vec<Option<ComponentStats>> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0] as usize;
            if label == 0 {
                continue;
            }
            if stats.len() <= label {
                stats.resize(label + 1, None);
            }
            stats[label]
                .get_or_insert_with(|| ComponentStats::new(x, y))
                .add(x, y);
        }
        let mut regions = Vec::new();
        for component in stats.iter().flatten() {
            let bbox = component.bbox();
            if filter.accepts(&bbox, component.area as u64, width, height) {
                regions.push(Region {
                    id: regions.len() + 1,
                    bbox,
                    area: component.area,
                });
            } else {
                debug!(
                    "rejected component {:?} with area {}",
                    bbox, component.area
                );
            }
        }
        regions
    }
}
