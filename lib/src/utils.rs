use crate::layout::{Color, Region};
use crate::tile::BBox;
use crate::Error;
use image::imageops::{resize, FilterType};
use image::{GenericImage, GenericImageView, ImageBuffer, Rgb, RgbImage, SubImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

/// Outline each region on `img`, two pixels wide.
///
/// Region ids are not drawn: text rendering needs a font file, the ids are in the result instead.
pub fn annotate(img: &mut RgbImage, regions: &[Region], color: Color) {
    for region in regions {
        let b = region.bbox;
        for inset in 0..2u32 {
            if b.width <= 2 * inset || b.height <= 2 * inset {
                break;
            }
            let rect = Rect::at((b.x + inset) as i32, (b.y + inset) as i32)
                .of_size(b.width - 2 * inset, b.height - 2 * inset);
            draw_hollow_rect_mut(img, rect, Rgb(color));
        }
    }
}

/// Save a region crop for inspection.
pub fn save_preview<P: AsRef<Path>>(path: P, crop: &RgbImage) -> Result<(), Error> {
    let path = path.as_ref();
    crop.save(path).map_err(|source| Error::ImageSaveError {
        path: path.display().to_string(),
        source,
    })
}

/// Create a collage from parts of a source image, e.g. to harvest new templates.
/// Parts are scaled to the size of the first part.
pub fn collage(source: &RgbImage, parts: &[BBox], maxrows: Option<u32>) -> RgbImage {
    if parts.is_empty() {
        return RgbImage::new(0, 0);
    }
    let nimages = parts.len();
    let mut nrows = ((nimages as f64).sqrt().floor() as u32).max(1);
    if let Some(maxrows) = maxrows {
        nrows = std::cmp::min(nrows, maxrows.max(1));
    }
    let ncols = (nimages as f64 / nrows as f64).ceil() as u32;
    let nrows = (nimages as f64 / ncols as f64).ceil() as u32;
    let (w, h) = (parts[0].width, parts[0].height);
    let mut collage: RgbImage = ImageBuffer::new(w * ncols, h * nrows);
    for (i, part) in parts.iter().enumerate() {
        let (row, col) = ((i as u32 / ncols), (i as u32 % ncols));
        let mut dest: SubImage<&mut RgbImage> = collage.sub_image(col * w, row * h, w, h);
        let src = source.view(part.x, part.y, part.width, part.height).to_image();
        let src = if (part.width, part.height) != (w, h) {
            resize(&src, w, h, FilterType::Triangle)
        } else {
            src
        };
        for (x, y, p) in src.enumerate_pixels() {
            dest.put_pixel(x, y, *p);
        }
    }
    collage
}
