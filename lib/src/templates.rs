use crate::tile::{Category, Font, BLANK, JOKER};
use crate::Error;
use image::GrayImage;
use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved template names and the symbol they stand for
const SYMBOL_NAMES: &[(&str, char)] = &[
    ("wildcard", JOKER),
    ("joker", JOKER),
    ("star", JOKER),
    ("*", JOKER),
    ("exclamation", BLANK),
    ("blank", BLANK),
    ("!", BLANK),
];

/// A letter template read from the template library.
#[derive(Debug, Clone)]
pub struct Template {
    /// File name, e.g. `bold_A.png`
    pub name: String,
    pub font: Font,
    pub letter: char,
    /// `None` when the file could not be decoded; such a template never matches.
    pub image: Option<GrayImage>,
}

/// Parse the font and letter from a template file name.
///
/// The stem is `<font>_<symbol>` or just `<symbol>`, where symbol is a single letter or one of the
/// reserved names (`wildcard`, `exclamation`, ...). A missing font prefix means `regular`.
///
/// ```
/// # use tileword::{parse_template_name, Font};
/// assert_eq!(parse_template_name("bold_q.png"), Some((Font::Bold, 'Q')));
/// assert_eq!(parse_template_name("special_wildcard.png"), Some((Font::Special, '*')));
/// assert_eq!(parse_template_name("E.png"), Some((Font::Regular, 'E')));
/// ```
pub fn parse_template_name(name: &str) -> Option<(Font, char)> {
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    };
    let (prefix, symbol) = match stem.rfind('_') {
        Some(i) => (Some(&stem[..i]), &stem[i + 1..]),
        None => (None, stem),
    };
    let font = match prefix {
        Some(prefix) => {
            // only the first part of a prefix like `bold_v2` names the font
            let head = prefix.split('_').next().unwrap_or(prefix);
            match head.parse::<Font>() {
                Ok(font) => font,
                Err(_) => {
                    warn!("Unknown font prefix in template name {}", name);
                    Font::Regular
                }
            }
        }
        None => Font::Regular,
    };
    let lower = symbol.to_lowercase();
    if let Some(&(_, c)) = SYMBOL_NAMES.iter().find(|(n, _)| *n == lower) {
        return Some((font, c));
    }
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Some((font, c.to_ascii_uppercase())),
        _ => None,
    }
}

/// Template library: one folder per category, read once.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    pub templates: BTreeMap<Category, Vec<Template>>,
}

impl TemplateLibrary {
    /// Read all category folders below `dir`.
    ///
    /// A missing category folder gives an empty template list. Templates that can not be decoded are
    /// kept, without image, so they score 0.
    /// # Errors
    /// A category folder exists but can not be listed.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<TemplateLibrary, Error> {
        let mut templates = BTreeMap::new();
        for &category in Category::ALL.iter() {
            let folder = dir.as_ref().join(category.name());
            let list = if folder.is_dir() {
                Self::load_folder(&folder)?
            } else {
                warn!("Template folder {} not found", folder.display());
                Vec::new()
            };
            debug!("{} templates for {}", list.len(), category);
            templates.insert(category, list);
        }
        Ok(TemplateLibrary { templates })
    }

    fn load_folder(folder: &Path) -> Result<Vec<Template>, Error> {
        let read_error = |source| Error::TemplateReadError {
            path: folder.display().to_string(),
            source,
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(folder)
            .map_err(read_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut list = Vec::new();
        for path in paths {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) if !name.starts_with('.') => name.to_string(),
                _ => continue,
            };
            let (font, letter) = match parse_template_name(&name) {
                Some(key) => key,
                None => {
                    warn!("Skipping template {}: no letter in name", path.display());
                    continue;
                }
            };
            let image = match image::open(&path) {
                Ok(img) => Some(img.into_luma8()),
                Err(err) => {
                    error!("Failed to read template {}: {}", path.display(), err);
                    None
                }
            };
            list.push(Template {
                name,
                font,
                letter,
                image,
            });
        }
        Ok(list)
    }

    /// Build a library from templates already in memory.
    pub fn from_templates(templates: BTreeMap<Category, Vec<Template>>) -> TemplateLibrary {
        TemplateLibrary { templates }
    }

    pub fn get(&self, category: Category) -> &[Template] {
        self.templates
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.templates.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
