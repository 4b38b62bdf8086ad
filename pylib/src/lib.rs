use pyo3::{
    create_exception, exceptions::PyException, prelude::*, types::PyDict, wrap_pyfunction, PyErr,
};
use tileword::{Analysis, Config, Dictionary, Recognizer, Strategy, WordFinder, Words};

create_exception!(pytileword, TilewordException, PyException);

fn bbox_tuple(b: &tileword::BBox) -> (u32, u32, u32, u32) {
    (b.x, b.y, b.width, b.height)
}

fn process_analysis(res: &Analysis, py: Python) -> PyResult<PyObject> {
    let categories = PyDict::new(py);
    for (category, regions) in res.categories.iter() {
        let mut items: Vec<PyObject> = Vec::new();
        for region in regions {
            let mut matches: Vec<PyObject> = Vec::new();
            for m in region.matches.iter() {
                let item = PyDict::new(py);
                item.set_item("letter", m.letter.to_string())?;
                item.set_item("font", m.font.name())?;
                item.set_item("score", m.score)?;
                item.set_item("template", m.template.clone())?;
                matches.push(item.into());
            }
            let item = PyDict::new(py);
            item.set_item("id", region.id.clone())?;
            item.set_item("bbox", bbox_tuple(&region.bbox))?;
            item.set_item("preview", region.preview.clone())?;
            item.set_item("matches", matches)?;
            items.push(item.into());
        }
        categories.set_item(category.name(), items)?;
    }
    let slots: Vec<(u32, u32, u32, u32)> = res.slots.iter().map(bbox_tuple).collect();
    let dict = PyDict::new(py);
    dict.set_item("original_image", res.image.clone())?;
    dict.set_item("debug_image", res.debug_image.clone())?;
    dict.set_item("categories", categories)?;
    dict.set_item("slots", slots)?;
    dict.set_item("max_length", res.max_length)?;
    Ok(dict.into())
}

fn process_words(words: &Words, py: Python) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    match words {
        Words::ByLength(lists) => {
            for (length, list) in lists.iter() {
                dict.set_item(*length, list.clone())?;
            }
        }
        Words::Ranked(_) => {
            let rank: Vec<String> = words.rank().iter().map(|s| s.to_string()).collect();
            dict.set_item("rank", rank)?;
        }
    }
    Ok(dict.into())
}

fn recognize(image_path: &str, template_dir: &str) -> Result<(Config, Analysis), TilewordError> {
    let config = Config::default().with_template_dir(template_dir);
    let recognizer = Recognizer::from_config(config.clone())?;
    let analysis = recognizer.analyze(image_path)?;
    Ok((config, analysis))
}

#[pyfunction]
fn analyze(image_path: String, template_dir: String, py: Python) -> PyResult<PyObject> {
    let (_, analysis) = recognize(&image_path, &template_dir)?;
    process_analysis(&analysis, py)
}

/// Rank words for a screenshot. The screenshot is analyzed again, a result dict from `analyze`
/// can not be passed in.
#[pyfunction]
fn get_words(
    image_path: String,
    template_dir: String,
    dictionary: String,
    strategy: String,
    py: Python,
) -> PyResult<PyObject> {
    let dictionary: Dictionary = dictionary.parse().map_err(TilewordError::from)?;
    let strategy: Strategy = strategy.parse().map_err(TilewordError::from)?;
    let (config, analysis) = recognize(&image_path, &template_dir)?;
    let words = py
        .allow_threads(|| WordFinder::from_config(&config).get_words(&analysis, dictionary, strategy))
        .map_err(TilewordError::from)?;
    process_words(&words, py)
}

/// Wrapper around tileword::Error so we convert to PyErr
struct TilewordError(tileword::Error);

impl From<tileword::Error> for TilewordError {
    fn from(err: tileword::Error) -> TilewordError {
        TilewordError(err)
    }
}

impl From<TilewordError> for PyErr {
    fn from(err: TilewordError) -> PyErr {
        PyErr::new::<TilewordException, String>(err.0.to_string())
    }
}

#[pymodule]
fn pytileword(py: Python, m: &PyModule) -> PyResult<()> {
    m.add("TilewordException", py.get_type::<TilewordException>())?;
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_function(wrap_pyfunction!(get_words, m)?)?;
    Ok(())
}
