//! Page templates. A template directory holds a `layout.html` and one file per
//! page. Each `.html` page is appended to the layout before parsing, so a page
//! only needs to `{{define "content"}}` the part that differs; `.xml` pages
//! (the sitemap) are parsed on their own.
//!
//! Templates are parsed once at load, so syntax errors fail startup, and the
//! parsed templates are shared between requests.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use gtmpl::{Context, Template, Value};
use thiserror::Error;

const LAYOUT: &str = "layout.html";

/// The compiled set of page templates, keyed by file stem (`article.html` is
/// `article`).
#[derive(Default)]
pub struct Templates {
    templates: HashMap<String, Template>,
}

impl Templates {
    /// Loads every template in `dir`.
    pub fn load(dir: &Path) -> Result<Templates> {
        let layout = read(&dir.join(LAYOUT))?;
        let mut templates = HashMap::new();
        for entry in std::fs::read_dir(dir).map_err(|err| Error::Read {
            path: dir.to_owned(),
            err,
        })? {
            let path = entry?.path();
            let (stem, extension) = match (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) {
                (Some(stem), Some(extension)) => (stem.to_owned(), extension),
                _ => continue,
            };
            let source = match extension {
                "html" if path.file_name() != Some(OsStr::new(LAYOUT)) => {
                    // separate the files so trailing and leading tokens
                    // don't run together
                    format!("{} {}", layout, read(&path)?)
                }
                "xml" => read(&path)?,
                _ => continue,
            };
            let template = parse(&source).map_err(|message| Error::Parse {
                path: path.clone(),
                message,
            })?;
            templates.insert(stem, template);
        }
        Ok(Templates { templates })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Renders the template `name` with `value` as its data.
    pub fn render(&self, name: &str, value: Value) -> Result<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::Missing(name.to_owned()))?;
        let annotate = |message: String| Error::Execute {
            name: name.to_owned(),
            message,
        };
        let context = Context::from(value).map_err(annotate)?;
        let mut out = Vec::new();
        template.execute(&mut out, &context).map_err(annotate)?;
        String::from_utf8(out).map_err(|e| annotate(e.to_string()))
    }
}

fn parse(source: &str) -> std::result::Result<Template, String> {
    let mut template = Template::default();
    template.parse(source)?;
    Ok(template)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })
}

/// The result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to load or render a template.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a template file can't be read.
    #[error("reading template `{}`: {err}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a template doesn't parse.
    #[error("parsing template `{}`: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Returned when rendering a template that wasn't loaded.
    #[error("no template named `{0}`")]
    Missing(String),

    /// Returned when a template fails while rendering.
    #[error("rendering template `{name}`: {message}")]
    Execute { name: String, message: String },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
