//! Cache-busted URLs for static assets. Each URL carries the modification
//! time of the file behind it (`/stylesheets/screen.css?1210000000`), so
//! assets can be served with far-future expiry and still update on change.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use gtmpl::Value;
use tracing::debug;

use crate::value::{object, string};

const STYLESHEET_EXTENSION: &str = "css";

/// Resolves asset URLs against the directories they're served from.
#[derive(Clone, Debug)]
pub struct Assets {
    stylesheets_directory: PathBuf,
    public_directory: PathBuf,
}

impl Assets {
    pub fn new(stylesheets_directory: &Path, public_directory: &Path) -> Assets {
        Assets {
            stylesheets_directory: stylesheets_directory.to_owned(),
            public_directory: public_directory.to_owned(),
        }
    }

    /// The file backing `/stylesheets/{name}.css`, if `name` is a plain file
    /// name.
    pub fn stylesheet_path(&self, name: &str) -> Option<PathBuf> {
        let separator = |c: char| c == '/' || c == '\\';
        if name.is_empty() || name.contains(separator) || name.starts_with('.') {
            return None;
        }
        Some(
            self.stylesheets_directory
                .join(format!("{}.{}", name, STYLESHEET_EXTENSION)),
        )
    }

    /// `/stylesheets/{name}.css?{mtime}`
    pub fn stylesheet(&self, name: &str) -> String {
        let url = format!("/stylesheets/{}.{}", name, STYLESHEET_EXTENSION);
        match self.stylesheet_path(name) {
            Some(path) => versioned(url, &path),
            None => url,
        }
    }

    /// `/javascripts/{name}.js?{mtime}`
    pub fn script(&self, name: &str) -> String {
        let path = self
            .public_directory
            .join("javascripts")
            .join(format!("{}.js", name));
        versioned(format!("/javascripts/{}.js", name), &path)
    }

    /// `/favicon.ico?{mtime}`
    pub fn favicon(&self) -> String {
        versioned(String::from("/favicon.ico"), &self.favicon_path())
    }

    /// Whether the favicon the layout links to exists.
    pub fn has_favicon(&self) -> bool {
        self.favicon_path().is_file()
    }

    fn favicon_path(&self) -> PathBuf {
        self.public_directory.join("favicon.ico")
    }

    /// The template value for the layout: `favicon`, plus `stylesheets` and
    /// `javascripts` objects keyed by file stem.
    pub fn to_value(&self) -> Value {
        let stylesheets = stems(&self.stylesheets_directory, STYLESHEET_EXTENSION)
            .into_iter()
            .map(|stem| {
                let url = self.stylesheet(&stem);
                (stem, string(url))
            })
            .collect();
        let javascripts = stems(&self.public_directory.join("javascripts"), "js")
            .into_iter()
            .map(|stem| {
                let url = self.script(&stem);
                (stem, string(url))
            })
            .collect();
        object(vec![
            ("favicon", string(self.favicon())),
            ("stylesheets", Value::Object(stylesheets)),
            ("javascripts", Value::Object(javascripts)),
        ])
    }
}

/// Appends the modification time of `path` to `url`. A missing file leaves
/// the URL bare.
fn versioned(url: String, path: &Path) -> String {
    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|modified| {
            modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });
    match mtime {
        Ok(secs) => format!("{}?{}", url, secs),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "can't version asset");
            url
        }
    }
}

/// The stems of the files in `dir` with the given extension.
fn stems(dir: &Path, extension: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == extension))
        .filter_map(|path| Some(path.file_stem()?.to_str()?.to_owned()))
        .collect()
}
