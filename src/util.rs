use std::fs::File;
use std::io;
use std::path::Path;

/// Opens `path`, naming the `kind` of file and its path in any error.
pub fn open(path: &Path, kind: &str) -> io::Result<File> {
    File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("opening {} file `{}`: {}", kind, path.display(), e),
        )
    })
}

/// `pluralize(3, "article")` is `"3 articles"`; zero is spelled out as
/// `"No articles"`.
pub fn pluralize(number: usize, singular: &str) -> String {
    match number {
        0 => format!("No {}s", singular),
        1 => format!("1 {}", singular),
        n => format!("{} {}s", n, singular),
    }
}
