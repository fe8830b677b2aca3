pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use tracing::debug;

/// Load a document from `--input`, falling back to piped stdin.
pub fn load_document<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!(path, "reading parameter document");
        return file::read_document(path);
    }
    stdin::read_stdin()?
        .ok_or_else(|| "Provide --input <file> or pipe a parameter document on stdin".into())
}
