pub mod config;
pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Structured input from `--input` if given, else from piped stdin.
///
/// Returns `None` when neither source supplied anything, leaving the caller
/// to fall back to individual flags.
pub fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Like [`read_structured`] but for commands that take no flags.
pub fn require_structured<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    read_structured(path)?
        .ok_or_else(|| format!("--input file (or piped JSON) is required for {command}").into())
}
