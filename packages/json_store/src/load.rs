//! Reading JSON configuration files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::Error;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    debug!(path = %path.display(), "loading json");
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text, &path.display().to_string())
}

pub(crate) fn parse_json<T: DeserializeOwned>(json: &str, origin: &str) -> Result<T, Error> {
    serde_json::from_str(json).map_err(|source| Error::Parse {
        origin: origin.to_string(),
        source,
    })
}
