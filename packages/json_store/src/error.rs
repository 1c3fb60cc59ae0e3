//! Error types for the JSON collaborators.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {origin}: {message}")]
    Invalid { origin: String, message: String },

    #[error("Unknown record type '{type_name}'")]
    UnknownRecordType { type_name: String },

    #[error("No '{type_name}' record with id '{id}'")]
    NotFound { type_name: String, id: String },

    #[error("A '{type_name}' record with id '{id}' already exists")]
    AlreadyExists { type_name: String, id: String },

    #[error("Row version mismatch for '{type_name}' record '{id}'")]
    RowVersionMismatch { type_name: String, id: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl Error {
    pub(crate) fn invalid(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Invalid {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Loading failures are configuration errors; everything else is a
/// backing-store failure. Either way the original error is kept as the
/// source.
impl From<Error> for schemashim_mapping::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io { .. } | Error::Parse { .. } | Error::Invalid { .. } => {
                schemashim_mapping::Error::configuration_with_source(e.to_string(), e)
            }
            Error::UnknownRecordType { type_name } => {
                let source = Error::UnknownRecordType {
                    type_name: type_name.clone(),
                };
                schemashim_mapping::Error::metadata(type_name, source)
            }
            Error::NotFound { .. }
            | Error::AlreadyExists { .. }
            | Error::RowVersionMismatch { .. }
            | Error::Poisoned => schemashim_mapping::Error::store(e),
        }
    }
}
