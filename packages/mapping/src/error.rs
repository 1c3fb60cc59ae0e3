//! Error types for mapping, rewriting and the adapter built on them.

/// A boxed error from a collaborator (metadata source, backing store).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The name mapping is missing, ambiguous, or inconsistent. Not retryable.
    Configuration,
    /// The request asks for something the adapter does not do.
    Unsupported,
    /// The request names an attribute or join that the built map does not know.
    Lookup,
    /// A metadata source or backing store failed.
    Collaborator,
    /// The request or response carries malformed data.
    Invalid,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Unsupported operation: {feature}")]
    Unsupported { feature: String },

    #[error("No mapping for attribute '{attribute}' of '{entity}'")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("No mapping for join alias '{alias}'")]
    UnknownJoin { alias: String },

    #[error("Join alias '{alias}' is used more than once")]
    AmbiguousJoin { alias: String },

    #[error("Metadata lookup failed for '{type_name}': {source}")]
    Metadata {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Backing store error: {0}")]
    Store(#[source] BoxError),

    #[error("Unexpected backing store response: expected {expected}")]
    UnexpectedResponse { expected: &'static str },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid value for attribute '{attribute}': {message}")]
    InvalidValue { attribute: String, message: String },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// A configuration error caused by a failure to load the configuration.
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        Error::Unsupported {
            feature: feature.into(),
        }
    }

    pub fn metadata(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Metadata {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    pub fn store(source: impl Into<BoxError>) -> Self {
        Error::Store(source.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Unsupported { .. } => ErrorKind::Unsupported,
            Error::UnknownAttribute { .. }
            | Error::UnknownJoin { .. }
            | Error::AmbiguousJoin { .. } => ErrorKind::Lookup,
            Error::Metadata { .. } | Error::Store(_) | Error::UnexpectedResponse { .. } => {
                ErrorKind::Collaborator
            }
            Error::InvalidRequest { .. } | Error::InvalidValue { .. } => ErrorKind::Invalid,
        }
    }
}
