/// Errors surfaced by the geocoding pipeline.
///
/// An empty [`AddressCollection`](crate::AddressCollection) is not an error:
/// it is how the pipeline reports "no provider found anything".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A "lat,lon" text value could not be turned into a coordinate pair.
    #[error("malformed coordinates '{input}': {reason}")]
    MalformedCoordinate { input: String, reason: String },

    /// The pipeline was configured in a way that cannot work at all.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A request named a provider that is not registered.
    #[error("unknown provider '{name}'")]
    UnknownProvider { name: String },

    /// A dumper identifier did not match any known output format.
    #[error("unknown dumper '{name}'. Supported dumpers: {supported}")]
    UnknownDumper { name: String, supported: String },

    /// The field value cannot be prepared in the requested direction.
    #[error("{field_type} fields cannot be prepared for {direction}")]
    UnsupportedField {
        field_type: &'static str,
        direction: &'static str,
    },

    /// Geometry conversion failed inside a dumper.
    #[error("geometry conversion failed: {reason}")]
    Geometry { reason: String },

    /// An XML output document could not be written.
    #[error("failed to write {format} document: {reason}")]
    Document {
        format: &'static str,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration { message: message.into() }
    }

    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Error::MalformedCoordinate {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
