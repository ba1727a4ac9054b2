use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid '{param}' parameter: {value}")]
    InvalidParameter { param: &'static str, value: String },

    #[error("Invalid address fragment: {message}")]
    InvalidFragment { message: String },

    #[error("Could not generate shareable URL. Content might be too large.")]
    Compress { detail: String },

    #[error("Could not restore shared content: the compressed parameter is corrupt")]
    Decompress,

    #[error("Malformed SVG markup: {message}")]
    SvgParse { message: String },

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter { .. } | Error::InvalidFragment { .. } | Error::Url(_) => {
                ErrorKind::Parameter
            }
            Error::Compress { .. } | Error::Decompress => ErrorKind::Compression,
            Error::SvgParse { .. } => ErrorKind::Compile,
        }
    }
}

/// User-facing failure classes. Each one is reported with its own title and never leaves the
/// display slot half-updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The compiler rejected the source/engine combination, or produced unusable markup.
    Compile,
    /// An engine/format/fragment value from the address bar did not validate.
    Parameter,
    /// Remote content could not be loaded.
    Fetch,
    /// Share-link generation or restoration failed.
    Compression,
    /// Raster conversion or math typesetting failed.
    Conversion,
}

impl ErrorKind {
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Compile => "Error",
            ErrorKind::Parameter => "URL Parameter Error",
            ErrorKind::Fetch => "Load Error",
            ErrorKind::Compression => "URL Generation Failed",
            ErrorKind::Conversion => "Conversion Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
