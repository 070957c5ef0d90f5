use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanopyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Band '{band}' missing from {context}")]
    MissingBand { band: String, context: String },

    #[error("Region '{0}' not found")]
    RegionNotFound(String),

    #[error("Scene source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid raster dimensions: expected {expected:?}, got {actual:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid scene manifest: {0}")]
    InvalidManifest(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CanopyError {
    pub(crate) fn missing_band(band: &str, context: impl Into<String>) -> Self {
        Self::MissingBand {
            band: band.to_string(),
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CanopyError>;
