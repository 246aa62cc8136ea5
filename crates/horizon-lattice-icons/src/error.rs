//! Error types for the icon crate.
//!
//! These errors never cross the public request API: the worker converts every
//! failure into an unavailable icon. They are returned by the decoding
//! collaborators and by constructors that can genuinely fail.

use thiserror::Error;

/// Errors that can occur while loading or rasterizing icons.
#[derive(Error, Debug)]
pub enum IconError {
    /// The vector source could not be parsed.
    #[error("failed to parse SVG: {0}")]
    SvgParse(#[from] resvg::usvg::Error),

    /// The encoded bitmap could not be decoded.
    #[error("failed to decode image '{name}': {source}")]
    ImageDecode {
        /// Logical name of the icon being decoded.
        name: String,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The requested pixel dimensions are zero or too large to allocate.
    #[error("invalid icon dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The rasterizer could not produce a pixmap.
    #[error("failed to rasterize icon: {0}")]
    Rasterize(String),

    /// A pixel buffer does not match its declared dimensions.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// The background worker thread could not be started.
    #[error("failed to spawn icon worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Result type for icon operations.
pub type IconResult<T> = Result<T, IconError>;
