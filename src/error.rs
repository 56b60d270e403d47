// One error type for the whole crate.
// Every variant says *where* things went wrong and all of them are recoverable:
// the interactive loop logs them and keeps going.
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A vertex loop handed to the rasterizer cannot be filled.
    #[error("invalid polygon #{index}: {reason}")]
    InvalidPolygon { index: usize, reason: String },

    /// Export requested while no polygon has been finalized.
    #[error("no polygons to export")]
    EmptySet,

    /// The surface a mask or frame should be written into could not be built.
    #[error("render target unavailable: {0}")]
    RenderTargetUnavailable(String),

    /// Raster grid with a zero dimension.
    #[error("raster size {width}x{height} has no pixels")]
    EmptyRaster { width: usize, height: usize },

    /// Raster grid larger than [`crate::raster::MAX_RASTER_PIXELS`].
    #[error("raster size {width}x{height} exceeds the pixel limit")]
    RasterTooLarge { width: usize, height: usize },

    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),

    #[error("failed to load image {}: {message}", path.display())]
    ImageLoad { path: PathBuf, message: String },

    #[error("failed to save image {}: {message}", path.display())]
    ImageSave { path: PathBuf, message: String },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
