// Draw polygons over an image and export one binary mask per polygon.
//
// The core is three pieces: `capture::Capture` turns clicks into closed
// polygons, `raster::rasterize` fills vertex loops into a `MaskBuffer`
// with the even-odd rule, and `mask` labels the results for export.
// `app` wires them to a minifb window.

pub mod app;
pub mod background;
pub mod capture;
pub mod config;
pub mod draw;
pub mod error;
pub mod mask;
pub mod raster;
pub mod scene;
pub mod types;

pub use capture::{Capture, CaptureEvent, CaptureState, ClickOutcome, CloseOutcome, CLOSE_THRESHOLD};
pub use error::{Error, Result};
pub use mask::{LabeledMask, export_combined, export_per_polygon, export_single};
pub use raster::rasterize;
pub use types::{MaskBuffer, Polygon, Vertex};
