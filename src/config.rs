// Session configuration: defaults, optional TOML file, validation.
// CLI flags are applied on top in main.rs.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::capture::CLOSE_THRESHOLD;
use crate::error::{Error, Result};
use crate::mask::DEFAULT_RASTER_SIZE;

/// Longest side accepted for the canvas and the export raster.
pub const MAX_SIDE: usize = 16_384;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// On-screen canvas, in pixels.
    pub canvas_width: usize,
    pub canvas_height: usize,
    /// Export raster, in pixels. Independent of the canvas.
    pub raster_width: usize,
    pub raster_height: usize,
    /// Click this close to the first vertex to close a polygon.
    pub close_threshold: f32,
    pub background: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Rescale vertices from canvas space into raster space before export.
    pub scale_to_raster: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            raster_width: DEFAULT_RASTER_SIZE.0,
            raster_height: DEFAULT_RASTER_SIZE.1,
            close_threshold: CLOSE_THRESHOLD,
            background: None,
            output_dir: PathBuf::from("masks"),
            scale_to_raster: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn canvas_size(&self) -> (usize, usize) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn raster_size(&self) -> (usize, usize) {
        (self.raster_width, self.raster_height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::Config(format!(
                "canvas size {}x{} must be non-zero",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.raster_width == 0 || self.raster_height == 0 {
            return Err(Error::Config(format!(
                "raster size {}x{} must be non-zero",
                self.raster_width, self.raster_height
            )));
        }
        for (what, (w, h)) in [("canvas", self.canvas_size()), ("raster", self.raster_size())] {
            if w > MAX_SIDE || h > MAX_SIDE {
                return Err(Error::Config(format!(
                    "{what} size {w}x{h} exceeds {MAX_SIDE} pixels per side"
                )));
            }
        }
        if !self.close_threshold.is_finite() || self.close_threshold <= 0.0 {
            return Err(Error::Config(format!(
                "close threshold {} must be a positive number",
                self.close_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_export_conventions() {
        let c = Config::default();
        assert_eq!(c.raster_size(), (200, 200));
        assert_eq!(c.close_threshold, 10.0);
        assert!(c.scale_to_raster);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = Config::from_toml_str("raster_width = 64\nbackground = \"bg.jpg\"\n").unwrap();
        assert_eq!(c.raster_size(), (64, 200));
        assert_eq!(c.background.as_deref(), Some(Path::new("bg.jpg")));
        assert_eq!(c.canvas_size(), (800, 600));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(Config::from_toml_str("colour = 1"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml_str("raster_height = 0"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml_str("close_threshold = -2.0"), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_sizes_beyond_limit() {
        let huge = format!("raster_width = {}", usize::MAX);
        assert!(Config::from_toml_str(&huge).is_err());
        assert!(matches!(
            Config::from_toml_str("canvas_height = 20000"),
            Err(Error::Config(_))
        ));
        assert!(Config::from_toml_str("raster_width = 16384\nraster_height = 16384").is_ok());
    }
}
