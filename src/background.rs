// Background image for the canvas.
// Loaded once per session and kept so a reset can redraw it without touching disk.
// The cache lives in whatever owns the session (the app loop), never in a global.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::FrameBuffer;

/// Neutral grey used when no background image is configured.
pub const PLAIN_BACKGROUND: u32 = 0x00_40_40_40;

#[derive(Default)]
pub struct BackgroundCache {
    cached: Option<(PathBuf, FrameBuffer)>,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` scaled to `width` x `height` the first time it is asked
    /// for; later calls with the same path return the cached frame untouched.
    pub fn load_once(&mut self, path: &Path, width: usize, height: usize) -> Result<&FrameBuffer> {
        let hit = matches!(&self.cached, Some((p, _)) if p == path);
        if !hit {
            let frame = decode_scaled(path, width, height)?;
            debug!(path = %path.display(), width, height, "background loaded");
            self.cached = Some((path.to_path_buf(), frame));
        }
        match &self.cached {
            Some((_, frame)) => Ok(frame),
            None => Err(Error::ImageLoad {
                path: path.to_path_buf(),
                message: "background cache empty after load".into(),
            }),
        }
    }

    /// The cached frame, if a load has succeeded.
    pub fn current(&self) -> Option<&FrameBuffer> {
        self.cached.as_ref().map(|(_, frame)| frame)
    }
}

/// Decode any format `image` understands and pack it as 0x00RRGGBB.
fn decode_scaled(path: &Path, width: usize, height: usize) -> Result<FrameBuffer> {
    let load_err = |message: String| Error::ImageLoad { path: path.to_path_buf(), message };

    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(load_err(format!("bad target size {width}x{height}"))),
    };

    let rgb = image::open(path).map_err(|e| load_err(e.to_string()))?.to_rgb8();
    let rgb = if rgb.dimensions() == (w, h) {
        rgb
    } else {
        imageops::resize(&rgb, w, h, FilterType::Triangle)
    };

    let mut pixels = Vec::with_capacity(width * height);
    for px in rgb.pixels() {
        let r = px[0] as u32;
        let g = px[1] as u32;
        let b = px[2] as u32;
        pixels.push((r << 16) | (g << 8) | b);
    }

    Ok(FrameBuffer { width, height, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn loads_scales_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbImage::from_pixel(4, 4, Rgb([0x12, 0x34, 0x56])).save(&path).unwrap();

        let mut cache = BackgroundCache::new();
        let frame = cache.load_once(&path, 8, 2).unwrap();
        assert_eq!((frame.width, frame.height), (8, 2));
        let red = (frame.pixels[0] >> 16) & 0xFF;
        assert!(red.abs_diff(0x12) <= 1, "red channel {red:#x}");

        // Deleting the file proves the second call never hits the disk.
        std::fs::remove_file(&path).unwrap();
        assert!(cache.load_once(&path, 8, 2).is_ok());
        assert!(cache.current().is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut cache = BackgroundCache::new();
        let err = cache.load_once(Path::new("/nonexistent/bg.jpg"), 10, 10);
        assert!(matches!(err, Err(Error::ImageLoad { .. })));
        assert!(cache.current().is_none());
    }
}
