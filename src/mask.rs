// Mask assembly: the one place raw occupancy grids get labels and become
// images.
//
// All three exports go through `rasterize`, so per-polygon and combined
// masks can never disagree about which pixels are inside.

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use rayon::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::raster::rasterize;
use crate::types::{MaskBuffer, Polygon};

/// Raster size used for exports when nothing else is configured.
pub const DEFAULT_RASTER_SIZE: (usize, usize) = (200, 200);

/// A mask tagged with the 1-based position of its polygon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledMask {
    pub label: usize,
    pub mask: MaskBuffer,
}

impl LabeledMask {
    /// Export key, e.g. `polygon3Mask`.
    pub fn name(&self) -> String {
        format!("polygon{}Mask", self.label)
    }
}

/// Rasterize exactly one polygon.
pub fn export_single(polygon: &Polygon, width: usize, height: usize) -> Result<MaskBuffer> {
    rasterize(std::slice::from_ref(polygon), width, height)
}

/// Rasterize the whole set into one mask (union).
pub fn export_combined(polygons: &[Polygon], width: usize, height: usize) -> Result<MaskBuffer> {
    if polygons.is_empty() {
        return Err(Error::EmptySet);
    }
    rasterize(polygons, width, height)
}

/// One mask per polygon, in set order, labelled 1..=n.
///
/// Polygons are independent, so they are rasterized in parallel; the input
/// is borrowed immutably for the whole call.
pub fn export_per_polygon(
    polygons: &[Polygon],
    width: usize,
    height: usize,
) -> Result<Vec<LabeledMask>> {
    if polygons.is_empty() {
        return Err(Error::EmptySet);
    }
    polygons
        .par_iter()
        .enumerate()
        .map(|(i, polygon)| {
            let mask = export_single(polygon, width, height).map_err(|e| match e {
                Error::InvalidPolygon { reason, .. } => Error::InvalidPolygon { index: i, reason },
                other => other,
            })?;
            Ok(LabeledMask { label: i + 1, mask })
        })
        .collect()
}

impl MaskBuffer {
    /// Visualisation: value×255 on R, G and B, alpha always 255.
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let (w, h) = self.image_dims()?;
        let mut rgba = Vec::with_capacity(self.as_bytes().len() * 4);
        for &v in self.as_bytes() {
            let c = v.saturating_mul(255);
            rgba.extend_from_slice(&[c, c, c, 255]);
        }
        RgbaImage::from_raw(w, h, rgba).ok_or_else(|| {
            Error::RenderTargetUnavailable(format!("cannot build {w}x{h} RGBA image"))
        })
    }

    /// Single-channel 0/255 image.
    pub fn to_luma_image(&self) -> Result<GrayImage> {
        let (w, h) = self.image_dims()?;
        let data = self.as_bytes().iter().map(|&v| v.saturating_mul(255)).collect();
        GrayImage::from_raw(w, h, data).ok_or_else(|| {
            Error::RenderTargetUnavailable(format!("cannot build {w}x{h} grey image"))
        })
    }

    /// Write the RGBA visualisation to `path`; format follows the extension.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_rgba_image()?.save(path).map_err(|e| Error::ImageSave {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn image_dims(&self) -> Result<(u32, u32)> {
        let w = u32::try_from(self.width())
            .map_err(|_| Error::RenderTargetUnavailable(format!("width {} too large", self.width())))?;
        let h = u32::try_from(self.height())
            .map_err(|_| Error::RenderTargetUnavailable(format!("height {} too large", self.height())))?;
        Ok((w, h))
    }
}

/// Write every labelled mask plus the combined mask into `dir`.
/// Returns the written paths, per-polygon files first.
///
/// A `dir` that is not a directory and cannot be created is reported as
/// [`Error::RenderTargetUnavailable`] before anything is written.
pub fn save_all(masks: &[LabeledMask], combined: &MaskBuffer, dir: &Path) -> Result<Vec<PathBuf>> {
    prepare_output_dir(dir)?;
    let mut written = Vec::with_capacity(masks.len() + 1);
    for m in masks {
        let path = dir.join(format!("{}.png", m.name()));
        m.mask.save_png(&path)?;
        written.push(path);
    }
    let path = dir.join("combined.png");
    combined.save_png(&path)?;
    written.push(path);
    info!(count = written.len(), dir = %dir.display(), "masks written");
    Ok(written)
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return Err(Error::RenderTargetUnavailable(format!("{}: {e}", dir.display())));
    }
    if !dir.is_dir() {
        return Err(Error::RenderTargetUnavailable(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(())
}
