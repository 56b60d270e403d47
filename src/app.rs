// Interactive session: window input drives the capture, the scene redraws,
// E exports masks for every finished polygon.
//
// Controls:
// • Left click: add a vertex, or close the polygon when near its first vertex.
// • N closes the current polygon wherever the cursor is.
// • R resets all polygons. E exports masks. ESC quits.

use tracing::{info, warn};

use crate::background::{BackgroundCache, PLAIN_BACKGROUND};
use crate::capture::{Capture, ClickOutcome};
use crate::config::Config;
use crate::draw::Drawer;
use crate::error::{Error, Result};
use crate::mask::{LabeledMask, export_combined, export_per_polygon, save_all};
use crate::scene::Scene;
use crate::types::{FrameBuffer, MaskBuffer, Polygon};

/// Everything one export produced.
#[derive(Debug)]
pub struct ExportSummary {
    pub masks: Vec<LabeledMask>,
    pub combined: MaskBuffer,
}

/// Map polygons drawn on the canvas into raster space, if configured to.
pub fn polygons_for_export(polygons: &[Polygon], config: &Config) -> Vec<Polygon> {
    if config.scale_to_raster {
        polygons
            .iter()
            .map(|p| p.rescale(config.canvas_size(), config.raster_size()))
            .collect()
    } else {
        polygons.to_vec()
    }
}

/// Rasterize a snapshot of the polygon set at the configured raster size.
pub fn export_masks(snapshot: &[Polygon], config: &Config) -> Result<ExportSummary> {
    let polygons = polygons_for_export(snapshot, config);
    let (w, h) = config.raster_size();
    let masks = export_per_polygon(&polygons, w, h)?;
    let combined = export_combined(&polygons, w, h)?;
    for m in &masks {
        info!(name = %m.name(), inside = m.mask.count_inside(), "mask exported");
    }
    Ok(ExportSummary { masks, combined })
}

pub fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let (w, h) = config.canvas_size();

    let mut drawer = Drawer::new("Polygon Mask - click to draw, N close, R reset, E export", w, h)?;

    let mut backgrounds = BackgroundCache::new();
    let plain = FrameBuffer::filled(w, h, PLAIN_BACKGROUND);
    if let Some(path) = &config.background {
        if let Err(e) = backgrounds.load_once(path, w, h) {
            warn!(error = %e, "falling back to plain background");
        }
    }

    let mut capture = Capture::with_threshold(config.close_threshold);
    let scene = Scene::attach(&mut capture, w, h);
    let mut screen = FrameBuffer::filled(w, h, 0);

    info!(width = w, height = h, "canvas ready");

    while drawer.is_open() && !drawer.esc_pressed() {
        if drawer.left_clicked() {
            if let Some(pos) = drawer.mouse_pos() {
                if let ClickOutcome::Closed(Some(label)) = capture.click(pos) {
                    info!(label, "polygon finished");
                }
            }
        }
        if drawer.n_pressed_once() {
            if let Some(label) = capture.finish() {
                info!(label, "polygon finished");
            }
        }
        if drawer.r_pressed_once() {
            capture.reset();
            info!("all polygons cleared");
        }
        if drawer.e_pressed_once() {
            export(&capture, config);
        }

        let background = backgrounds.current().unwrap_or(&plain);
        scene.borrow().compose(background, &mut screen);
        drawer.present(&screen)?;
    }

    Ok(())
}

/// Export failures are reported and the session continues.
/// Returns true when every mask was written.
fn export(capture: &Capture, config: &Config) -> bool {
    let snapshot = capture.snapshot();
    let summary = match export_masks(&snapshot, config) {
        Ok(summary) => summary,
        Err(Error::EmptySet) => {
            warn!("no polygons to export");
            return false;
        }
        Err(e) => {
            warn!(error = %e, "export failed");
            return false;
        }
    };
    match save_all(&summary.masks, &summary.combined, &config.output_dir) {
        Ok(paths) => {
            info!(files = paths.len(), dir = %config.output_dir.display(), "export done");
            true
        }
        Err(e) => {
            warn!(error = %e, "could not write masks");
            false
        }
    }
}
