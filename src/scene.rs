// Visual feedback for the capture, kept in two layers.
//
// The temporary layer holds vertex markers and the connecting edges of the
// polygon being drawn; it is wiped on every closure. The main layer holds
// finished polygons (outline plus translucent fill). The scene only learns
// about changes through `CaptureEvent`s.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::warn;

use crate::capture::{Capture, CaptureEvent};
use crate::draw::{
    EDGE_COLOR, FILL_ALPHA, FILL_COLOR, MARKER_FILL, OUTLINE_COLOR, draw_marker, draw_outline,
    draw_polyline, tint_mask,
};
use crate::raster::rasterize;
use crate::types::{FrameBuffer, MaskBuffer, Vertex};

struct FilledPolygon {
    outline: Vec<Vertex>,
    coverage: MaskBuffer,
}

pub struct Scene {
    width: usize,
    height: usize,
    markers: Vec<Vertex>,
    edges: Vec<Vertex>,
    filled: Vec<FilledPolygon>,
    // Size mismatches are reported on the first frame only.
    size_warned: Cell<bool>,
}

impl Scene {
    /// Empty scene for a `width` x `height` canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            markers: Vec::new(),
            edges: Vec::new(),
            filled: Vec::new(),
            size_warned: Cell::new(false),
        }
    }

    /// Create a scene and subscribe it to `capture`.
    pub fn attach(capture: &mut Capture, width: usize, height: usize) -> Rc<RefCell<Scene>> {
        let scene = Rc::new(RefCell::new(Scene::new(width, height)));
        let sink = Rc::clone(&scene);
        capture.subscribe(move |event| sink.borrow_mut().handle(event));
        scene
    }

    pub fn handle(&mut self, event: &CaptureEvent<'_>) {
        match event {
            CaptureEvent::VertexAdded { vertex, pending } => {
                self.markers.push(*vertex);
                if pending.len() > 1 {
                    self.edges = pending.to_vec();
                }
            }
            CaptureEvent::PolygonClosed { label, polygon } => {
                self.clear_temporary();
                // Fill coverage is computed once, at canvas resolution.
                match rasterize(std::slice::from_ref(*polygon), self.width, self.height) {
                    Ok(coverage) => self.filled.push(FilledPolygon {
                        outline: polygon.vertices().to_vec(),
                        coverage,
                    }),
                    Err(e) => warn!(label, error = %e, "cannot fill polygon on canvas"),
                }
            }
            CaptureEvent::BufferDiscarded { .. } => self.clear_temporary(),
            CaptureEvent::Reset => {
                self.clear_temporary();
                self.filled.clear();
            }
        }
    }

    fn clear_temporary(&mut self) {
        self.markers.clear();
        self.edges.clear();
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Vertices of the connecting polyline (empty below two vertices).
    pub fn edges(&self) -> &[Vertex] {
        &self.edges
    }

    pub fn polygon_count(&self) -> usize {
        self.filled.len()
    }

    /// Paint background, main layer, then temporary layer into `screen`.
    /// A background or screen of the wrong size is drawn as black, with
    /// one warning for the lifetime of the scene.
    pub fn compose(&self, background: &FrameBuffer, screen: &mut FrameBuffer) {
        let sized = |fb: &FrameBuffer| {
            fb.width == self.width && fb.height == self.height && fb.pixels.len() == fb.width * fb.height
        };
        if sized(background) && sized(screen) {
            screen.pixels.copy_from_slice(&background.pixels);
        } else {
            screen.pixels.fill(0);
            self.warn_size_once(background, screen);
        }

        for poly in &self.filled {
            if !tint_mask(screen, &poly.coverage, FILL_COLOR, FILL_ALPHA) {
                self.warn_size_once(background, screen);
            }
            draw_outline(screen, &poly.outline, OUTLINE_COLOR);
        }

        draw_polyline(screen, &self.edges, EDGE_COLOR);
        for &m in &self.markers {
            draw_marker(screen, m, MARKER_FILL, EDGE_COLOR);
        }
    }

    /// True once a size mismatch has been reported.
    pub fn size_mismatch_reported(&self) -> bool {
        self.size_warned.get()
    }

    fn warn_size_once(&self, background: &FrameBuffer, screen: &FrameBuffer) {
        if self.size_warned.replace(true) {
            return;
        }
        warn!(
            canvas = %format!("{}x{}", self.width, self.height),
            background = %format!("{}x{}", background.width, background.height),
            screen = %format!("{}x{}", screen.width, screen.height),
            "frame size does not match canvas, drawing on black"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: u32 = 0x00_10_20_30;

    fn v(x: f32, y: f32) -> Vertex {
        Vertex::new(x, y)
    }

    #[test]
    fn temporary_layer_tracks_buffer() {
        let mut capture = Capture::new();
        let scene = Scene::attach(&mut capture, 100, 100);

        capture.click(v(10.0, 10.0));
        assert_eq!(scene.borrow().marker_count(), 1);
        assert!(scene.borrow().edges().is_empty());

        capture.click(v(60.0, 10.0));
        capture.click(v(60.0, 60.0));
        assert_eq!(scene.borrow().marker_count(), 3);
        assert_eq!(scene.borrow().edges().len(), 3);

        capture.click(v(12.0, 12.0));
        let s = scene.borrow();
        assert_eq!(s.marker_count(), 0);
        assert!(s.edges().is_empty());
        assert_eq!(s.polygon_count(), 1);
    }

    #[test]
    fn discarded_buffer_clears_markers_only() {
        let mut capture = Capture::new();
        let scene = Scene::attach(&mut capture, 50, 50);
        capture.click(v(5.0, 5.0));
        capture.finish();
        assert_eq!(scene.borrow().marker_count(), 0);
        assert_eq!(scene.borrow().polygon_count(), 0);
    }

    #[test]
    fn compose_tints_closed_polygon_and_reset_restores_background() {
        let mut capture = Capture::new();
        let scene = Scene::attach(&mut capture, 40, 40);
        for p in [v(5.0, 5.0), v(35.0, 5.0), v(35.0, 35.0), v(5.0, 35.0)] {
            capture.add_vertex(p);
        }
        capture.finish();

        let background = FrameBuffer::filled(40, 40, BG);
        let mut screen = FrameBuffer::filled(40, 40, 0);
        scene.borrow().compose(&background, &mut screen);
        assert_ne!(screen.pixels[20 * 40 + 20], BG);
        assert_eq!(screen.pixels[0], BG);

        capture.reset();
        scene.borrow().compose(&background, &mut screen);
        assert!(screen.pixels.iter().all(|&p| p == BG));
    }

    #[test]
    fn mismatched_background_is_reported_and_drawn_black() {
        let mut capture = Capture::new();
        let scene = Scene::attach(&mut capture, 20, 20);
        let background = FrameBuffer::filled(30, 10, BG);
        let mut screen = FrameBuffer::filled(20, 20, 0x00_FF_FF_FF);

        assert!(!scene.borrow().size_mismatch_reported());
        scene.borrow().compose(&background, &mut screen);
        assert!(scene.borrow().size_mismatch_reported());
        assert!(screen.pixels.iter().all(|&p| p == 0));

        let matching = FrameBuffer::filled(20, 20, BG);
        scene.borrow().compose(&matching, &mut screen);
        assert!(screen.pixels.iter().all(|&p| p == BG));
    }
}
