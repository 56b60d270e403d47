// Window + software drawing utilities.
// Visual pieces provided here:
// 1) A window that shows the canvas (background + polygons).
// 2) Vertex markers and connecting edges for the polygon being drawn.
// 3) Translucent fills for finished polygons, driven by their masks.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::{FrameBuffer, MaskBuffer, Vertex};

pub struct Drawer {
    window: Window,
    mouse_was_down: bool,
}

impl Drawer {
    /// Create a window sized to the canvas.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, mouse_was_down: false })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Cursor position in canvas pixels, `None` outside the window.
    pub fn mouse_pos(&self) -> Option<Vertex> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Vertex::new(x, y))
    }

    /// True once per press of the left button (minifb only reports levels).
    pub fn left_clicked(&mut self) -> bool {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let clicked = down && !self.mouse_was_down;
        self.mouse_was_down = down;
        clicked
    }

    // N: close the polygon being drawn.
    pub fn n_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::N, KeyRepeat::No)
    }

    // R: drop every polygon.
    pub fn r_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }

    // E: export masks.
    pub fn e_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::E, KeyRepeat::No)
    }
}

/* ---------- Software drawing on a FrameBuffer ---------- */

pub const MARKER_RADIUS: i32 = 5;
pub const MARKER_FILL: u32 = 0x00_00_00_FF;
pub const EDGE_COLOR: u32 = 0x00_FF_A5_00;
pub const OUTLINE_COLOR: u32 = 0x00_00_00_00;
pub const FILL_COLOR: u32 = 0x00_00_D2_FF;
pub const FILL_ALPHA: u8 = 0x59;

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// 1-pixel Bresenham line from (x0,y0) to (x1,y1).
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x, mut y) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// 2-pixel wide line, close enough to a stroke width of 2.
fn draw_thick_line(fb: &mut FrameBuffer, a: Vertex, b: Vertex, color: u32) {
    let (x0, y0) = (a.x.round() as i32, a.y.round() as i32);
    let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
    draw_line(fb, x0, y0, x1, y1, color);
    if (x1 - x0).abs() > (y1 - y0).abs() {
        draw_line(fb, x0, y0 + 1, x1, y1 + 1, color);
    } else {
        draw_line(fb, x0 + 1, y0, x1 + 1, y1, color);
    }
}

/// Open polyline through `points` (the in-progress edges).
pub fn draw_polyline(fb: &mut FrameBuffer, points: &[Vertex], color: u32) {
    for pair in points.windows(2) {
        draw_thick_line(fb, pair[0], pair[1], color);
    }
}

/// Closed outline through `points`, last vertex joined back to the first.
pub fn draw_outline(fb: &mut FrameBuffer, points: &[Vertex], color: u32) {
    draw_polyline(fb, points, color);
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        draw_thick_line(fb, last, first, color);
    }
}

/// Vertex marker: filled disc with a 1-pixel ring.
pub fn draw_marker(fb: &mut FrameBuffer, at: Vertex, fill: u32, ring: u32) {
    let (cx, cy) = (at.x.round() as i32, at.y.round() as i32);
    let r = MARKER_RADIUS;
    let outer = r * r;
    let inner = (r - 1) * (r - 1);
    for y in -r..=r {
        for x in -r..=r {
            let d2 = x * x + y * y;
            if d2 > outer {
                continue;
            }
            let color = if d2 > inner { ring } else { fill };
            put_pixel(fb, cx + x, cy + y, color);
        }
    }
}

/// Blend `color` at `alpha` into every pixel the mask marks inside.
/// Returns false, leaving `fb` untouched, when the mask is not frame-sized.
pub fn tint_mask(fb: &mut FrameBuffer, mask: &MaskBuffer, color: u32, alpha: u8) -> bool {
    if mask.width() != fb.width || mask.height() != fb.height {
        return false;
    }
    let a = alpha as u32;
    let inv = 255 - a;
    for (px, &inside) in fb.pixels.iter_mut().zip(mask.as_bytes()) {
        if inside == 0 {
            continue;
        }
        let old = *px;
        let mix = |shift: u32| {
            let dst = (old >> shift) & 0xFF;
            let src = (color >> shift) & 0xFF;
            ((src * a + dst * inv + 127) / 255) << shift
        };
        *px = mix(16) | mix(8) | mix(0);
    }
    true
}
