// Core types shared by capture, rasterizer, mask assembly and the scene.

/// A clicked point in pixel space. Immutable once recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

impl Vertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Vertex) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A closed vertex loop with at least three vertices.
/// The last vertex connects back to the first; the closing edge is implicit.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
}

impl Polygon {
    pub const MIN_VERTICES: usize = 3;

    /// Returns `None` for fewer than three vertices.
    pub fn new(vertices: Vec<Vertex>) -> Option<Self> {
        if vertices.len() < Self::MIN_VERTICES {
            return None;
        }
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Map the loop from one pixel space into another of a different size,
    /// e.g. from the on-screen canvas into the export raster.
    pub fn rescale(&self, from: (usize, usize), to: (usize, usize)) -> Polygon {
        let sx = if from.0 == 0 { 1.0 } else { to.0 as f32 / from.0 as f32 };
        let sy = if from.1 == 0 { 1.0 } else { to.1 as f32 / from.1 as f32 };
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex::new(v.x * sx, v.y * sy))
            .collect();
        Polygon { vertices }
    }
}

impl AsRef<[Vertex]> for Polygon {
    fn as_ref(&self) -> &[Vertex] {
        &self.vertices
    }
}

/// Screen-sized RGB frame, each entry is 0x00RRGGBB for minifb.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/// Binary occupancy grid, row-major, origin top-left.
/// 1 = inside at least one polygon, 0 = outside all of them.
/// Dimensions are fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl MaskBuffer {
    pub(crate) fn zeroed(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major values, one byte per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Value at (x, y), 0 when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Number of pixels marked inside.
    pub fn count_inside(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Pixel-wise OR of two masks. `None` when the sizes differ.
    pub fn union(&self, other: &MaskBuffer) -> Option<MaskBuffer> {
        if self.width != other.width || self.height != other.height {
            return None;
        }
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a | b).collect();
        Some(MaskBuffer { width: self.width, height: self.height, data })
    }

    /// Mark columns `x0..x1` of row `y` as inside. Caller clamps the range.
    pub(crate) fn fill_span(&mut self, y: usize, x0: usize, x1: usize) {
        let row = y * self.width;
        for v in &mut self.data[row + x0..row + x1] {
            *v = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_needs_three_vertices() {
        let two = vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)];
        assert!(Polygon::new(two).is_none());

        let three = vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(0.0, 1.0)];
        let poly = Polygon::new(three).unwrap();
        assert_eq!(poly.vertex_count(), 3);
    }

    #[test]
    fn rescale_maps_canvas_to_raster() {
        let poly = Polygon::new(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(800.0, 0.0),
            Vertex::new(400.0, 600.0),
        ])
        .unwrap();
        let scaled = poly.rescale((800, 600), (200, 200));
        assert_eq!(scaled.vertices()[1], Vertex::new(200.0, 0.0));
        assert_eq!(scaled.vertices()[2], Vertex::new(100.0, 200.0));
    }

    #[test]
    fn union_rejects_size_mismatch() {
        let a = MaskBuffer::zeroed(4, 4);
        let b = MaskBuffer::zeroed(4, 5);
        assert!(a.union(&b).is_none());
    }

    #[test]
    fn fill_span_marks_row_range() {
        let mut m = MaskBuffer::zeroed(5, 2);
        m.fill_span(1, 1, 4);
        assert_eq!(m.as_bytes(), &[0, 0, 0, 0, 0, 0, 1, 1, 1, 0]);
        assert_eq!(m.count_inside(), 3);
        assert_eq!(m.get(2, 1), 1);
        assert_eq!(m.get(9, 9), 0);
    }
}
