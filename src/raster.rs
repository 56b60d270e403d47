// Polygon -> binary mask rasterizer.
// Scanline fill with the even-odd rule, sampled at pixel centers.
// Each polygon is filled on its own and OR-ed into the same grid, so
// overlapping polygons stay inside (union), they never cancel out.
//
// Vertex coordinates are read in the grid's own pixel space. No scaling
// happens here; callers rescale first (see `Polygon::rescale`).

use crate::error::{Error, Result};
use crate::types::{MaskBuffer, Vertex};

/// Largest grid `rasterize` will allocate (256 Mi pixels, one byte each).
pub const MAX_RASTER_PIXELS: usize = 1 << 28;

/// Fill every loop in `polygons` into a fresh `width` x `height` mask.
///
/// A pixel (x, y) is inside when its center (x + 0.5, y + 0.5) is enclosed
/// by an odd number of edges of at least one loop. Centers lying exactly on
/// a left/top edge count as inside, on a right/bottom edge as outside.
///
/// Fails with [`Error::InvalidPolygon`] if a loop has fewer than three
/// vertices or a non-finite coordinate; nothing is rasterized in that case.
/// Grids above [`MAX_RASTER_PIXELS`] fail with [`Error::RasterTooLarge`].
pub fn rasterize<P: AsRef<[Vertex]>>(
    polygons: &[P],
    width: usize,
    height: usize,
) -> Result<MaskBuffer> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyRaster { width, height });
    }
    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_RASTER_PIXELS => {}
        _ => return Err(Error::RasterTooLarge { width, height }),
    }
    for (index, poly) in polygons.iter().enumerate() {
        validate(index, poly.as_ref())?;
    }

    let mut mask = MaskBuffer::zeroed(width, height);
    let mut crossings = Vec::new();
    for poly in polygons {
        fill_even_odd(&mut mask, poly.as_ref(), &mut crossings);
    }
    Ok(mask)
}

fn validate(index: usize, vertices: &[Vertex]) -> Result<()> {
    if vertices.len() < 3 {
        return Err(Error::InvalidPolygon {
            index,
            reason: format!("{} vertices, need at least 3", vertices.len()),
        });
    }
    if let Some(v) = vertices.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidPolygon {
            index,
            reason: format!("non-finite vertex ({}, {})", v.x, v.y),
        });
    }
    Ok(())
}

/// Scanline fill of one loop. `crossings` is scratch space reused across calls.
fn fill_even_odd(mask: &mut MaskBuffer, vertices: &[Vertex], crossings: &mut Vec<f64>) {
    let width = mask.width();
    let height = mask.height();

    // Only rows whose center lies within the loop's vertical extent can hit.
    let (min_y, max_y) = vertices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| {
        let y = v.y as f64;
        (lo.min(y), hi.max(y))
    });
    let first_row = clamp_index(min_y - 0.5, height);
    let last_row = clamp_index(max_y - 0.5, height);

    for row in first_row..last_row {
        let cy = row as f64 + 0.5;

        crossings.clear();
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            let (ax, ay) = (a.x as f64, a.y as f64);
            let (bx, by) = (b.x as f64, b.y as f64);
            // Half-open test: horizontal edges never cross, and a vertex
            // shared by two edges is counted exactly once.
            if (ay <= cy) != (by <= cy) {
                crossings.push(ax + (cy - ay) * (bx - ax) / (by - ay));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for pair in crossings.chunks_exact(2) {
            let x0 = clamp_index(pair[0] - 0.5, width);
            let x1 = clamp_index(pair[1] - 0.5, width);
            if x0 < x1 {
                mask.fill_span(row, x0, x1);
            }
        }
    }
}

/// First pixel index whose center is at or beyond `edge + 0.5`, clamped to `0..=limit`.
#[inline]
fn clamp_index(edge: f64, limit: usize) -> usize {
    let i = edge.ceil();
    if i <= 0.0 {
        0
    } else if i >= limit as f64 {
        limit
    } else {
        i as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Vec<Vertex> {
        vec![
            Vertex::new(x, y),
            Vertex::new(x + side, y),
            Vertex::new(x + side, y + side),
            Vertex::new(x, y + side),
        ]
    }

    #[test]
    fn axis_aligned_square_covers_exact_pixels() {
        let mask = rasterize(&[square(2.0, 3.0, 4.0)], 10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (3..7).contains(&y);
                assert_eq!(mask.get(x, y), inside as u8, "pixel ({x}, {y})");
            }
        }
        assert_eq!(mask.count_inside(), 16);
    }

    #[test]
    fn winding_direction_does_not_matter() {
        let mut ccw = square(1.0, 1.0, 5.0);
        let cw_mask = rasterize(&[ccw.clone()], 8, 8).unwrap();
        ccw.reverse();
        let ccw_mask = rasterize(&[ccw], 8, 8).unwrap();
        assert_eq!(cw_mask, ccw_mask);
    }

    #[test]
    fn concave_polygon_leaves_notch_empty() {
        // L shape: 6x6 square with the top-right 3x3 quadrant cut out.
        let l_shape = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(3.0, 0.0),
            Vertex::new(3.0, 3.0),
            Vertex::new(6.0, 3.0),
            Vertex::new(6.0, 6.0),
            Vertex::new(0.0, 6.0),
        ];
        let mask = rasterize(&[l_shape], 6, 6).unwrap();
        assert_eq!(mask.get(4, 1), 0);
        assert_eq!(mask.get(1, 1), 1);
        assert_eq!(mask.get(4, 4), 1);
        assert_eq!(mask.count_inside(), 27);
    }

    #[test]
    fn self_intersecting_star_uses_even_odd() {
        // Pentagram: the central pentagon is crossed twice, so it stays empty.
        let c = 50.0_f32;
        let r = 40.0_f32;
        let star: Vec<Vertex> = (0..5)
            .map(|i| {
                let a = -std::f32::consts::FRAC_PI_2 + (i * 2) as f32 * std::f32::consts::TAU / 5.0;
                Vertex::new(c + r * a.cos(), c + r * a.sin())
            })
            .collect();
        let mask = rasterize(&[star], 100, 100).unwrap();
        assert_eq!(mask.get(50, 50), 0);
        // A point inside the top spike.
        assert_eq!(mask.get(50, 20), 1);
    }

    #[test]
    fn overlapping_polygons_union_instead_of_xor() {
        let a = square(0.0, 0.0, 6.0);
        let b = square(3.0, 3.0, 6.0);
        let mask = rasterize(&[a, b], 10, 10).unwrap();
        assert_eq!(mask.get(4, 4), 1);
        assert_eq!(mask.count_inside(), 36 + 36 - 9);
    }

    #[test]
    fn geometry_outside_grid_is_clipped() {
        let big = square(-5.0, -5.0, 100.0);
        let mask = rasterize(&[big], 4, 3).unwrap();
        assert_eq!(mask.count_inside(), 12);

        let away = square(50.0, 50.0, 5.0);
        let mask = rasterize(&[away], 4, 3).unwrap();
        assert_eq!(mask.count_inside(), 0);
    }

    #[test]
    fn empty_input_gives_empty_mask() {
        let none: [Vec<Vertex>; 0] = [];
        let mask = rasterize(&none, 3, 2).unwrap();
        assert_eq!(mask.as_bytes(), &[0; 6]);
    }

    #[test]
    fn degenerate_loop_is_rejected() {
        let good = square(0.0, 0.0, 2.0);
        let bad = vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)];
        match rasterize(&[good, bad], 4, 4) {
            Err(Error::InvalidPolygon { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidPolygon, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_vertex_is_rejected() {
        let nan = vec![Vertex::new(0.0, 0.0), Vertex::new(f32::NAN, 1.0), Vertex::new(1.0, 1.0)];
        assert!(matches!(
            rasterize(&[nan], 4, 4),
            Err(Error::InvalidPolygon { index: 0, .. })
        ));
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        assert!(matches!(
            rasterize(&[square(0.0, 0.0, 1.0)], 0, 5),
            Err(Error::EmptyRaster { width: 0, height: 5 })
        ));
    }

    #[test]
    fn oversized_raster_is_rejected_without_allocating() {
        let tri = vec![Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0), Vertex::new(0.0, 4.0)];
        assert!(matches!(
            rasterize(&[tri.clone()], usize::MAX, 2),
            Err(Error::RasterTooLarge { width: usize::MAX, height: 2 })
        ));
        assert!(matches!(
            rasterize(&[tri.clone()], 100_000, 100_000),
            Err(Error::RasterTooLarge { .. })
        ));
        assert!(rasterize(&[tri], 4096, 4096).is_ok());
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let tri = vec![Vertex::new(1.3, 0.7), Vertex::new(17.9, 4.2), Vertex::new(6.6, 15.1)];
        let a = rasterize(&[tri.clone()], 20, 20).unwrap();
        let b = rasterize(&[tri], 20, 20).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
