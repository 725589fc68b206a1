// SPDX-License-Identifier: MPL-2.0
//! Frame blitting with pixel replication.

use crate::error::Result;
use crate::player::geometry::Geometry;
use crate::player::io::{PixelSurface, RgbFrame};

/// Blits rescaled frames onto a [`PixelSurface`], replicating each pixel
/// into a `magnify × magnify` block.
#[derive(Debug)]
pub struct FrameRenderer {
    geometry: Geometry,
    /// Reused row buffer of packed pixels.
    run: Vec<u32>,
}

impl FrameRenderer {
    pub fn new(geometry: Geometry) -> Self {
        let magnify = geometry.magnify as usize;
        Self {
            geometry,
            run: Vec::with_capacity(geometry.render_width as usize * magnify),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Draws the top-left `render_width × render_height` region of `frame`.
    pub fn blit(&mut self, frame: &RgbFrame<'_>, surface: &mut dyn PixelSurface) -> Result<()> {
        let magnify = self.geometry.magnify as usize;
        let rows = (self.geometry.render_height as usize).min(frame.height);
        let cols = (self.geometry.render_width as usize).min(frame.width);

        for y in 0..rows {
            let Some(src) = frame.row(y) else {
                break;
            };
            self.run.clear();
            for rgb in src[..cols * 3].chunks_exact(3) {
                let pixel = surface.pack_color(rgb[0], rgb[1], rgb[2]);
                self.run.extend(std::iter::repeat(pixel).take(magnify));
            }
            for i in 0..magnify {
                surface.write_row(y * magnify + i, 0, &self.run)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::geometry::resolve;

    struct Canvas {
        rows: usize,
        cols: usize,
        pixels: Vec<u32>,
    }

    impl Canvas {
        fn new(cols: usize, rows: usize) -> Self {
            Self {
                rows,
                cols,
                pixels: vec![0; rows * cols],
            }
        }

        fn at(&self, row: usize, col: usize) -> u32 {
            self.pixels[row * self.cols + col]
        }
    }

    impl PixelSurface for Canvas {
        fn rows(&self) -> usize {
            self.rows
        }

        fn cols(&self) -> usize {
            self.cols
        }

        fn pack_color(&self, r: u8, g: u8, b: u8) -> u32 {
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        }

        fn write_row(&mut self, row: usize, col: usize, run: &[u32]) -> Result<()> {
            assert!(row < self.rows, "row {row} out of bounds");
            let end = (col + run.len()).min(self.cols);
            let start = row * self.cols;
            self.pixels[start + col..start + end].copy_from_slice(&run[..end - col]);
            Ok(())
        }
    }

    // 2x2 frame: red, green / blue, white.
    const PIXELS: [u8; 12] = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];

    fn frame() -> RgbFrame<'static> {
        RgbFrame {
            data: &PIXELS,
            stride: 6,
            width: 2,
            height: 2,
        }
    }

    #[test]
    fn blits_without_magnify() {
        let mut canvas = Canvas::new(4, 4);
        let mut renderer = FrameRenderer::new(resolve(2, 2, 1, Some(1), 4, 4));
        renderer.blit(&frame(), &mut canvas).unwrap();

        assert_eq!(canvas.at(0, 0), 0xff0000);
        assert_eq!(canvas.at(0, 1), 0x00ff00);
        assert_eq!(canvas.at(1, 0), 0x0000ff);
        assert_eq!(canvas.at(1, 1), 0xffffff);
        assert_eq!(canvas.at(2, 2), 0);
    }

    #[test]
    fn magnify_replicates_rows_and_columns() {
        let mut canvas = Canvas::new(4, 4);
        let mut renderer = FrameRenderer::new(resolve(2, 2, 1, Some(2), 4, 4));
        renderer.blit(&frame(), &mut canvas).unwrap();

        for (row, col, expected) in [
            (0, 0, 0xff0000),
            (1, 1, 0xff0000),
            (0, 2, 0x00ff00),
            (1, 3, 0x00ff00),
            (2, 0, 0x0000ff),
            (3, 1, 0x0000ff),
            (3, 3, 0xffffff),
        ] {
            assert_eq!(canvas.at(row, col), expected, "({row}, {col})");
        }
    }

    #[test]
    fn clamped_geometry_crops_frame() {
        let mut canvas = Canvas::new(1, 1);
        let mut renderer = FrameRenderer::new(resolve(2, 2, 1, Some(1), 1, 1));
        renderer.blit(&frame(), &mut canvas).unwrap();
        assert_eq!(canvas.pixels, vec![0xff0000]);
    }

    #[test]
    fn short_frame_buffer_stops_early() {
        let data = [9u8; 6];
        let short = RgbFrame {
            data: &data,
            stride: 6,
            width: 2,
            height: 2,
        };
        let mut canvas = Canvas::new(2, 2);
        let mut renderer = FrameRenderer::new(resolve(2, 2, 1, Some(1), 2, 2));
        renderer.blit(&short, &mut canvas).unwrap();
        assert_eq!(canvas.at(0, 0), 0x090909);
        assert_eq!(canvas.at(1, 0), 0);
    }
}
