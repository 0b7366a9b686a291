//! [`DrawingSurface`] on top of a plotters drawing area, so frames can go to any
//! plotters backend (bitmap files, in-memory buffers, SVG).
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::graphing::error::{PlotError, Result};
use crate::graphing::surface::{DrawingSurface, PixelBuffer, Rgba};

/// far beyond any real surface, keeps off-screen asymptote samples inside i32
const COORD_LIMIT: f64 = 1.0e6;

impl From<RGBAColor> for Rgba {
    fn from(c: RGBAColor) -> Self {
        Rgba::new(c.0, c.1, c.2, (c.3.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

fn to_plotters(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.a as f64 / 255.0)
}

fn to_pixel(v: f64) -> i32 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
    }
}

fn surface_error<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Surface(e.to_string())
}

pub struct PlottersSurface<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    stroke: Rgba,
    fill: Rgba,
    /// pending sub-paths, flushed by `stroke_path`
    path: Vec<Vec<(i32, i32)>>,
}

impl<DB: DrawingBackend> PlottersSurface<DB> {
    pub fn new(area: DrawingArea<DB, Shift>) -> Self {
        Self {
            area,
            stroke: Rgba::rgb(0, 0, 0),
            fill: Rgba::rgb(0, 0, 0),
            path: Vec::new(),
        }
    }

    pub fn area(&self) -> &DrawingArea<DB, Shift> {
        &self.area
    }

    /// Flushes the frame to the backend (writes the file for file backends).
    pub fn present(&self) -> Result<()> {
        self.area.present().map_err(surface_error)
    }
}

impl<DB: DrawingBackend> DrawingSurface for PlottersSurface<DB> {
    fn size(&self) -> (u32, u32) {
        self.area.dim_in_pixel()
    }

    fn clear(&mut self, color: Rgba) -> Result<()> {
        self.path.clear();
        self.area.fill(&to_plotters(color)).map_err(surface_error)
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.stroke = color;
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(vec![(to_pixel(x), to_pixel(y))]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let point = (to_pixel(x), to_pixel(y));
        match self.path.last_mut() {
            Some(subpath) => subpath.push(point),
            None => self.path.push(vec![point]),
        }
    }

    fn stroke_path(&mut self) -> Result<()> {
        let style = to_plotters(self.stroke).stroke_width(1);
        for subpath in self.path.drain(..) {
            if subpath.len() < 2 {
                continue;
            }
            self.area
                .draw(&PathElement::new(subpath, style))
                .map_err(surface_error)?;
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        // the far corner is exclusive
        let corners = [
            (to_pixel(x), to_pixel(y)),
            (to_pixel(x + width), to_pixel(y + height)),
        ];
        self.area
            .draw(&Rectangle::new(corners, to_plotters(self.fill).filled()))
            .map_err(surface_error)
    }

    fn put_pixels(&mut self, x: i32, y: i32, pixels: &PixelBuffer) -> Result<()> {
        let (width, height) = self.size();
        for (px, py, color) in pixels.opaque_pixels() {
            let (tx, ty) = (x + px as i32, y + py as i32);
            if tx < 0 || ty < 0 || tx >= width as i32 || ty >= height as i32 {
                continue;
            }
            self.area
                .draw_pixel((tx, ty), &to_plotters(color))
                .map_err(surface_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_at(buffer: &[u8], width: u32, x: u32, y: u32) -> (u8, u8, u8) {
        let i = ((y * width + x) * 3) as usize;
        (buffer[i], buffer[i + 1], buffer[i + 2])
    }

    #[test]
    fn test_color_conversion() {
        let c = Rgba::new(10, 20, 30, 255);
        assert_eq!(Rgba::from(to_plotters(c)), c);
        assert_eq!(Rgba::from(RGBAColor(1, 2, 3, 0.0)).a, 0);
    }

    #[test]
    fn test_pixel_coordinates_are_clamped() {
        assert_eq!(to_pixel(2.6), 3);
        assert_eq!(to_pixel(1e300), COORD_LIMIT as i32);
        assert_eq!(to_pixel(f64::NEG_INFINITY), -COORD_LIMIT as i32);
        assert_eq!(to_pixel(f64::NAN), 0);
    }

    #[test]
    fn test_draws_into_bitmap_buffer() {
        let (w, h) = (20u32, 10u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let area = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            let mut surface = PlottersSurface::new(area);
            assert_eq!(surface.size(), (w, h));
            surface.clear(Rgba::rgb(255, 255, 255)).unwrap();

            surface.set_stroke_color(Rgba::rgb(255, 0, 0));
            surface.move_to(0.0, 5.0);
            surface.line_to(19.0, 5.0);
            surface.stroke_path().unwrap();

            surface.set_fill_color(Rgba::rgb(0, 0, 255));
            surface.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();

            let mut pixels = PixelBuffer::new(3, 3);
            pixels.set(1, 1, Rgba::rgb(0, 255, 0));
            surface.put_pixels(10, 7, &pixels).unwrap();
            // partially outside: ignored, not an error
            surface.put_pixels(19, 9, &pixels).unwrap();
            surface.present().unwrap();
        }
        assert_eq!(rgb_at(&buffer, w, 10, 5), (255, 0, 0));
        assert_eq!(rgb_at(&buffer, w, 1, 1), (0, 0, 255));
        assert_eq!(rgb_at(&buffer, w, 11, 8), (0, 255, 0));
        assert_eq!(rgb_at(&buffer, w, 10, 7), (255, 255, 255));
        assert_eq!(rgb_at(&buffer, w, 15, 1), (255, 255, 255));
    }

    #[test]
    fn test_fill_rect_covers_exactly_its_pixels() {
        let (w, h) = (8u32, 8u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let area = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            let mut surface = PlottersSurface::new(area);
            surface.clear(Rgba::rgb(255, 255, 255)).unwrap();
            surface.set_fill_color(Rgba::rgb(0, 0, 255));
            surface.fill_rect(2.0, 2.0, 4.0, 4.0).unwrap();
            surface.present().unwrap();
        }
        let mut filled = 0;
        for y in 0..h {
            for x in 0..w {
                if rgb_at(&buffer, w, x, y) == (0, 0, 255) {
                    assert!((2..6).contains(&x) && (2..6).contains(&y));
                    filled += 1;
                }
            }
        }
        assert_eq!(filled, 16);
    }
}
