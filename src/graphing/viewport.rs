//! Visible world rectangle and its mapping onto the pixel grid of the drawing surface.
//!
//! Screen rows grow downward, world y grows upward, hence the inversion in
//! [`Viewport::to_screen`].
use approx::relative_eq;
use log::{debug, warn};

use crate::graphing::config::ViewportConfig;
use crate::graphing::error::{PlotError, Result};

/// world rectangle + pixel size of the surface it is shown on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    pixel_width: u32,
    pixel_height: u32,
    min_extent: f64,
    max_extent: f64,
    default_extent: [f64; 4],
}

impl Viewport {
    /// Creates the session viewport from its configuration; the configured rectangle
    /// becomes the extent restored by [`Viewport::reset`].
    pub fn new(config: &ViewportConfig) -> Result<Viewport> {
        let ViewportConfig {
            x_min,
            x_max,
            y_min,
            y_max,
            pixel_width,
            pixel_height,
            min_extent,
            max_extent,
        } = *config;
        if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max)
            || !(y_min.is_finite() && y_max.is_finite() && y_min < y_max)
        {
            return Err(PlotError::InvalidViewport(format!(
                "x [{}, {}], y [{}, {}]",
                x_min, x_max, y_min, y_max
            )));
        }
        if pixel_width == 0 || pixel_height == 0 {
            return Err(PlotError::InvalidViewport(format!(
                "surface {}x{}",
                pixel_width, pixel_height
            )));
        }
        if !(min_extent > 0.0 && min_extent < max_extent) {
            return Err(PlotError::InvalidViewport(format!(
                "extent bounds [{}, {}]",
                min_extent, max_extent
            )));
        }
        Ok(Viewport {
            x_min,
            x_max,
            y_min,
            y_max,
            pixel_width,
            pixel_height,
            min_extent,
            max_extent,
            default_extent: [x_min, x_max, y_min, y_max],
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }
    pub fn x_max(&self) -> f64 {
        self.x_max
    }
    pub fn y_min(&self) -> f64 {
        self.y_min
    }
    pub fn y_max(&self) -> f64 {
        self.y_max
    }
    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }
    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// pixels per world unit along x
    pub fn scale_x(&self) -> f64 {
        self.pixel_width as f64 / (self.x_max - self.x_min)
    }

    /// pixels per world unit along y
    pub fn scale_y(&self) -> f64 {
        self.pixel_height as f64 / (self.y_max - self.y_min)
    }

    pub fn to_screen(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        let px = (world_x - self.x_min) * self.scale_x();
        let py = self.pixel_height as f64 - (world_y - self.y_min) * self.scale_y();
        (px, py)
    }

    pub fn to_world(&self, px: f64, py: f64) -> (f64, f64) {
        let world_x = self.x_min + px / self.scale_x();
        let world_y = self.y_min + (self.pixel_height as f64 - py) / self.scale_y();
        (world_x, world_y)
    }

    /// Rescales both extents by `factor` around the world point under `(px, py)`.
    ///
    /// `factor < 1` zooms in. The factor is clamped so that both extents stay within
    /// `[min_extent, max_extent]`; the point under the cursor stays fixed either way.
    /// A zoom that no factor can satisfy (or a non-positive factor) leaves the viewport
    /// unchanged and returns `false`.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> bool {
        if !(factor.is_finite() && factor > 0.0) || !px.is_finite() || !py.is_finite() {
            warn!("zoom rejected: factor {} at ({}, {})", factor, px, py);
            return false;
        }
        let (wx, wy) = (self.x_max - self.x_min, self.y_max - self.y_min);
        let lowest = (self.min_extent / wx).max(self.min_extent / wy);
        let highest = (self.max_extent / wx).min(self.max_extent / wy);
        if lowest > highest {
            warn!("zoom rejected: no factor keeps both extents within bounds");
            return false;
        }
        let factor = factor.clamp(lowest, highest);
        if relative_eq!(factor, 1.0, max_relative = 1e-9) {
            debug!("zoom clamped to identity");
            return false;
        }

        let (cx, cy) = self.to_world(px, py);
        self.x_min = cx - (cx - self.x_min) * factor;
        self.x_max = self.x_min + wx * factor;
        self.y_min = cy - (cy - self.y_min) * factor;
        self.y_max = self.y_min + wy * factor;
        debug!(
            "zoom by {} at ({}, {}): x [{}, {}], y [{}, {}]",
            factor, cx, cy, self.x_min, self.x_max, self.y_min, self.y_max
        );
        true
    }

    /// Translates the visible rectangle. Unbounded.
    pub fn pan_by(&mut self, dx_world: f64, dy_world: f64) {
        if !dx_world.is_finite() || !dy_world.is_finite() {
            warn!("pan rejected: ({}, {})", dx_world, dy_world);
            return;
        }
        self.x_min += dx_world;
        self.x_max += dx_world;
        self.y_min += dy_world;
        self.y_max += dy_world;
    }

    /// Restores the extent the viewport was created with.
    pub fn reset(&mut self) {
        let [x_min, x_max, y_min, y_max] = self.default_extent;
        self.x_min = x_min;
        self.x_max = x_max;
        self.y_min = y_min;
        self.y_max = y_max;
    }

    /// Changes the pixel size of the surface; the world rectangle is kept.
    pub fn resize(&mut self, pixel_width: u32, pixel_height: u32) -> Result<()> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(PlotError::InvalidViewport(format!(
                "surface {}x{}",
                pixel_width, pixel_height
            )));
        }
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        Ok(())
    }

    /// Exact bit pattern of the world rectangle and pixel size, used as a cache key.
    pub fn fingerprint(&self) -> [u64; 6] {
        [
            self.x_min.to_bits(),
            self.x_max.to_bits(),
            self.y_min.to_bits(),
            self.y_max.to_bits(),
            self.pixel_width as u64,
            self.pixel_height as u64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_viewport() -> Viewport {
        Viewport::new(&ViewportConfig::default()).unwrap()
    }

    #[test]
    fn test_corners_map_to_surface_corners() {
        let vp = default_viewport();
        let (px, py) = vp.to_screen(-10.0, 7.5);
        assert_relative_eq!(px, 0.0);
        assert_relative_eq!(py, 0.0);
        let (px, py) = vp.to_screen(10.0, -7.5);
        assert_relative_eq!(px, 800.0);
        assert_relative_eq!(py, 600.0);
        let (px, py) = vp.to_screen(0.0, 0.0);
        assert_relative_eq!(px, 400.0);
        assert_relative_eq!(py, 300.0);
    }

    #[test]
    fn test_transform_round_trip() {
        let mut vp = default_viewport();
        vp.zoom_at(123.0, 456.0, 0.37);
        vp.pan_by(3.25, -1.5);
        for &(wx, wy) in &[(-9.0, 1.0), (0.0, 0.0), (3.3, -2.2), (7.77, 6.1)] {
            let (px, py) = vp.to_screen(wx, wy);
            let (bx, by) = vp.to_world(px, py);
            assert_relative_eq!(bx, wx, epsilon = 1e-9);
            assert_relative_eq!(by, wy, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        for &factor in &[0.5, 0.9, 1.1, 3.0] {
            let mut vp = default_viewport();
            let before = vp.to_world(200.0, 150.0);
            assert!(vp.zoom_at(200.0, 150.0, factor));
            let after = vp.to_world(200.0, 150.0);
            assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
            assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
            assert_relative_eq!(vp.x_max() - vp.x_min(), 20.0 * factor, epsilon = 1e-9);
            assert_relative_eq!(vp.y_max() - vp.y_min(), 15.0 * factor, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zoom_is_clamped_to_extent_bounds() {
        let mut vp = default_viewport();
        let before = vp.to_world(400.0, 300.0);
        assert!(vp.zoom_at(400.0, 300.0, 1e-12));
        // y extent (15) hits min_extent first
        assert_relative_eq!(vp.y_max() - vp.y_min(), 1e-6, max_relative = 1e-9);
        let after = vp.to_world(400.0, 300.0);
        assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
        // already at the bound: further zoom-in is a no-op
        let frozen = vp;
        assert!(!vp.zoom_at(400.0, 300.0, 0.5));
        assert_eq!(vp, frozen);

        let mut vp = default_viewport();
        assert!(vp.zoom_at(0.0, 0.0, 1e12));
        // x extent (20) hits max_extent first
        assert_relative_eq!(vp.x_max() - vp.x_min(), 1e6, max_relative = 1e-9);
    }

    #[test]
    fn test_invalid_zoom_factor_leaves_viewport_unchanged() {
        let mut vp = default_viewport();
        let original = vp;
        assert!(!vp.zoom_at(10.0, 10.0, 0.0));
        assert!(!vp.zoom_at(10.0, 10.0, -2.0));
        assert!(!vp.zoom_at(10.0, 10.0, f64::NAN));
        assert!(!vp.zoom_at(10.0, 10.0, f64::INFINITY));
        assert_eq!(vp, original);
    }

    #[test]
    fn test_pan_then_reset_restores_default() {
        let mut vp = default_viewport();
        let original = vp;
        vp.pan_by(1.5, -2.0);
        vp.pan_by(-100.0, 33.3);
        vp.zoom_at(10.0, 20.0, 0.7);
        vp.pan_by(0.001, 0.002);
        assert_ne!(vp, original);
        vp.reset();
        assert_eq!(vp, original);
    }

    #[test]
    fn test_invalid_construction() {
        let mut config = ViewportConfig::default();
        config.x_min = 15.0;
        assert!(Viewport::new(&config).is_err());
        let mut config = ViewportConfig::default();
        config.y_max = config.y_min;
        assert!(Viewport::new(&config).is_err());
        let mut config = ViewportConfig::default();
        config.pixel_height = 0;
        assert!(Viewport::new(&config).is_err());
    }

    #[test]
    fn test_resize_keeps_world_rectangle() {
        let mut vp = default_viewport();
        vp.resize(400, 300).unwrap();
        assert_eq!(vp.x_min(), -10.0);
        let (px, py) = vp.to_screen(0.0, 0.0);
        assert_relative_eq!(px, 200.0);
        assert_relative_eq!(py, 150.0);
        assert!(vp.resize(0, 10).is_err());
    }
}
