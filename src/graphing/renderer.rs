//! Family-agnostic drawing of a frame: background, grid, axes, then every drawable
//! registry entry in insertion order (later entries on top).
use log::debug;
use strum_macros::{Display, EnumIter, EnumString};

use crate::graphing::classifier::Family;
use crate::graphing::config::{RenderConfig, SamplerConfig};
use crate::graphing::error::Result;
use crate::graphing::registry::FunctionRegistry;
use crate::graphing::sampler::{CurveSampler, Mask, Sample, SampleResult, ScreenPath};
use crate::graphing::surface::{DrawingSurface, Rgba};
use crate::graphing::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn background(self) -> Rgba {
        match self {
            Theme::Light => Rgba::rgb(255, 255, 255),
            Theme::Dark => Rgba::rgb(30, 30, 30),
        }
    }

    pub fn grid(self) -> Rgba {
        match self {
            Theme::Light => Rgba::rgb(224, 224, 224),
            Theme::Dark => Rgba::rgb(60, 60, 60),
        }
    }

    pub fn axis(self) -> Rgba {
        match self {
            Theme::Light => Rgba::rgb(64, 64, 64),
            Theme::Dark => Rgba::rgb(200, 200, 200),
        }
    }
}

/// Smallest 1, 2 or 5 × 10ⁿ that is roughly `raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return f64::NAN;
    }
    let base = 10f64.powf(raw.log10().floor());
    let fraction = raw / base;
    let nice = if fraction < 1.5 {
        1.0
    } else if fraction < 3.5 {
        2.0
    } else if fraction < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Multiples of `step` inside `[min, max]`, or `None` when there would be more than `cap`.
pub fn grid_lines(min: f64, max: f64, step: f64, cap: usize) -> Option<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return None;
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    let count = last - first + 1.0;
    if !count.is_finite() || count > cap as f64 {
        return None;
    }
    if count < 1.0 {
        return Some(Vec::new());
    }
    Some((0..count as usize).map(|k| (first + k as f64) * step).collect())
}

/// Draws frames; owns the sampler so cached samples survive between frames.
#[derive(Debug, Default)]
pub struct PlotRenderer {
    config: RenderConfig,
    sampler: CurveSampler,
}

impl PlotRenderer {
    pub fn new(config: RenderConfig, sampler_config: SamplerConfig) -> Self {
        Self {
            config,
            sampler: CurveSampler::new(sampler_config),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
    }

    pub fn sampler(&self) -> &CurveSampler {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut CurveSampler {
        &mut self.sampler
    }

    /// Draws one complete frame. Only drawing-surface failures are reported.
    pub fn render(
        &mut self,
        viewport: &Viewport,
        registry: &FunctionRegistry,
        surface: &mut dyn DrawingSurface,
    ) -> Result<()> {
        let theme = self.config.theme;
        surface.clear(theme.background())?;
        if self.config.draw_grid {
            self.draw_grid(viewport, surface, theme.grid())?;
        }
        Self::draw_axes(viewport, surface, theme.axis())?;

        let mut drawn = 0;
        for entry in registry.iter().filter(|e| e.is_drawable()) {
            let Some(equation) = entry.classification().equation() else {
                continue;
            };
            let result = self
                .sampler
                .sample_cached(entry.id(), entry.revision(), equation, viewport);
            match result {
                SampleResult::Path(path) => Self::draw_path(surface, &path, entry.color())?,
                SampleResult::Mask(mask) => {
                    let alpha = if equation.family() == Family::Inequality {
                        self.config.inequality_alpha
                    } else {
                        self.config.implicit_alpha
                    };
                    Self::draw_mask(viewport, surface, &mask, entry.color().with_alpha(alpha))?
                }
            }
            drawn += 1;
        }
        self.sampler.retain(&registry.ids());
        debug!("frame drawn: {} of {} entries", drawn, registry.len());
        Ok(())
    }

    fn draw_grid(&self, viewport: &Viewport, surface: &mut dyn DrawingSurface, color: Rgba) -> Result<()> {
        let (width, height) = (viewport.pixel_width() as f64, viewport.pixel_height() as f64);
        let cap = self.config.max_grid_lines;
        let x_step = nice_step(self.config.grid_target_px / viewport.scale_x());
        let y_step = nice_step(self.config.grid_target_px / viewport.scale_y());
        let verticals = grid_lines(viewport.x_min(), viewport.x_max(), x_step, cap);
        let horizontals = grid_lines(viewport.y_min(), viewport.y_max(), y_step, cap);
        if verticals.is_none() || horizontals.is_none() {
            debug!("grid skipped on at least one axis: x step {}, y step {}", x_step, y_step);
        }

        surface.set_stroke_color(color);
        for x in verticals.unwrap_or_default() {
            let (px, _) = viewport.to_screen(x, 0.0);
            surface.move_to(px, 0.0);
            surface.line_to(px, height);
        }
        for y in horizontals.unwrap_or_default() {
            let (_, py) = viewport.to_screen(0.0, y);
            surface.move_to(0.0, py);
            surface.line_to(width, py);
        }
        surface.stroke_path()
    }

    fn draw_axes(viewport: &Viewport, surface: &mut dyn DrawingSurface, color: Rgba) -> Result<()> {
        let (width, height) = (viewport.pixel_width() as f64, viewport.pixel_height() as f64);
        let (origin_x, origin_y) = viewport.to_screen(0.0, 0.0);
        surface.set_stroke_color(color);
        if viewport.x_min() <= 0.0 && 0.0 <= viewport.x_max() {
            surface.move_to(origin_x, 0.0);
            surface.line_to(origin_x, height);
        }
        if viewport.y_min() <= 0.0 && 0.0 <= viewport.y_max() {
            surface.move_to(0.0, origin_y);
            surface.line_to(width, origin_y);
        }
        surface.stroke_path()
    }

    fn draw_path(surface: &mut dyn DrawingSurface, path: &ScreenPath, color: Rgba) -> Result<()> {
        surface.set_stroke_color(color);
        for segment in path.segments() {
            let mut points = segment.iter().filter_map(|s| match *s {
                Sample::Point(px, py) => Some((px, py)),
                Sample::Gap => None,
            });
            if let Some((px, py)) = points.next() {
                surface.move_to(px, py);
            }
            for (px, py) in points {
                surface.line_to(px, py);
            }
        }
        surface.stroke_path()
    }

    fn draw_mask(
        viewport: &Viewport,
        surface: &mut dyn DrawingSurface,
        mask: &Mask,
        color: Rgba,
    ) -> Result<()> {
        let pixels = mask.to_pixel_buffer(color, viewport.pixel_width(), viewport.pixel_height());
        surface.put_pixels(0, 0, &pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphing::config::ViewportConfig;
    use crate::graphing::surface::{DrawCommand, RecordingSurface};
    use approx::assert_relative_eq;
    use std::str::FromStr;

    fn setup() -> (Viewport, FunctionRegistry, RecordingSurface) {
        let viewport = Viewport::new(&ViewportConfig::default()).unwrap();
        (viewport, FunctionRegistry::default(), RecordingSurface::new(800, 600))
    }

    #[test]
    fn test_nice_step() {
        assert_relative_eq!(nice_step(1.25), 1.0, epsilon = 1e-12);
        assert_relative_eq!(nice_step(0.4), 0.5, epsilon = 1e-12);
        assert_relative_eq!(nice_step(0.0031), 0.002, epsilon = 1e-12);
        assert_relative_eq!(nice_step(80.0), 100.0, epsilon = 1e-12);
        assert!(nice_step(0.0).is_nan());
    }

    #[test]
    fn test_grid_lines() {
        let lines = grid_lines(-7.5, 7.5, 1.0, 100).unwrap();
        assert_eq!(lines.len(), 15);
        assert_relative_eq!(lines[0], -7.0);
        assert_relative_eq!(lines[14], 7.0);
        assert!(grid_lines(-7.5, 7.5, 1.0, 10).is_none());
        assert!(grid_lines(0.1, 0.2, 1.0, 10).unwrap().is_empty());
        assert!(grid_lines(0.0, 1.0, f64::NAN, 10).is_none());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("dark").unwrap(), Theme::Dark);
        assert_eq!(Theme::from_str("Light").unwrap(), Theme::Light);
        assert!(Theme::from_str("sepia").is_err());
        assert_eq!(Theme::Dark.to_string(), "dark");
    }

    #[test]
    fn test_frame_starts_with_clear_and_grid() {
        let (vp, registry, mut surface) = setup();
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Clear(Theme::Light.background()));
        // 21 vertical + 15 horizontal grid lines, 2 axes
        assert_eq!(surface.subpaths_with_color(Theme::Light.grid()), 36);
        assert_eq!(surface.subpaths_with_color(Theme::Light.axis()), 2);
    }

    #[test]
    fn test_grid_skipped_above_line_cap() {
        let (vp, registry, mut surface) = setup();
        let config = RenderConfig {
            max_grid_lines: 16,
            ..RenderConfig::default()
        };
        let mut renderer = PlotRenderer::new(config, SamplerConfig::default());
        renderer.render(&vp, &registry, &mut surface).unwrap();
        // x (21 lines) skipped, y (15 lines) kept
        assert_eq!(surface.subpaths_with_color(Theme::Light.grid()), 15);
    }

    #[test]
    fn test_axes_hidden_when_origin_out_of_view() {
        let (mut vp, registry, mut surface) = setup();
        vp.pan_by(100.0, 100.0);
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        assert_eq!(surface.subpaths_with_color(Theme::Light.axis()), 0);
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let (vp, mut registry, mut surface) = setup();
        registry.add("y = 1/x");
        registry.add("x = 2cos(t); y = sin(t)");
        registry.add("x^2 + y^2 = 9");
        registry.add("y < x - 2");
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        let first = surface.clone();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        assert_eq!(first, surface);

        // a fresh renderer (no cache) draws the same frame
        let mut other = RecordingSurface::new(800, 600);
        PlotRenderer::default().render(&vp, &registry, &mut other).unwrap();
        assert_eq!(first, other);
    }

    #[test]
    fn test_entries_drawn_in_registration_order() {
        let (vp, mut registry, mut surface) = setup();
        let a = registry.add("y = x");
        let b = registry.add("y = -x");
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        let strokes: Vec<Rgba> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeColor(color) => Some(*color),
                _ => None,
            })
            .collect();
        let color_a = registry.get(a).unwrap().color();
        let color_b = registry.get(b).unwrap().color();
        let pos_a = strokes.iter().position(|c| *c == color_a).unwrap();
        let pos_b = strokes.iter().position(|c| *c == color_b).unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn test_hidden_and_invalid_entries_are_skipped() {
        let (vp, mut registry, mut surface) = setup();
        let hidden = registry.add("y = x");
        let broken = registry.add("y = x +");
        registry.set_visible(hidden, false).unwrap();
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        assert_eq!(surface.subpaths_with_color(registry.get(hidden).unwrap().color()), 0);
        assert_eq!(surface.subpaths_with_color(registry.get(broken).unwrap().color()), 0);
        assert!(!surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::PutPixels { .. })));
    }

    #[test]
    fn test_gaps_split_strokes() {
        let (vp, mut registry, mut surface) = setup();
        let id = registry.add("y = 1/x");
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        assert_eq!(surface.subpaths_with_color(registry.get(id).unwrap().color()), 2);
    }

    #[test]
    fn test_masks_are_one_bulk_write_with_alpha() {
        let (vp, mut registry, mut surface) = setup();
        let region = registry.add("y > x^2");
        let curve = registry.add("x^2 + y^2 = 16");
        let mut renderer = PlotRenderer::default();
        renderer.render(&vp, &registry, &mut surface).unwrap();
        let writes: Vec<&DrawCommand> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::PutPixels { .. }))
            .collect();
        assert_eq!(writes.len(), 2);
        let alpha_of = |command: &DrawCommand| match command {
            DrawCommand::PutPixels { pixels, .. } => pixels.opaque_pixels().next().map(|p| p.2),
            _ => None,
        };
        let region_color = alpha_of(writes[0]).unwrap();
        let curve_color = alpha_of(writes[1]).unwrap();
        let base = registry.get(region).unwrap().color();
        assert_eq!((region_color.r, region_color.g, region_color.b), (base.r, base.g, base.b));
        assert!(region_color.a > 0 && region_color.a < 255);
        assert_eq!(curve_color, registry.get(curve).unwrap().color());
    }

    #[test]
    fn test_dark_theme_background() {
        let (vp, registry, mut surface) = setup();
        let mut renderer = PlotRenderer::default();
        renderer.set_theme(Theme::Dark);
        renderer.render(&vp, &registry, &mut surface).unwrap();
        assert_eq!(surface.commands()[0], DrawCommand::Clear(Theme::Dark.background()));
    }
}
