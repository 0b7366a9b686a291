//! Turns a classified equation plus the current viewport into drawable geometry.
//!
//! - explicit: one sample per pixel column, screen space is the resolution target
//! - parametric / polar: fixed sweep of the parameter, computed in world space once
//!   per equation revision and re-projected on every viewport change
//! - implicit / inequality: evaluation on a strided pixel grid, producing a mask
//!
//! A sample that fails to evaluate is never an error for the equation; it becomes a
//! [`Sample::Gap`] in a path or an unmarked cell in a mask.
use std::collections::HashMap;
use std::f64::consts::TAU;

use log::{debug, info};

use crate::graphing::classifier::{ClassifiedEquation, Relation};
use crate::graphing::config::SamplerConfig;
use crate::graphing::evaluator::CompiledExpr;
use crate::graphing::registry::EntryId;
use crate::graphing::surface::{PixelBuffer, Rgba};
use crate::graphing::viewport::Viewport;

/// One point of a path, or a break in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Point(f64, f64),
    Gap,
}

/// Ordered screen-space samples; consecutive points are connected, gaps are not crossed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenPath {
    pub samples: Vec<Sample>,
}

impl ScreenPath {
    /// Maximal runs of consecutive points.
    pub fn segments(&self) -> impl Iterator<Item = &[Sample]> + '_ {
        self.samples
            .split(|s| matches!(s, Sample::Gap))
            .filter(|run| !run.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| matches!(s, Sample::Point(..)))
            .count()
    }
}

/// World-space samples of a parametric or polar sweep, independent of the viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldPath {
    pub samples: Vec<Sample>,
}

impl WorldPath {
    pub fn project(&self, viewport: &Viewport) -> ScreenPath {
        let samples = self
            .samples
            .iter()
            .map(|s| match *s {
                Sample::Point(x, y) => {
                    let (px, py) = viewport.to_screen(x, y);
                    Sample::Point(px, py)
                }
                Sample::Gap => Sample::Gap,
            })
            .collect();
        ScreenPath { samples }
    }
}

/// Boolean grid over the surface; cell `(col, row)` covers pixels
/// `[col*stride, (col+1)*stride) x [row*stride, (row+1)*stride)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    cols: u32,
    rows: u32,
    stride: u32,
    cells: Vec<bool>,
}

impl Mask {
    fn new(cols: u32, rows: u32, stride: u32) -> Self {
        Self {
            cols,
            rows,
            stride,
            cells: vec![false; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn get(&self, col: u32, row: u32) -> bool {
        col < self.cols && row < self.rows && self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Value of the cell containing pixel (px, py).
    pub fn covers_pixel(&self, px: u32, py: u32) -> bool {
        self.get(px / self.stride, py / self.stride)
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Expands the mask to a `width x height` pixel block, set cells painted `color`.
    pub fn to_pixel_buffer(&self, color: Rgba, width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height);
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.get(col, row) {
                    buffer.fill_block(
                        col * self.stride,
                        row * self.stride,
                        self.stride,
                        self.stride,
                        color,
                    );
                }
            }
        }
        buffer
    }
}

/// Output of one sampling pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleResult {
    Path(ScreenPath),
    Mask(Mask),
}

fn finite_point(x: f64, y: f64) -> Sample {
    if x.is_finite() && y.is_finite() {
        Sample::Point(x, y)
    } else {
        Sample::Gap
    }
}

/// Evenly spaced parameter values from `start` to `end` inclusive, spacing at most `step`.
fn sweep(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    // the small slack keeps 20 / 0.01 from rounding up to 2001 intervals
    let n = ((end - start) / step - 1e-9).ceil().max(1.0) as usize;
    let h = (end - start) / n as f64;
    (0..=n).map(move |i| if i == n { end } else { start + i as f64 * h })
}

/// Whether a pole lies between two columns whose samples leave the view on opposite
/// edges. A continuous function's midpoint lands between the two endpoints; across a
/// pole it fails or shoots past one of them.
fn pole_between(f: &dyn CompiledExpr, viewport: &Viewport, x0: f64, py0: f64, x1: f64, py1: f64) -> bool {
    match f.evaluate(&[(x0 + x1) / 2.0]) {
        Ok(y) if y.is_finite() => {
            let (_, py) = viewport.to_screen(x0, y);
            !(py0.min(py1) <= py && py <= py0.max(py1))
        }
        _ => true,
    }
}

/// y = f(x), one sample per pixel column.
pub fn sample_explicit(f: &dyn CompiledExpr, viewport: &Viewport, config: &SamplerConfig) -> ScreenPath {
    let height = viewport.pixel_height() as f64;
    let jump = config.asymptote_jump * height;
    let mut samples = Vec::with_capacity(viewport.pixel_width() as usize + 8);
    // world x and screen y of the last finite sample
    let mut previous: Option<(f64, f64)> = None;
    for column in 0..viewport.pixel_width() {
        let (x, _) = viewport.to_world(column as f64, 0.0);
        let sample = match f.evaluate(&[x]) {
            Ok(y) if y.is_finite() => {
                let (px, py) = viewport.to_screen(x, y);
                Sample::Point(px, py)
            }
            _ => Sample::Gap,
        };
        if let (Sample::Point(_, py), Some((prev_x, prev_py))) = (sample, previous) {
            let crosses_view = (prev_py < 0.0 && py > height) || (prev_py > height && py < 0.0);
            if crosses_view
                && (py - prev_py).abs() > jump
                && pole_between(f, viewport, prev_x, prev_py, x, py)
            {
                samples.push(Sample::Gap);
            }
        }
        previous = match sample {
            Sample::Point(_, py) => Some((x, py)),
            Sample::Gap => None,
        };
        samples.push(sample);
    }
    ScreenPath { samples }
}

/// (x(t), y(t)) for t in [t_min, t_max].
pub fn sample_parametric(
    x: &dyn CompiledExpr,
    y: &dyn CompiledExpr,
    config: &SamplerConfig,
) -> WorldPath {
    let samples = sweep(config.t_min, config.t_max, config.t_step)
        .map(|t| match (x.evaluate(&[t]), y.evaluate(&[t])) {
            (Ok(x), Ok(y)) => finite_point(x, y),
            _ => Sample::Gap,
        })
        .collect();
    WorldPath { samples }
}

/// (r cos θ, r sin θ) for θ in [0, 2π].
pub fn sample_polar(r: &dyn CompiledExpr, config: &SamplerConfig) -> WorldPath {
    let samples = sweep(0.0, TAU, config.theta_step)
        .map(|theta| match r.evaluate(&[theta, theta, theta]) {
            Ok(radius) => finite_point(radius * theta.cos(), radius * theta.sin()),
            Err(_) => Sample::Gap,
        })
        .collect();
    WorldPath { samples }
}

/// Dispatches on the equation family.
pub fn sample_equation(
    config: &SamplerConfig,
    equation: &ClassifiedEquation,
    viewport: &Viewport,
) -> SampleResult {
    match equation {
        ClassifiedEquation::Explicit { f } => {
            SampleResult::Path(sample_explicit(f.as_ref(), viewport, config))
        }
        ClassifiedEquation::Parametric { x, y } => {
            SampleResult::Path(sample_parametric(x.as_ref(), y.as_ref(), config).project(viewport))
        }
        ClassifiedEquation::Polar { r } => {
            SampleResult::Path(sample_polar(r.as_ref(), config).project(viewport))
        }
        ClassifiedEquation::Implicit { g } => {
            let test = GridTest::NearZero {
                g: g.as_ref(),
                epsilon: config.implicit_epsilon,
            };
            SampleResult::Mask(GridSampler::new(test, viewport, config).run(config.band_rows))
        }
        ClassifiedEquation::Inequality { lhs, rhs, op } => {
            let test = GridTest::Relation {
                lhs: lhs.as_ref(),
                rhs: rhs.as_ref(),
                op: *op,
            };
            SampleResult::Mask(GridSampler::new(test, viewport, config).run(config.band_rows))
        }
    }
}

/// What a grid cell tests.
#[derive(Debug, Clone, Copy)]
pub enum GridTest<'a> {
    /// |g(x, y)| < epsilon
    NearZero {
        g: &'a dyn CompiledExpr,
        epsilon: f64,
    },
    /// lhs(x, y) op rhs(x, y)
    Relation {
        lhs: &'a dyn CompiledExpr,
        rhs: &'a dyn CompiledExpr,
        op: Relation,
    },
}

impl GridTest<'_> {
    fn marks(&self, x: f64, y: f64) -> bool {
        let at = [x, y];
        match self {
            GridTest::NearZero { g, epsilon } => g.evaluate(&at).is_ok_and(|v| v.abs() < *epsilon),
            GridTest::Relation { lhs, rhs, op } => match (lhs.evaluate(&at), rhs.evaluate(&at)) {
                (Ok(l), Ok(r)) => op.holds(l, r),
                _ => false,
            },
        }
    }
}

/// Incremental grid evaluation, one band of rows per [`GridSampler::step`].
///
/// A host event loop can call `step` between input events; [`GridSampler::run`]
/// drives it to completion in one go.
pub struct GridSampler<'a> {
    test: GridTest<'a>,
    viewport: Viewport,
    mask: Mask,
    next_row: u32,
}

impl<'a> GridSampler<'a> {
    /// The stride starts at `config.grid_stride` and grows until the grid has at most
    /// `config.max_grid_cells` cells.
    pub fn new(test: GridTest<'a>, viewport: &Viewport, config: &SamplerConfig) -> Self {
        let (width, height) = (viewport.pixel_width(), viewport.pixel_height());
        let mut stride = config.grid_stride.max(1);
        let cells = |stride: u32| width.div_ceil(stride) as usize * height.div_ceil(stride) as usize;
        while cells(stride) > config.max_grid_cells.max(1) && stride < width.max(height) {
            stride += 1;
        }
        if stride != config.grid_stride {
            debug!(
                "grid stride raised from {} to {} to stay within {} cells",
                config.grid_stride, stride, config.max_grid_cells
            );
        }
        Self {
            test,
            viewport: *viewport,
            mask: Mask::new(width.div_ceil(stride), height.div_ceil(stride), stride),
            next_row: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.next_row >= self.mask.rows
    }

    /// Fraction of rows evaluated so far.
    pub fn progress(&self) -> f64 {
        if self.mask.rows == 0 {
            1.0
        } else {
            self.next_row as f64 / self.mask.rows as f64
        }
    }

    /// Evaluates up to `band_rows` further rows; returns true once the grid is complete.
    pub fn step(&mut self, band_rows: u32) -> bool {
        let end = self.next_row.saturating_add(band_rows.max(1)).min(self.mask.rows);
        let stride = self.mask.stride;
        for row in self.next_row..end {
            let py = (row * stride) as f64;
            for col in 0..self.mask.cols {
                let (x, y) = self.viewport.to_world((col * stride) as f64, py);
                if self.test.marks(x, y) {
                    let index = row as usize * self.mask.cols as usize + col as usize;
                    self.mask.cells[index] = true;
                }
            }
        }
        self.next_row = end;
        self.is_done()
    }

    /// Whatever has been computed so far; rows not yet evaluated are unmarked.
    pub fn into_mask(self) -> Mask {
        self.mask
    }

    pub fn run(mut self, band_rows: u32) -> Mask {
        while !self.step(band_rows) {}
        self.mask
    }
}

#[derive(Debug, Default)]
struct CachedSamples {
    revision: u64,
    world: Option<WorldPath>,
    mask: Option<([u64; 6], Mask)>,
}

/// Family dispatch plus per-entry caching of viewport-independent work.
///
/// World paths of parametric and polar equations depend only on the equation, so
/// they are kept until the entry's revision changes. Masks are kept until either
/// the revision or the viewport changes.
#[derive(Debug, Default)]
pub struct CurveSampler {
    config: SamplerConfig,
    cache: HashMap<EntryId, CachedSamples>,
}

impl CurveSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Replaces the configuration and drops every cached result.
    pub fn set_config(&mut self, config: SamplerConfig) {
        self.config = config;
        self.cache.clear();
    }

    /// Samples without touching the cache.
    pub fn sample(&self, equation: &ClassifiedEquation, viewport: &Viewport) -> SampleResult {
        sample_equation(&self.config, equation, viewport)
    }

    /// Samples entry `id` at `revision`, reusing cached work where it is still valid.
    pub fn sample_cached(
        &mut self,
        id: EntryId,
        revision: u64,
        equation: &ClassifiedEquation,
        viewport: &Viewport,
    ) -> SampleResult {
        let slot = self.cache.entry(id).or_default();
        if slot.revision != revision {
            *slot = CachedSamples {
                revision,
                ..Default::default()
            };
        }
        match equation {
            ClassifiedEquation::Parametric { x, y } => {
                let world = slot
                    .world
                    .get_or_insert_with(|| sample_parametric(x.as_ref(), y.as_ref(), &self.config));
                SampleResult::Path(world.project(viewport))
            }
            ClassifiedEquation::Polar { r } => {
                let world = slot
                    .world
                    .get_or_insert_with(|| sample_polar(r.as_ref(), &self.config));
                SampleResult::Path(world.project(viewport))
            }
            ClassifiedEquation::Implicit { .. } | ClassifiedEquation::Inequality { .. } => {
                let key = viewport.fingerprint();
                if let Some((cached_key, mask)) = &slot.mask {
                    if *cached_key == key {
                        return SampleResult::Mask(mask.clone());
                    }
                }
                let result = sample_equation(&self.config, equation, viewport);
                if let SampleResult::Mask(mask) = &result {
                    slot.mask = Some((key, mask.clone()));
                }
                result
            }
            ClassifiedEquation::Explicit { .. } => sample_equation(&self.config, equation, viewport),
        }
    }

    /// Drops cached results of entries not in `live`.
    pub fn retain(&mut self, live: &[EntryId]) {
        let before = self.cache.len();
        self.cache.retain(|id, _| live.contains(id));
        if self.cache.len() != before {
            info!("sample cache pruned from {} to {} entries", before, self.cache.len());
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphing::classifier::classify;
    use crate::graphing::config::ViewportConfig;
    use approx::assert_relative_eq;

    fn viewport(config: ViewportConfig) -> Viewport {
        Viewport::new(&config).unwrap()
    }

    fn square_viewport(pixels: u32) -> Viewport {
        viewport(ViewportConfig {
            y_min: -10.0,
            y_max: 10.0,
            pixel_width: pixels,
            pixel_height: pixels,
            ..ViewportConfig::default()
        })
    }

    fn path_of(input: &str, vp: &Viewport, config: &SamplerConfig) -> ScreenPath {
        let classification = classify(input);
        match sample_equation(config, classification.equation().unwrap(), vp) {
            SampleResult::Path(path) => path,
            other => panic!("expected a path for {}, got {:?}", input, other),
        }
    }

    fn mask_of(input: &str, vp: &Viewport, config: &SamplerConfig) -> Mask {
        let classification = classify(input);
        match sample_equation(config, classification.equation().unwrap(), vp) {
            SampleResult::Mask(mask) => mask,
            other => panic!("expected a mask for {}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_explicit_one_sample_per_column() {
        let vp = viewport(ViewportConfig::default());
        let path = path_of("y = x^2", &vp, &SamplerConfig::default());
        assert_eq!(path.samples.len(), 800);
        assert_eq!(path.point_count(), 800);
        assert_eq!(path.segments().count(), 1);
        // column 400 is x = 0
        match path.samples[400] {
            Sample::Point(px, py) => {
                assert_relative_eq!(px, 400.0);
                assert_relative_eq!(py, 300.0);
            }
            Sample::Gap => panic!("x^2 has no gaps"),
        }
    }

    #[test]
    fn test_reciprocal_has_gap_at_pole() {
        let vp = viewport(ViewportConfig::default());
        let path = path_of("y = 1/x", &vp, &SamplerConfig::default());
        assert_eq!(path.samples[400], Sample::Gap);
        assert!(matches!(path.samples[399], Sample::Point(..)));
        assert!(matches!(path.samples[401], Sample::Point(..)));
        assert_eq!(path.segments().count(), 2);
    }

    #[test]
    fn test_reciprocal_never_joined_across_pole() {
        // odd width: no column lands exactly on x = 0
        let vp = viewport(ViewportConfig {
            pixel_width: 801,
            ..ViewportConfig::default()
        });
        let path = path_of("1/x", &vp, &SamplerConfig::default());
        assert_eq!(path.point_count(), 801);
        assert_eq!(path.segments().count(), 2);
        for segment in path.segments() {
            let left = segment
                .iter()
                .any(|s| matches!(s, Sample::Point(px, _) if *px < 400.5));
            let right = segment
                .iter()
                .any(|s| matches!(s, Sample::Point(px, _) if *px > 400.5));
            assert!(!(left && right));
        }
    }

    #[test]
    fn test_steep_but_continuous_curve_is_not_broken() {
        let vp = viewport(ViewportConfig::default());
        let path = path_of("y = 100*x", &vp, &SamplerConfig::default());
        assert_eq!(path.segments().count(), 1);
    }

    #[test]
    fn test_steep_line_crossing_view_between_columns_stays_connected() {
        // odd width: the only on-screen stretch of y = 1000x lies between two columns
        let vp = viewport(ViewportConfig {
            pixel_width: 801,
            ..ViewportConfig::default()
        });
        let path = path_of("y = 1000*x", &vp, &SamplerConfig::default());
        assert_eq!(path.point_count(), 801);
        assert!(path.samples.iter().all(|s| *s != Sample::Gap));
        assert_eq!(path.segments().count(), 1);
    }

    #[test]
    fn test_tangent_is_broken_at_each_pole() {
        let vp = viewport(ViewportConfig {
            pixel_width: 801,
            ..ViewportConfig::default()
        });
        let path = path_of("y = tan(x)", &vp, &SamplerConfig::default());
        // poles at ±π/2, ±3π/2, ±5π/2 inside [-10, 10]
        assert_eq!(path.segments().count(), 7);
    }

    #[test]
    fn test_domain_errors_become_gaps() {
        let vp = viewport(ViewportConfig::default());
        let path = path_of("y = sqrt(x)", &vp, &SamplerConfig::default());
        assert!(path.samples[..400].iter().all(|s| *s == Sample::Gap));
        assert!(path.samples[400..].iter().all(|s| matches!(s, Sample::Point(..))));

        let path = path_of("y = ln(x)", &vp, &SamplerConfig::default());
        assert_eq!(path.segments().count(), 1);
    }

    #[test]
    fn test_parametric_circle() {
        let config = SamplerConfig::default();
        let classification = classify("x(t) = cos(t), y(t) = sin(t)");
        let ClassifiedEquation::Parametric { x, y } = classification.equation().unwrap() else {
            panic!("not parametric");
        };
        let world = sample_parametric(x.as_ref(), y.as_ref(), &config);
        assert_eq!(world.samples.len(), 2001);
        for sample in &world.samples {
            let Sample::Point(wx, wy) = *sample else {
                panic!("unexpected gap");
            };
            assert_relative_eq!(wx.hypot(wy), 1.0, epsilon = 1e-12);
        }
        assert_eq!(world.samples[0], Sample::Point((-10.0f64).cos(), (-10.0f64).sin()));
        assert_eq!(world.samples[2000], Sample::Point(10.0f64.cos(), 10.0f64.sin()));

        let vp = viewport(ViewportConfig::default());
        let screen = world.project(&vp);
        // t = 0 lies in the middle of the sweep
        let Sample::Point(px, py) = screen.samples[1000] else {
            panic!("unexpected gap");
        };
        assert_relative_eq!(px, 440.0, epsilon = 1e-9);
        assert_relative_eq!(py, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_sweep_includes_both_ends() {
        let config = SamplerConfig::default();
        let classification = classify("r = 2");
        let ClassifiedEquation::Polar { r } = classification.equation().unwrap() else {
            panic!("not polar");
        };
        let world = sample_polar(r.as_ref(), &config);
        assert_eq!(world.samples.len(), 630);
        let Some(Sample::Point(x, y)) = world.samples.last().copied() else {
            panic!("unexpected gap");
        };
        assert_relative_eq!(x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.0, epsilon = 1e-12);
        for sample in &world.samples {
            if let Sample::Point(x, y) = *sample {
                assert_relative_eq!(x.hypot(y), 2.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_polar_domain_errors() {
        let vp = viewport(ViewportConfig::default());
        let path = path_of("r = sqrt(sin(theta))", &vp, &SamplerConfig::default());
        // upper half defined, lower half not
        assert!(path.point_count() > 300);
        assert!(path.samples.iter().any(|s| *s == Sample::Gap));
    }

    #[test]
    fn test_implicit_circle_mask() {
        let vp = square_viewport(200);
        let config = SamplerConfig {
            grid_stride: 1,
            ..SamplerConfig::default()
        };
        let mask = mask_of("x^2 + y^2 = 4", &vp, &config);
        assert_eq!((mask.cols(), mask.rows(), mask.stride()), (200, 200, 1));
        // world (2, 0) <-> pixel (120, 100)
        assert!(mask.covers_pixel(120, 100));
        assert!(mask.covers_pixel(80, 100));
        assert!(mask.covers_pixel(100, 80));
        assert!(!mask.covers_pixel(100, 100));
        assert!(!mask.covers_pixel(0, 0));
    }

    #[test]
    fn test_inequality_mask() {
        let vp = square_viewport(200);
        let config = SamplerConfig {
            grid_stride: 1,
            ..SamplerConfig::default()
        };
        let mask = mask_of("y > x", &vp, &config);
        // world (-5, 5) <-> pixel (50, 50)
        assert!(mask.covers_pixel(50, 50));
        assert!(!mask.covers_pixel(150, 150));
        // px + py < 200
        assert_eq!(mask.count(), 200 * 201 / 2);

        let mask = mask_of("y < ln(x)", &vp, &config);
        // x <= 0 cannot be evaluated and stays unmarked
        assert!((0..100).all(|px| (0..200).all(|py| !mask.covers_pixel(px, py))));
        assert!(mask.count() > 0);
    }

    #[test]
    fn test_grid_stride_grows_to_fit_cell_budget() {
        let vp = viewport(ViewportConfig::default());
        let config = SamplerConfig {
            grid_stride: 1,
            max_grid_cells: 10_000,
            ..SamplerConfig::default()
        };
        let mask = mask_of("x^2 + y^2 = 25", &vp, &config);
        assert!(mask.stride() > 1);
        assert!(mask.cols() as usize * mask.rows() as usize <= 10_000);
    }

    #[test]
    fn test_grid_steps_match_single_run() {
        let vp = viewport(ViewportConfig::default());
        let config = SamplerConfig::default();
        let classification = classify("x*y <= 3");
        let ClassifiedEquation::Inequality { lhs, rhs, op } = classification.equation().unwrap() else {
            panic!("not an inequality");
        };
        let test = GridTest::Relation {
            lhs: lhs.as_ref(),
            rhs: rhs.as_ref(),
            op: *op,
        };
        let whole = GridSampler::new(test, &vp, &config).run(u32::MAX);
        let mut incremental = GridSampler::new(test, &vp, &config);
        let mut steps = 0;
        while !incremental.step(7) {
            steps += 1;
            assert!(incremental.progress() < 1.0);
        }
        assert!(steps > 1);
        assert_eq!(incremental.into_mask(), whole);
    }

    #[test]
    fn test_mask_to_pixels() {
        let vp = square_viewport(200);
        let mask = mask_of("x^2 + y^2 = 4", &vp, &SamplerConfig::default());
        let color = Rgba::rgb(255, 0, 0).with_alpha(0.5);
        let pixels = mask.to_pixel_buffer(color, 200, 200);
        assert_eq!(pixels.count_opaque(), mask.count() * 4);
        assert_eq!(pixels.get(120, 100), Some(color));
    }

    #[test]
    fn test_cache_reuses_world_path_and_mask() {
        let mut sampler = CurveSampler::default();
        let mut vp = viewport(ViewportConfig::default());
        let circle = classify("x = 3*cos(t); y = 3*sin(t)");
        let eq = circle.equation().unwrap();
        let id = EntryId(1);

        let first = sampler.sample_cached(id, 0, eq, &vp);
        assert_eq!(first, sampler.sample(eq, &vp));
        vp.pan_by(1.0, 0.0);
        let moved = sampler.sample_cached(id, 0, eq, &vp);
        assert_ne!(first, moved);
        assert_eq!(moved, sampler.sample(eq, &vp));

        let region = classify("y >= x^2");
        let eq = region.equation().unwrap();
        let id = EntryId(2);
        let a = sampler.sample_cached(id, 0, eq, &vp);
        let b = sampler.sample_cached(id, 0, eq, &vp);
        assert_eq!(a, b);
        vp.zoom_at(400.0, 300.0, 0.5);
        assert_eq!(sampler.sample_cached(id, 0, eq, &vp), sampler.sample(eq, &vp));

        assert_eq!(sampler.cached_entries(), 2);
        sampler.retain(&[EntryId(2)]);
        assert_eq!(sampler.cached_entries(), 1);
    }
}
