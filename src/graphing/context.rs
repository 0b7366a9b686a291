//! Session state passed to every component instead of process-wide globals.
//!
//! Editing operations and input events only mark the frame dirty; drawing happens
//! in [`PlotContext::render_if_requested`], one complete frame per call. Requests
//! that arrive while a frame is pending are coalesced into that frame.
use log::{debug, info};

use crate::graphing::classifier::Family;
use crate::graphing::config::PlotConfig;
use crate::graphing::controller::{InputEvent, ViewController};
use crate::graphing::error::Result;
use crate::graphing::evaluator::ExpressionEvaluator;
use crate::graphing::registry::{EntryId, FunctionRegistry};
use crate::graphing::renderer::{PlotRenderer, Theme};
use crate::graphing::surface::{DrawingSurface, Rgba};
use crate::graphing::viewport::Viewport;

#[derive(Debug)]
pub struct PlotContext {
    config: PlotConfig,
    viewport: Viewport,
    registry: FunctionRegistry,
    controller: ViewController,
    renderer: PlotRenderer,
    redraw_requested: bool,
    frames: u64,
}

impl PlotContext {
    /// Validates `config` and builds a session around it, with the built-in evaluator.
    pub fn new(config: PlotConfig) -> Result<Self> {
        let registry = FunctionRegistry::new(&config.registry);
        Self::with_registry(config, registry)
    }

    /// Same as [`PlotContext::new`] with a custom expression evaluator.
    pub fn with_evaluator(config: PlotConfig, evaluator: Box<dyn ExpressionEvaluator>) -> Result<Self> {
        let registry = FunctionRegistry::with_evaluator(&config.registry, evaluator);
        Self::with_registry(config, registry)
    }

    fn with_registry(config: PlotConfig, registry: FunctionRegistry) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(&config.viewport)?;
        let controller = ViewController::new(config.controller.clone());
        let renderer = PlotRenderer::new(config.render.clone(), config.sampler.clone());
        info!(
            "plot context created: {}x{} px, theme {}",
            viewport.pixel_width(),
            viewport.pixel_height(),
            config.render.theme
        );
        Ok(Self {
            config,
            viewport,
            registry,
            controller,
            renderer,
            redraw_requested: true,
            frames: 0,
        })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn renderer(&self) -> &PlotRenderer {
        &self.renderer
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        if self.controller.handle(&mut self.viewport, event)? {
            self.request_redraw();
        }
        Ok(())
    }

    pub fn add_equation(&mut self, raw_input: &str) -> EntryId {
        let id = self.registry.add(raw_input);
        self.request_redraw();
        id
    }

    pub fn update_equation(&mut self, id: EntryId, raw_input: &str) -> Result<()> {
        self.registry.update_input(id, raw_input)?;
        self.request_redraw();
        Ok(())
    }

    pub fn remove_equation(&mut self, id: EntryId) -> Result<()> {
        self.registry.remove(id)?;
        self.request_redraw();
        Ok(())
    }

    pub fn set_visible(&mut self, id: EntryId, visible: bool) -> Result<()> {
        self.registry.set_visible(id, visible)?;
        self.request_redraw();
        Ok(())
    }

    pub fn toggle_visible(&mut self, id: EntryId) -> Result<bool> {
        let visible = self.registry.toggle_visible(id)?;
        self.request_redraw();
        Ok(visible)
    }

    pub fn set_color(&mut self, id: EntryId, color: Rgba) -> Result<()> {
        self.registry.set_color(id, color)?;
        self.request_redraw();
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.renderer.theme() != theme {
            self.renderer.set_theme(theme);
            self.config.render.theme = theme;
            self.request_redraw();
        }
    }

    /// Entries that failed to classify or compile, with their attempted family.
    pub fn errors(&self) -> Vec<(EntryId, Option<Family>, String)> {
        self.registry
            .iter()
            .filter_map(|e| e.error().map(|err| (e.id(), e.family(), err.to_string())))
            .collect()
    }

    /// Draws a frame unconditionally.
    pub fn render(&mut self, surface: &mut dyn DrawingSurface) -> Result<()> {
        let (width, height) = surface.size();
        if (width, height) != (self.viewport.pixel_width(), self.viewport.pixel_height()) {
            debug!("surface is {}x{}, resizing viewport", width, height);
            self.viewport.resize(width, height)?;
        }
        // a failed frame leaves the request pending
        self.renderer.render(&self.viewport, &self.registry, surface)?;
        self.redraw_requested = false;
        self.frames += 1;
        Ok(())
    }

    /// Draws a frame if one was requested since the last one; returns whether it drew.
    pub fn render_if_requested(&mut self, surface: &mut dyn DrawingSurface) -> Result<bool> {
        if !self.redraw_requested {
            return Ok(false);
        }
        self.render(surface)?;
        Ok(true)
    }
}
