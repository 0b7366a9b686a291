//! Pan / zoom interaction state. The controller mutates the viewport and reports
//! whether a redraw is needed; it never draws.
use log::{debug, info};

use crate::graphing::config::ControllerConfig;
use crate::graphing::error::Result;
use crate::graphing::viewport::Viewport;

/// Input events in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// negative `delta_y` scrolls up, which zooms in
    Wheel { x: f64, y: f64, delta_y: f64 },
    Reset,
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// last pointer position seen while dragging
    Dragging { x: f64, y: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct ViewController {
    config: ControllerConfig,
    state: DragState,
}

impl ViewController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Zoom factor for a wheel delta; `None` for a zero delta.
    pub fn zoom_factor(&self, delta_y: f64) -> Option<f64> {
        if delta_y < 0.0 {
            Some(self.config.zoom_in_factor)
        } else if delta_y > 0.0 {
            Some(self.config.zoom_out_factor)
        } else {
            None
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.state = DragState::Dragging { x, y };
        true
    }

    /// Pans by the screen distance since the previous pointer position, converted
    /// with the scale the viewport has now.
    pub fn pointer_move(&mut self, viewport: &mut Viewport, x: f64, y: f64) -> bool {
        let DragState::Dragging { x: last_x, y: last_y } = self.state else {
            return false;
        };
        self.state = DragState::Dragging { x, y };
        let (dx, dy) = (x - last_x, y - last_y);
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        // content follows the pointer; screen y grows downward
        viewport.pan_by(-dx / viewport.scale_x(), dy / viewport.scale_y());
        true
    }

    pub fn pointer_up(&mut self, viewport: &mut Viewport, x: f64, y: f64) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.pointer_move(viewport, x, y);
        self.state = DragState::Idle;
        true
    }

    pub fn wheel(&mut self, viewport: &mut Viewport, x: f64, y: f64, delta_y: f64) -> bool {
        let Some(factor) = self.zoom_factor(delta_y) else {
            return false;
        };
        viewport.zoom_at(x, y, factor)
    }

    pub fn reset(&mut self, viewport: &mut Viewport) -> bool {
        self.state = DragState::Idle;
        viewport.reset();
        info!("viewport reset");
        true
    }

    /// Applies one event; returns whether the frame must be redrawn.
    pub fn handle(&mut self, viewport: &mut Viewport, event: InputEvent) -> Result<bool> {
        let redraw = match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(viewport, x, y),
            InputEvent::PointerUp { x, y } => self.pointer_up(viewport, x, y),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(viewport, x, y, delta_y),
            InputEvent::Reset => self.reset(viewport),
            InputEvent::Resize { width, height } => {
                viewport.resize(width, height)?;
                true
            }
        };
        debug!("{:?} -> {:?}, redraw: {}", event, self.state, redraw);
        Ok(redraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphing::config::ViewportConfig;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(&ViewportConfig::default()).unwrap()
    }

    #[test]
    fn test_drag_keeps_grabbed_point_under_pointer() {
        let mut vp = viewport();
        let mut controller = ViewController::default();
        let grabbed = vp.to_world(100.0, 100.0);
        assert!(controller.pointer_down(100.0, 100.0));
        assert!(controller.is_dragging());
        assert!(controller.pointer_move(&mut vp, 150.0, 130.0));
        assert!(controller.pointer_move(&mut vp, 180.0, 90.0));
        assert!(controller.pointer_up(&mut vp, 200.0, 50.0));
        assert_eq!(controller.state(), DragState::Idle);
        let now = vp.to_world(200.0, 50.0);
        assert_relative_eq!(now.0, grabbed.0, epsilon = 1e-9);
        assert_relative_eq!(now.1, grabbed.1, epsilon = 1e-9);
        // 100 px right and 50 px up at 40 px per unit
        assert_relative_eq!(vp.x_min(), -12.5, epsilon = 1e-9);
        assert_relative_eq!(vp.y_min(), -8.75, epsilon = 1e-9);
    }

    #[test]
    fn test_drag_uses_current_scale() {
        let mut vp = viewport();
        let mut controller = ViewController::default();
        controller.pointer_down(400.0, 300.0);
        controller.pointer_move(&mut vp, 440.0, 300.0);
        // zoom in 2x mid-drag: the next 40 px are half a world unit
        vp.zoom_at(400.0, 300.0, 0.5);
        let x_min = vp.x_min();
        controller.pointer_move(&mut vp, 480.0, 300.0);
        assert_relative_eq!(x_min - vp.x_min(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut vp = viewport();
        let original = vp;
        let mut controller = ViewController::default();
        assert!(!controller.pointer_move(&mut vp, 10.0, 10.0));
        assert!(!controller.pointer_up(&mut vp, 10.0, 10.0));
        assert_eq!(vp, original);
    }

    #[test]
    fn test_wheel_direction() {
        let mut vp = viewport();
        let mut controller = ViewController::default();
        assert!(controller.wheel(&mut vp, 400.0, 300.0, -120.0));
        assert_relative_eq!(vp.x_max() - vp.x_min(), 18.0, epsilon = 1e-9);
        let mut vp = viewport();
        assert!(controller.wheel(&mut vp, 400.0, 300.0, 3.0));
        assert_relative_eq!(vp.x_max() - vp.x_min(), 22.0, epsilon = 1e-9);
        let original = vp;
        assert!(!controller.wheel(&mut vp, 400.0, 300.0, 0.0));
        assert_eq!(vp, original);
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_point() {
        let mut vp = viewport();
        let mut controller = ViewController::default();
        let before = vp.to_world(123.0, 456.0);
        for _ in 0..10 {
            controller.wheel(&mut vp, 123.0, 456.0, -1.0);
        }
        let after = vp.to_world(123.0, 456.0);
        assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
    }

    #[test]
    fn test_handle_events() {
        let mut vp = viewport();
        let original = vp;
        let mut controller = ViewController::default();
        let events = [
            InputEvent::PointerDown { x: 0.0, y: 0.0 },
            InputEvent::PointerMove { x: 10.0, y: 0.0 },
            InputEvent::PointerUp { x: 20.0, y: 5.0 },
            InputEvent::Wheel {
                x: 50.0,
                y: 50.0,
                delta_y: 1.0,
            },
        ];
        for event in events {
            assert!(controller.handle(&mut vp, event).unwrap());
        }
        assert_ne!(vp, original);
        assert!(controller.handle(&mut vp, InputEvent::Reset).unwrap());
        assert_eq!(vp, original);
        assert!(controller
            .handle(&mut vp, InputEvent::Resize { width: 0, height: 5 })
            .is_err());
        assert!(controller
            .handle(&mut vp, InputEvent::Resize { width: 400, height: 300 })
            .unwrap());
        assert_eq!(vp.pixel_width(), 400);
    }
}
