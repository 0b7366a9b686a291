//! # Graphing
//!
//! Interactive function plotting: an equation typed by the user is classified into
//! one of five families, compiled, sampled under the current viewport and drawn on an
//! abstract 2-D surface that supports pan and zoom.
//!
//! | family | example | sampled as |
//! |---|---|---|
//! | explicit | `y = x^2`, `sin(x)` | one point per pixel column |
//! | parametric | `x(t) = cos(t), y(t) = sin(t)` | sweep of `t` in [-10, 10] |
//! | polar | `r = 1 + sin(theta)` | sweep of θ in [0, 2π] |
//! | implicit | `x^2 + y^2 = 4` | mask of grid cells where `lhs - rhs` is near zero |
//! | inequality | `y > x^2` | mask of grid cells where the relation holds |
//!
//! # Example
//! ```
//! use RustedGraph::graphing::config::PlotConfig;
//! use RustedGraph::graphing::context::PlotContext;
//! use RustedGraph::graphing::controller::InputEvent;
//! use RustedGraph::graphing::surface::RecordingSurface;
//!
//! let mut ctx = PlotContext::new(PlotConfig::default()).unwrap();
//! ctx.add_equation("y = 1/x");
//! ctx.add_equation("x^2 + y^2 <= 9");
//! ctx.handle_event(InputEvent::Wheel { x: 400.0, y: 300.0, delta_y: -1.0 }).unwrap();
//!
//! let mut surface = RecordingSurface::new(800, 600);
//! assert!(ctx.render_if_requested(&mut surface).unwrap());
//! assert!(!surface.commands().is_empty());
//! ```
/// classification of raw input into equation families
pub mod classifier;
/// typed configuration, loadable from TOML
pub mod config;
/// session object owning viewport, registry, controller and renderer
pub mod context;
/// pan / zoom interaction state machine
pub mod controller;
/// error types
pub mod error;
/// the expression-compilation seam and its symbolic implementation
pub mod evaluator;
/// drawing surface backed by plotters
pub mod plotters_surface;
/// ordered collection of equation entries
pub mod registry;
/// grid, axes and entries onto a drawing surface
pub mod renderer;
/// per-family sampling strategies
pub mod sampler;
/// drawing-surface trait, colours, pixel buffers
pub mod surface;
/// world <-> screen transform
pub mod viewport;
