// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]
//! # RustedGraph
//!
//! Classification, sampling and rasterisation engine of an interactive function
//! plotter, built on the symbolic expression engine in [`symbolic`].
//!
//! - [`symbolic`]: expression tree, parser and compilation to closures
//! - [`graphing`]: viewport, equation classifier, curve sampler, renderer,
//!   view controller and equation registry
//! - [`Utils`]: logger set-up
pub mod Utils;
pub mod graphing;
pub mod symbolic;
