//! Pure arena logic for BridgeCross.
//!
//! This crate contains everything about a match that can be decided without
//! threads or shared state. Functions take plain data and return results,
//! making them unit-testable and usable from the concurrency core, the
//! headless harness, and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Arena description (JSON), agents, timing, bundled arenas |
//! | [`constants`] | Layout glyphs, default markers, default cadences |
//! | [`geometry`] | Arena validation (spawns, corridor shape, goal reachability, funnel) |
//! | [`goals`] | Goal-side rules: which goal cells win for which agent |
//! | [`grid`] | Immutable layout of walls, floor, corridor and goal cells |
//! | [`movement`] | Directions and single-step planning against the layout |

pub mod config;
pub mod constants;
pub mod geometry;
pub mod goals;
pub mod grid;
pub mod movement;
