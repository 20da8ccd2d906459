//! Binary search tree builder and tidy-tree diagram renderer.
//!
//! Layers, innermost first: `domain` (trees, layout, diagrams), `application`
//! (state and services), `infrastructure` (store client, filesystem, selector,
//! wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
