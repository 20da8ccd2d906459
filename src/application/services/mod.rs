//! Application services

pub mod render;
pub mod tree;

pub use render::{NodePosition, RenderOptions, RenderService};
pub use tree::{GenerateOutcome, TreeService};
