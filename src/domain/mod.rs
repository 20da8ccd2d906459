//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod diagram;
pub mod entities;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod parse;
pub mod scene;
pub mod viewport;

pub use builder::TreeBuilder;
pub use diagram::{Diagram, Theme, PLACEHOLDER};
pub use entities::*;
pub use error::DomainError;
pub use interaction::{Interaction, PointerEvent};
pub use layout::{layout, Canvas, LayoutNode, Margin};
pub use parse::parse_numbers;
pub use scene::{NodeId, Scene};
pub use viewport::{ScaleExtent, Viewport, ZoomTransform};
