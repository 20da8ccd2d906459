//! Diagram rendering service
//!
//! Builds diagrams from trees using the configured canvas, theme and zoom
//! bounds, and writes them out as SVG.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{layout, Diagram, TreeNode};
use crate::infrastructure::traits::FileSystem;

/// View adjustments applied to a fresh diagram before it is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Click the first node with this value
    pub select: Option<f64>,
    /// Hover the first node with this value
    pub hover: Option<f64>,
    pub zoom: Option<f64>,
    /// Pan in screen units, applied after zooming
    pub pan: Option<(f64, f64)>,
}

/// Node position as reported by the layout command.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub value: f64,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

pub struct RenderService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl RenderService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Fresh diagram with no interaction and identity zoom.
    pub fn diagram(&self, tree: &TreeNode) -> Diagram {
        Diagram::new(tree, self.settings.canvas, self.settings.zoom)
    }

    /// Diagram with `options` applied in order: select, hover, zoom, pan.
    pub fn prepare(&self, tree: &TreeNode, options: &RenderOptions) -> ApplicationResult<Diagram> {
        let mut diagram = self.diagram(tree);
        if let Some(value) = options.select {
            diagram.click(value)?;
        }
        if let Some(value) = options.hover {
            diagram.hover(value)?;
        }
        if let Some(k) = options.zoom {
            diagram.viewport_mut().zoom(k);
        }
        if let Some((dx, dy)) = options.pan {
            diagram.viewport_mut().pan(dx, dy);
        }
        Ok(diagram)
    }

    /// Pre-order node positions in canvas coordinates.
    pub fn positions(&self, tree: &TreeNode) -> Vec<NodePosition> {
        layout(Some(tree), &self.settings.canvas)
            .map(|root| {
                root.descendants()
                    .into_iter()
                    .map(|n| NodePosition {
                        value: n.data.value,
                        depth: n.depth,
                        x: n.x,
                        y: n.y,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Output path: explicit `path`, else the configured default.
    pub fn output_path(&self, path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.output.path.clone())
    }

    #[instrument(skip(self, diagram))]
    pub fn write(&self, diagram: &Diagram, path: &Path) -> ApplicationResult<()> {
        let svg = diagram.to_svg(&self.settings.theme);
        self.fs
            .write(path, &svg)
            .with_path_context("write diagram", path)?;
        debug!(bytes = svg.len(), "diagram written");
        Ok(())
    }
}
