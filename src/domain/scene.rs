//! Flattened drawing model derived from a layout.

use std::fmt;

use crate::domain::entities::{format_value, TreeNode};
use crate::domain::layout::{layout, Canvas, LayoutNode};

/// Position of a node in the scene (pre-order index, root = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub value: f64,
    pub label: String,
}

/// Connector from a parent to one of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    /// Lay out `root` and flatten the result. An absent tree gives an empty scene.
    pub fn build(root: Option<&TreeNode>, canvas: &Canvas) -> Self {
        match layout(root, canvas) {
            Some(positioned) => Self::from_layout(&positioned),
            None => Self::default(),
        }
    }

    pub fn from_layout(root: &LayoutNode<'_>) -> Self {
        let mut scene = Self::default();
        let mut stack: Vec<(&LayoutNode<'_>, Option<NodeId>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let id = NodeId(scene.nodes.len());
            scene.nodes.push(SceneNode {
                id,
                parent,
                x: node.x,
                y: node.y,
                depth: node.depth,
                value: node.data.value,
                label: format_value(node.data.value),
            });
            if let Some(source) = parent {
                scene.edges.push(SceneEdge { source, target: id });
            }
            stack.extend(node.children.iter().rev().map(|c| (c, Some(id))));
        }
        scene
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// First node in pre-order carrying `value`.
    pub fn find_value(&self, value: f64) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.value == value).map(|n| n.id)
    }

    /// Edge whose target is `id`; `None` for the root.
    pub fn incoming_edge(&self, id: NodeId) -> Option<&SceneEdge> {
        self.edges.iter().find(|e| e.target == id)
    }

    /// Vertical cubic connector between the edge's endpoints.
    pub fn edge_path(&self, edge: &SceneEdge) -> Option<String> {
        let source = self.node(edge.source)?;
        let target = self.node(edge.target)?;
        Some(vertical_link(source.x, source.y, target.x, target.y))
    }
}

/// `M sx,sy C sx,my tx,my tx,ty` with `my` halfway between the two rows.
pub fn vertical_link(sx: f64, sy: f64, tx: f64, ty: f64) -> String {
    let my = (sy + ty) / 2.0;
    format!("M{sx},{sy}C{sx},{my} {tx},{my} {tx},{ty}")
}
