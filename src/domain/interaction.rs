//! Hover and selection state of a rendered diagram.
//!
//! The flags live next to the scene, never on [`TreeNode`](crate::domain::TreeNode),
//! and styles are recomputed from them on every query.

use crate::domain::scene::{NodeId, Scene, SceneEdge};

/// Pointer events delivered to a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(NodeId),
    Leave(NodeId),
    Click(NodeId),
}

/// Which of the two theme colours an element uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Default,
    Highlight,
}

/// Stroke of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Default,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interaction {
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
}

impl Interaction {
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Apply one event. Returns whether anything visible changed.
    ///
    /// Events naming nodes outside `scene` are ignored.
    pub fn apply(&mut self, scene: &Scene, event: PointerEvent) -> bool {
        let before = *self;
        match event {
            PointerEvent::Enter(id) if scene.node(id).is_some() => self.hovered = Some(id),
            PointerEvent::Leave(id) if self.hovered == Some(id) => self.hovered = None,
            PointerEvent::Click(id) if scene.node(id).is_some() => self.selected = Some(id),
            _ => {}
        }
        *self != before
    }

    pub fn node_paint(&self, id: NodeId) -> Paint {
        if self.hovered == Some(id) || self.selected == Some(id) {
            Paint::Highlight
        } else {
            Paint::Default
        }
    }

    pub fn edge_style(&self, edge: &SceneEdge) -> EdgeStyle {
        if self.selected == Some(edge.target) {
            EdgeStyle::Selected
        } else {
            EdgeStyle::Default
        }
    }

    /// Transient `Value: <v>` text for the hovered node.
    pub fn hover_text(&self, scene: &Scene) -> Option<String> {
        let node = scene.node(self.hovered?)?;
        Some(format!("Value: {}", node.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;
    use crate::domain::layout::Canvas;

    fn scene() -> Scene {
        let tree = TreeBuilder::build(&[10.0, 5.0, 15.0, 3.0, 7.0]).unwrap();
        Scene::build(Some(&tree), &Canvas::default())
    }

    #[test]
    fn given_idle_diagram_when_queried_then_everything_default() {
        let scene = scene();
        let state = Interaction::default();
        assert!(scene.nodes.iter().all(|n| state.node_paint(n.id) == Paint::Default));
        assert!(scene.edges.iter().all(|e| state.edge_style(e) == EdgeStyle::Default));
        assert_eq!(state.hover_text(&scene), None);
    }

    #[test]
    fn given_hovered_node_when_pointer_leaves_then_restores_default() {
        let scene = scene();
        let mut state = Interaction::default();
        assert!(state.apply(&scene, PointerEvent::Enter(NodeId(1))));
        assert_eq!(state.node_paint(NodeId(1)), Paint::Highlight);
        assert_eq!(state.hover_text(&scene).as_deref(), Some("Value: 5"));

        assert!(state.apply(&scene, PointerEvent::Leave(NodeId(1))));
        assert_eq!(state.node_paint(NodeId(1)), Paint::Default);
        assert_eq!(state.hover_text(&scene), None);
    }

    #[test]
    fn given_leave_for_other_node_when_applied_then_hover_kept() {
        let scene = scene();
        let mut state = Interaction::default();
        state.apply(&scene, PointerEvent::Enter(NodeId(2)));
        assert!(!state.apply(&scene, PointerEvent::Leave(NodeId(3))));
        assert_eq!(state.hovered(), Some(NodeId(2)));
    }

    #[test]
    fn given_selected_node_when_hover_ends_then_stays_highlighted() {
        let scene = scene();
        let mut state = Interaction::default();
        state.apply(&scene, PointerEvent::Enter(NodeId(4)));
        state.apply(&scene, PointerEvent::Click(NodeId(4)));
        state.apply(&scene, PointerEvent::Leave(NodeId(4)));
        assert_eq!(state.node_paint(NodeId(4)), Paint::Highlight);
    }

    #[test]
    fn given_unknown_node_when_clicked_then_ignored() {
        let scene = scene();
        let mut state = Interaction::default();
        assert!(!state.apply(&scene, PointerEvent::Click(NodeId(99))));
        assert_eq!(state.selected(), None);
    }
}
