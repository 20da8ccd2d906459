//! Interaction, viewport and SVG output of diagrams

use bstview::domain::interaction::{EdgeStyle, Paint};
use bstview::domain::{
    Canvas, Diagram, DomainError, NodeId, PointerEvent, ScaleExtent, Scene, Theme, TreeBuilder,
    TreeNode,
};

fn diagram(values: &[f64]) -> Diagram {
    let tree = TreeBuilder::build(values).unwrap();
    Diagram::new(&tree, Canvas::default(), ScaleExtent::default())
}

fn selected_edges(d: &Diagram) -> Vec<NodeId> {
    d.scene()
        .edges
        .iter()
        .filter(|e| d.interaction().edge_style(e) == EdgeStyle::Selected)
        .map(|e| e.target)
        .collect()
}

#[test]
fn given_node_clicked_when_another_is_clicked_then_only_the_last_is_selected() {
    let mut d = diagram(&[10.0, 5.0, 15.0, 3.0, 7.0]);

    let first = d.click(3.0).unwrap();
    assert_eq!(selected_edges(&d), vec![first]);

    let second = d.click(15.0).unwrap();
    assert_eq!(selected_edges(&d), vec![second]);
    assert_eq!(d.interaction().node_paint(first), Paint::Default);
    assert_eq!(d.interaction().node_paint(second), Paint::Highlight);
}

#[test]
fn given_root_clicked_when_styling_edges_then_no_edge_is_highlighted() {
    let mut d = diagram(&[10.0, 5.0, 15.0]);

    d.click(10.0).unwrap();

    assert!(selected_edges(&d).is_empty());
    assert_eq!(d.interaction().selected(), Some(NodeId(0)));
}

#[test]
fn given_hovered_node_when_leaving_then_fill_and_label_reset() {
    let mut d = diagram(&[10.0, 5.0, 15.0]);

    let id = d.hover(5.0).unwrap();
    assert_eq!(d.interaction().node_paint(id), Paint::Highlight);
    assert_eq!(
        d.interaction().hover_text(d.scene()).as_deref(),
        Some("Value: 5")
    );
    assert!(d.to_svg(&Theme::default()).contains(r#"<text id="hover-label" x="235" y="540""#));

    assert!(d.leave());
    assert_eq!(d.interaction().node_paint(id), Paint::Default);
    assert_eq!(d.interaction().hover_text(d.scene()), None);
    assert!(!d.to_svg(&Theme::default()).contains("hover-label"));
}

#[test]
fn given_selected_node_when_hover_ends_then_it_stays_highlighted() {
    let mut d = diagram(&[10.0, 5.0, 15.0]);
    let id = d.click(15.0).unwrap();

    d.handle(PointerEvent::Enter(id));
    d.handle(PointerEvent::Leave(id));

    assert_eq!(d.interaction().node_paint(id), Paint::Highlight);
}

#[test]
fn given_missing_value_when_clicking_then_reports_node_not_found() {
    let mut d = diagram(&[10.0, 5.0]);
    assert_eq!(d.click(99.0), Err(DomainError::NodeNotFound("99".into())));
    assert_eq!(d.interaction().selected(), None);
}

#[test]
fn given_duplicate_values_when_clicking_then_picks_first_in_preorder() {
    let mut d = diagram(&[5.0, 5.0, 5.0]);
    assert_eq!(d.click(5.0), Ok(NodeId(0)));
}

#[test]
fn given_extreme_zoom_when_applied_then_stays_within_scale_extent() {
    let mut d = diagram(&[10.0, 5.0, 15.0]);

    d.viewport_mut().zoom(8.0);
    assert_eq!(d.viewport().transform().k, 2.0);
    assert!(d
        .to_svg(&Theme::default())
        .contains(r#"<g transform="translate(-400,-300) scale(2)">"#));

    d.viewport_mut().zoom_by(0.01);
    assert_eq!(d.viewport().transform().k, 0.5);
}

#[test]
fn given_zoomed_in_view_when_panning_far_then_view_stays_on_canvas() {
    let mut d = diagram(&[10.0, 5.0, 15.0]);
    d.viewport_mut().zoom(2.0);

    d.viewport_mut().pan(5000.0, -5000.0);

    let t = d.viewport().transform();
    // visible region in diagram units stays within 0..800 x 0..600
    assert!(t.invert_x(0.0) >= -1e-9);
    assert!(t.invert_x(800.0) <= 800.0 + 1e-9);
    assert!(t.invert_y(0.0) >= -1e-9);
    assert!(t.invert_y(600.0) <= 600.0 + 1e-9);
}

#[test]
fn given_custom_theme_when_rendering_then_uses_its_colours() {
    let mut d = diagram(&[2.0, 1.0]);
    d.click(1.0).unwrap();
    let theme = Theme {
        default_color: "#112233".into(),
        highlight_color: "#ffcc00".into(),
        ..Theme::default()
    };

    let svg = d.to_svg(&theme);

    assert!(svg.contains(r##"fill="#112233""##));
    assert!(svg.contains(r##"stroke="#ffcc00" stroke-width="4""##));
}

/// Right-leaning chain `0..=len`, the shape sorted input builds.
fn chain(len: u32) -> TreeNode {
    let mut node = TreeNode::leaf(f64::from(len));
    for value in (0..len).rev() {
        node = TreeNode {
            value: f64::from(value),
            left: None,
            right: Some(Box::new(node)),
        };
    }
    node
}

#[test]
fn given_deep_chain_when_building_scene_then_every_node_and_edge_is_present() {
    let tree = chain(50_000);

    let scene = Scene::build(Some(&tree), &Canvas::default());

    assert_eq!(scene.nodes.len(), 50_001);
    assert_eq!(scene.edges.len(), 50_000);
    let last = &scene.nodes[50_000];
    assert_eq!(last.value, 50_000.0);
    assert_eq!(last.parent, Some(NodeId(49_999)));
}

#[test]
fn given_deep_chain_when_rendering_and_selecting_then_completes() {
    let tree = chain(50_000);
    let mut d = Diagram::new(&tree, Canvas::default(), ScaleExtent::default());

    let id = d.click(50_000.0).unwrap();
    let svg = d.to_svg(&Theme::default());

    assert_eq!(selected_edges(&d), vec![id]);
    assert_eq!(svg.matches("<circle").count(), 50_001);
    drop(d);
    drop(tree);
}
