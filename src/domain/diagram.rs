//! A rendered tree: scene, interaction state and viewport, plus SVG output.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::TreeNode;
use crate::domain::error::DomainError;
use crate::domain::interaction::{EdgeStyle, Interaction, Paint, PointerEvent};
use crate::domain::layout::Canvas;
use crate::domain::scene::{NodeId, Scene};
use crate::domain::viewport::{ScaleExtent, Viewport};

/// Shown instead of a diagram when no tree is selected.
pub const PLACEHOLDER: &str = "Select or generate a tree to visualize it";

/// Visual constants of the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub default_color: String,
    pub highlight_color: String,
    pub node_radius: f64,
    pub edge_width: f64,
    pub selected_edge_width: f64,
    pub border_width: f64,
    pub font_family: String,
    pub font_size: f64,
    /// distance of the value label above the node centre
    pub label_offset: f64,
    pub hover_offset_x: f64,
    pub hover_offset_y: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            default_color: "#00ff00".into(),
            highlight_color: "#ffffff".into(),
            node_radius: 20.0,
            edge_width: 2.0,
            selected_edge_width: 4.0,
            border_width: 2.0,
            font_family: "Courier New".into(),
            font_size: 14.0,
            label_offset: 25.0,
            hover_offset_x: 10.0,
            hover_offset_y: -10.0,
        }
    }
}

impl Theme {
    fn paint(&self, paint: Paint) -> &str {
        match paint {
            Paint::Default => &self.default_color,
            Paint::Highlight => &self.highlight_color,
        }
    }
}

/// Diagram of one tree. Rebuilt from scratch for every tree shown.
#[derive(Debug, Clone)]
pub struct Diagram {
    canvas: Canvas,
    scene: Scene,
    interaction: Interaction,
    viewport: Viewport,
}

impl Diagram {
    pub fn new(root: &TreeNode, canvas: Canvas, scale_extent: ScaleExtent) -> Self {
        let scene = Scene::build(Some(root), &canvas);
        debug!(nodes = scene.nodes.len(), "diagram built");
        Self {
            canvas,
            scene,
            interaction: Interaction::default(),
            viewport: Viewport::new(canvas.width, canvas.height, scale_extent),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Resolve a node by value (first match in pre-order).
    pub fn find(&self, value: f64) -> Result<NodeId, DomainError> {
        self.scene
            .find_value(value)
            .ok_or_else(|| DomainError::NodeNotFound(crate::domain::format_value(value)))
    }

    pub fn handle(&mut self, event: PointerEvent) -> bool {
        let changed = self.interaction.apply(&self.scene, event);
        debug!(?event, changed, "pointer event");
        changed
    }

    pub fn hover(&mut self, value: f64) -> Result<NodeId, DomainError> {
        let id = self.find(value)?;
        self.handle(PointerEvent::Enter(id));
        Ok(id)
    }

    /// End the current hover, if any.
    pub fn leave(&mut self) -> bool {
        match self.interaction.hovered() {
            Some(id) => self.handle(PointerEvent::Leave(id)),
            None => false,
        }
    }

    pub fn click(&mut self, value: f64) -> Result<NodeId, DomainError> {
        let id = self.find(value)?;
        self.handle(PointerEvent::Click(id));
        Ok(id)
    }

    pub fn to_svg(&self, theme: &Theme) -> String {
        SvgDocument {
            diagram: self,
            theme,
        }
        .to_string()
    }
}

struct SvgDocument<'a> {
    diagram: &'a Diagram,
    theme: &'a Theme,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagram {
            canvas,
            scene,
            interaction,
            viewport,
        } = self.diagram;
        let theme = self.theme;
        let font = escape(&theme.font_family);

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" preserveAspectRatio="xMidYMid meet" style="border: {b}px solid {c}">"#,
            w = canvas.width,
            h = canvas.height,
            b = theme.border_width,
            c = escape(&theme.default_color),
        )?;
        writeln!(f, r#"  <g transform="{}">"#, viewport.transform().to_svg())?;

        writeln!(f, r#"    <g class="links" fill="none">"#)?;
        for edge in &scene.edges {
            let Some(path) = scene.edge_path(edge) else {
                continue;
            };
            let (color, width) = match interaction.edge_style(edge) {
                EdgeStyle::Default => (&theme.default_color, theme.edge_width),
                EdgeStyle::Selected => (&theme.highlight_color, theme.selected_edge_width),
            };
            writeln!(
                f,
                r#"      <path data-source="{}" data-target="{}" d="{}" stroke="{}" stroke-width="{}"/>"#,
                edge.source,
                edge.target,
                path,
                escape(color),
                width
            )?;
        }
        writeln!(f, "    </g>")?;

        writeln!(f, r#"    <g class="nodes">"#)?;
        for node in &scene.nodes {
            writeln!(
                f,
                r#"      <circle data-node="{}" cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                node.id,
                node.x,
                node.y,
                theme.node_radius,
                escape(theme.paint(interaction.node_paint(node.id)))
            )?;
        }
        writeln!(f, "    </g>")?;

        writeln!(
            f,
            r#"    <g class="labels" text-anchor="middle" fill="{}" style="font-size: {}px; font-family: {}">"#,
            escape(&theme.default_color),
            theme.font_size,
            font
        )?;
        for node in &scene.nodes {
            writeln!(
                f,
                r#"      <text x="{}" y="{}">{}</text>"#,
                node.x,
                node.y - theme.label_offset,
                escape(&node.label)
            )?;
        }
        writeln!(f, "    </g>")?;

        if let (Some(id), Some(text)) = (interaction.hovered(), interaction.hover_text(scene)) {
            if let Some(node) = scene.node(id) {
                writeln!(
                    f,
                    r#"    <text id="hover-label" x="{}" y="{}" fill="{}">{}</text>"#,
                    node.x + theme.hover_offset_x,
                    node.y + theme.hover_offset_y,
                    escape(&theme.highlight_color),
                    escape(&text)
                )?;
            }
        }

        writeln!(f, "  </g>")?;
        write!(f, "</svg>")
    }
}

/// Minimal XML escaping for text and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// One-line summary used in logs and terminal output.
pub fn describe(diagram: &Diagram) -> String {
    let mut out = String::new();
    let scene = diagram.scene();
    let _ = write!(out, "{} nodes, {} edges", scene.nodes.len(), scene.edges.len());
    if let Some(id) = diagram.interaction().selected() {
        if let Some(node) = scene.node(id) {
            let _ = write!(out, ", selected {}", node.label);
        }
    }
    let k = diagram.viewport().transform().k;
    if k != 1.0 {
        let _ = write!(out, ", zoom {k}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;

    fn diagram(values: &[f64]) -> Diagram {
        let tree = TreeBuilder::build(values).unwrap();
        Diagram::new(&tree, Canvas::default(), ScaleExtent::default())
    }

    #[test]
    fn given_diagram_when_rendering_then_emits_one_circle_and_label_per_node() {
        let svg = diagram(&[10.0, 5.0, 15.0, 3.0, 7.0]).to_svg(&Theme::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 5);
        assert_eq!(svg.matches("<path").count(), 4);
        assert!(svg.contains(r#"<text x="400" y="25">10</text>"#));
        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
    }

    #[test]
    fn given_clicked_node_when_rendering_then_highlights_its_incoming_edge_only() {
        let mut d = diagram(&[10.0, 5.0, 15.0]);
        d.click(15.0).unwrap();
        let svg = d.to_svg(&Theme::default());
        assert_eq!(svg.matches(r##"stroke="#ffffff" stroke-width="4""##).count(), 1);
        assert!(svg.contains(
            r##"data-target="n2" d="M400,50C400,300 575,300 575,550" stroke="#ffffff""##
        ));
    }

    #[test]
    fn given_hovered_node_when_rendering_then_shows_value_label() {
        let mut d = diagram(&[10.0, 5.0]);
        d.hover(5.0).unwrap();
        let svg = d.to_svg(&Theme::default());
        assert!(svg.contains(r#"id="hover-label""#));
        assert!(svg.contains("Value: 5"));
        d.leave();
        assert!(!d.to_svg(&Theme::default()).contains("hover-label"));
    }

    #[test]
    fn given_missing_value_when_clicking_then_reports_not_found() {
        let mut d = diagram(&[1.0]);
        assert_eq!(d.click(2.0), Err(DomainError::NodeNotFound("2".into())));
    }

    #[test]
    fn given_markup_in_theme_when_rendering_then_escapes() {
        let theme = Theme {
            font_family: "A&B".into(),
            ..Theme::default()
        };
        let svg = diagram(&[1.0]).to_svg(&theme);
        assert!(svg.contains("font-family: A&amp;B"));
    }
}
