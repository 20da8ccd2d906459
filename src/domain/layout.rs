//! Tidy tree layout.
//!
//! Node positions follow the Reingold-Tilford rules with Walker's linear-time
//! apportioning (Buchheim, Jünger and Leipert): parents sit centred above their
//! children, subtrees never overlap, and identical subtrees get identical
//! shapes. Unit positions are then fitted into the inner canvas, one fixed
//! y-band per depth, and translated so the root is horizontally centred.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::TreeNode;
use crate::domain::error::DomainError;

/// Space left free on each side of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

impl Margin {
    pub fn uniform(size: f64) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }
}

/// Logical drawing surface the layout is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: Margin::default(),
        }
    }
}

impl Canvas {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Reject sizes that leave no room to draw.
    pub fn validate(&self) -> Result<(), DomainError> {
        let margins = [
            self.margin.top,
            self.margin.right,
            self.margin.bottom,
            self.margin.left,
        ];
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(DomainError::InvalidCanvas("size must be finite".into()));
        }
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(DomainError::InvalidCanvas(
                "margins must be finite and non-negative".into(),
            ));
        }
        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(DomainError::InvalidCanvas(format!(
                "margins leave no drawing area in {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Positioned node, one per [`TreeNode`], in canvas coordinates.
#[derive(Debug)]
pub struct LayoutNode<'a> {
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub data: &'a TreeNode,
    pub children: Vec<LayoutNode<'a>>,
}

impl<'a> LayoutNode<'a> {
    /// Pre-order traversal, parents before children, left before right.
    pub fn descendants(&self) -> Vec<&LayoutNode<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Parent/child pairs in pre-order of the child.
    pub fn links(&self) -> Vec<(&LayoutNode<'a>, &LayoutNode<'a>)> {
        self.descendants()
            .into_iter()
            .flat_map(|parent| parent.children.iter().map(move |child| (parent, child)))
            .collect()
    }
}

/// Same shape, values and positions, compared in pre-order.
impl PartialEq for LayoutNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        let (ours, theirs) = (self.descendants(), other.descendants());
        ours.len() == theirs.len()
            && ours.iter().zip(&theirs).all(|(a, b)| {
                a.x == b.x
                    && a.y == b.y
                    && a.depth == b.depth
                    && a.data.value == b.data.value
                    && a.children.len() == b.children.len()
            })
    }
}

impl Drop for LayoutNode<'_> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Lay out `root` on `canvas`. `None` in, `None` out.
pub fn layout<'a>(root: Option<&'a TreeNode>, canvas: &Canvas) -> Option<LayoutNode<'a>> {
    let root = root?;
    let mut tidy = TidyTree::new(root);
    tidy.position();
    tidy.fit(canvas);
    let result = tidy.into_layout()?;
    debug!(nodes = root.len(), root_x = result.x, "layout computed");
    Some(result)
}

/// Index of the virtual parent above the root.
const SENTINEL: usize = 0;
const ROOT: usize = 1;

#[derive(Debug)]
struct Slot<'a> {
    data: &'a TreeNode,
    parent: usize,
    children: Vec<usize>,
    /// position among siblings
    number: usize,
    depth: usize,
    ancestor: usize,
    default_ancestor: Option<usize>,
    thread: Option<usize>,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    x: f64,
    y: f64,
}

impl<'a> Slot<'a> {
    fn new(index: usize, data: &'a TreeNode, parent: usize, number: usize, depth: usize) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
            number,
            depth,
            ancestor: index,
            default_ancestor: None,
            thread: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Working table for the layout pass. Slots are stored in pre-order, so
/// every descendant has a larger index than its ancestors.
struct TidyTree<'a> {
    slots: Vec<Slot<'a>>,
}

impl<'a> TidyTree<'a> {
    fn new(root: &'a TreeNode) -> Self {
        // sentinel: virtual parent of the root
        let mut slots = vec![Slot::new(SENTINEL, root, SENTINEL, 0, 0)];
        let mut stack = vec![(root, SENTINEL, 0usize)];
        while let Some((node, parent, depth)) = stack.pop() {
            let index = slots.len();
            let number = slots[parent].children.len();
            slots[parent].children.push(index);
            slots.push(Slot::new(index, node, parent, number, depth));
            let children: Vec<&TreeNode> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, index, depth + 1));
            }
        }
        Self { slots }
    }

    fn postorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut stack = vec![(ROOT, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                out.push(v);
                continue;
            }
            stack.push((v, true));
            for &child in self.slots[v].children.iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.slots[a].parent == self.slots[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.slots[v].children.first().copied().or(self.slots[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.slots[v].children.last().copied().or(self.slots[v].thread)
    }

    fn position(&mut self) {
        for v in self.postorder() {
            self.first_walk(v);
        }
        self.slots[SENTINEL].modifier = -self.slots[ROOT].prelim;
        // pre-order, which is slot order
        for v in ROOT..self.slots.len() {
            let parent_mod = self.slots[self.slots[v].parent].modifier;
            let slot = &mut self.slots[v];
            slot.x = slot.prelim + parent_mod;
            slot.modifier += parent_mod;
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.slots[v].parent;
        let number = self.slots[v].number;
        let left_sibling = (number > 0).then(|| self.slots[parent].children[number - 1]);

        if let (Some(&first), Some(&last)) =
            (self.slots[v].children.first(), self.slots[v].children.last())
        {
            self.execute_shifts(v);
            let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    let prelim = self.slots[w].prelim + self.separation(v, w);
                    self.slots[v].prelim = prelim;
                    self.slots[v].modifier = prelim - midpoint;
                }
                None => self.slots[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
        }

        let ancestor = self.slots[parent]
            .default_ancestor
            .unwrap_or(self.slots[parent].children[0]);
        let ancestor = self.apportion(v, left_sibling, ancestor);
        self.slots[parent].default_ancestor = Some(ancestor);
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.slots[v].children.len()).rev() {
            let w = self.slots[v].children[i];
            let slot = &mut self.slots[w];
            slot.prelim += shift;
            slot.modifier += shift;
            change += slot.change;
            shift += slot.shift + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = (self.slots[wp].number - self.slots[wm].number) as f64;
        let change = shift / subtrees;
        self.slots[wp].change -= change;
        self.slots[wp].shift += shift;
        self.slots[wm].change += change;
        self.slots[wp].prelim += shift;
        self.slots[wp].modifier += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.slots[vim].ancestor;
        if self.slots[candidate].parent == self.slots[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    /// Push the subtree of `v` right until it clears the contour of its left
    /// siblings, threading contours that end early.
    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let parent = self.slots[v].parent;
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.slots[parent].children[0];
        let mut sip = self.slots[vip].modifier;
        let mut sop = self.slots[vop].modifier;
        let mut sim = self.slots[vim].modifier;
        let mut som = self.slots[vom].modifier;

        let (mut inner_left, mut inner_right) = (self.next_right(vim), self.next_left(vip));
        while let (Some(im), Some(ip)) = (inner_left, inner_right) {
            vim = im;
            vip = ip;
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.slots[vop].ancestor = v;
            let shift = self.slots[vim].prelim + sim - self.slots[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let from = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(from, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.slots[vim].modifier;
            sip += self.slots[vip].modifier;
            som += self.slots[vom].modifier;
            sop += self.slots[vop].modifier;
            inner_left = self.next_right(vim);
            inner_right = self.next_left(vip);
        }

        if let Some(im) = inner_left {
            if self.next_right(vop).is_none() {
                self.slots[vop].thread = Some(im);
                self.slots[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = inner_right {
            if self.next_left(vom).is_none() {
                self.slots[vom].thread = Some(ip);
                self.slots[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    /// Scale unit positions into the inner canvas, move them into canvas
    /// space and centre the root on the canvas width.
    fn fit(&mut self, canvas: &Canvas) {
        let nodes = ROOT..self.slots.len();
        let (mut left, mut right, mut bottom) = (ROOT, ROOT, ROOT);
        for v in nodes.clone() {
            if self.slots[v].x < self.slots[left].x {
                left = v;
            }
            if self.slots[v].x > self.slots[right].x {
                right = v;
            }
            if self.slots[v].depth > self.slots[bottom].depth {
                bottom = v;
            }
        }
        let pad = if left == right {
            1.0
        } else {
            self.separation(left, right) / 2.0
        };
        let tx = pad - self.slots[left].x;
        let kx = canvas.inner_width() / (self.slots[right].x + pad + tx);
        let max_depth = self.slots[bottom].depth;
        let ky = if max_depth == 0 {
            canvas.inner_height()
        } else {
            canvas.inner_height() / max_depth as f64
        };
        for v in nodes.clone() {
            let slot = &mut self.slots[v];
            slot.x = (slot.x + tx) * kx + canvas.margin.left;
            slot.y = slot.depth as f64 * ky + canvas.margin.top;
        }

        let offset = canvas.width / 2.0 - self.slots[ROOT].x;
        for v in nodes {
            self.slots[v].x += offset;
        }
    }

    /// Assemble the nested result bottom-up: in reverse slot order every
    /// child is finished before its parent.
    fn into_layout(self) -> Option<LayoutNode<'a>> {
        let mut built: Vec<Option<LayoutNode<'a>>> = Vec::new();
        built.resize_with(self.slots.len(), || None);
        for v in (ROOT..self.slots.len()).rev() {
            let slot = &self.slots[v];
            let children = slot
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[v] = Some(LayoutNode {
                x: slot.x,
                y: slot.y,
                depth: slot.depth,
                data: slot.data,
                children,
            });
        }
        built.get_mut(ROOT).and_then(Option::take)
    }
}
