//! Domain entities: core data structures

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a saved tree.
pub type TreeId = i64;

/// A node of an unbalanced binary search tree.
///
/// Values in `left` are strictly smaller than `value`, values in `right`
/// are greater or equal (ties go right).
///
/// Sorted input degenerates into a chain as deep as the input is long, so
/// `Clone`, `PartialEq` and `Drop` walk the tree with an explicit stack.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(serialize_with = "serialize_number")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Create a leaf.
    pub fn leaf(value: f64) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Children in layout order: left first, then right, empty slots skipped.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.left.iter().chain(self.right.iter()).map(|b| b.as_ref())
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of nodes in this subtree.
    pub fn len(&self) -> usize {
        self.preorder().count()
    }

    /// Always false: a node is at least one element.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Height counted in levels (a leaf has height 1).
    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.children().map(|c| (c, depth + 1)));
        }
        max_depth
    }

    /// Pre-order traversal (node, left subtree, right subtree).
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Values in ascending order (in-order traversal).
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        let mut stack: Vec<&TreeNode> = Vec::new();
        let mut current = Some(self);
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                values.push(node.value);
                current = node.right.as_deref();
            }
        }
        values
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        // pre-order copy: (value, parent index, is left child)
        let mut shape: Vec<(f64, Option<(usize, bool)>)> = Vec::new();
        let mut stack = vec![(self, None)];
        while let Some((node, link)) = stack.pop() {
            let index = shape.len();
            shape.push((node.value, link));
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some((index, false))));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, Some((index, true))));
            }
        }

        // descendants sit after their ancestors, so attach back to front
        let mut built: Vec<TreeNode> = shape.iter().map(|(v, _)| TreeNode::leaf(*v)).collect();
        for index in (1..shape.len()).rev() {
            let child = Some(Box::new(built.swap_remove(index)));
            if let Some((parent, is_left)) = shape[index].1 {
                if is_left {
                    built[parent].left = child;
                } else {
                    built[parent].right = child;
                }
            }
        }
        built.swap_remove(0)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value {
                return false;
            }
            for (x, y) in [(&a.left, &b.left), (&a.right, &b.right)] {
                match (x.as_deref(), y.as_deref()) {
                    (Some(x), Some(y)) => stack.push((x, y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack: Vec<Box<TreeNode>> = self.left.take().into_iter().collect();
        stack.extend(self.right.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Iterator returned by [`TreeNode::preorder`].
pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(node)
    }
}

/// A tree as persisted by the tree store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTree {
    pub id: TreeId,
    /// Comma-separated source text the tree was built from
    pub input_numbers: String,
    /// Root of the tree; accepted as JSON object or JSON-encoded string
    #[serde(default, deserialize_with = "deserialize_tree_structure")]
    pub tree_structure: Option<TreeNode>,
}

impl SavedTree {
    /// Label used by list views and selectors.
    pub fn display_name(&self) -> String {
        format!("Tree {}: {}", self.id, self.input_numbers)
    }
}

/// Format a tree value the way it is shown on node labels.
///
/// Integral values print without a fractional part.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        // also normalizes -0
        return "0".to_string();
    }
    value.to_string()
}

/// Integral values go over the wire as JSON integers.
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Decode JSON without a nesting limit; deep trees grow the stack on the heap.
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Encode JSON for values as deep as [`from_json_str`] accepts.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut json = serde_json::Serializer::new(&mut out);
    value.serialize(serde_stacker::Serializer::new(&mut json))?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Indented variant of [`to_json_string`].
pub fn to_json_string_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut json = serde_json::Serializer::pretty(&mut out);
    value.serialize(serde_stacker::Serializer::new(&mut json))?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// `treeStructure` is a JSON-encoded string, an inline object or null.
struct TreeStructureVisitor;

impl<'de> Visitor<'de> for TreeStructureVisitor {
    type Value = Option<TreeNode>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a tree object, a JSON-encoded tree or null")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        from_json_str(text).map_err(|e| E::custom(format!("invalid encoded treeStructure: {e}")))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        TreeNode::deserialize(de::value::MapAccessDeserializer::new(map)).map(Some)
    }
}

fn deserialize_tree_structure<'de, D>(deserializer: D) -> Result<Option<TreeNode>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TreeStructureVisitor)
}
