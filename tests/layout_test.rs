//! Tidy-tree layout properties

use std::collections::BTreeMap;

use rstest::rstest;

use bstview::domain::{layout, parse_numbers, Canvas, LayoutNode, Margin, TreeBuilder, TreeNode};

const EPS: f64 = 1e-9;

fn tree(input: &str) -> TreeNode {
    TreeBuilder::build(&parse_numbers(input).unwrap()).unwrap()
}

fn sized(width: f64, height: f64, margin: Margin) -> Canvas {
    Canvas {
        width,
        height,
        margin,
    }
}

fn by_depth<'a>(root: &'a LayoutNode<'a>) -> BTreeMap<usize, Vec<f64>> {
    let mut rows: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for node in root.descendants() {
        rows.entry(node.depth).or_default().push(node.x);
    }
    rows
}

#[rstest]
#[case("10,5,15,3,7", Canvas::default())]
#[case("1,2,3,4,5", Canvas::default())]
#[case("50,25,75,12,37,62,87,6,18", sized(1200.0, 400.0, Margin::uniform(20.0)))]
#[case("3,1,2", sized(300.0, 300.0, Margin { top: 10.0, right: 40.0, bottom: 10.0, left: 0.0 }))]
fn given_tree_when_laid_out_then_root_is_horizontally_centred(
    #[case] input: &str,
    #[case] canvas: Canvas,
) {
    let tree = tree(input);
    let root = layout(Some(&tree), &canvas).unwrap();

    assert!((root.x - canvas.width / 2.0).abs() < EPS, "root x {}", root.x);
    assert!((root.y - canvas.margin.top).abs() < EPS);
}

#[rstest]
#[case("10,5,15,3,7")]
#[case("8,3,10,1,6,14,4,7,13")]
#[case("50,25,75,12,37,62,87,6,18,30,40")]
fn given_tree_when_laid_out_then_same_depth_nodes_never_overlap(#[case] input: &str) {
    let tree = tree(input);
    let root = layout(Some(&tree), &Canvas::default()).unwrap();

    for (depth, xs) in by_depth(&root) {
        for pair in xs.windows(2) {
            assert!(pair[0] < pair[1], "depth {depth}: {xs:?} not left to right");
        }
    }
}

#[test]
fn given_tree_when_laid_out_then_each_depth_gets_one_band() {
    let tree = tree("8,3,10,1,6,14,4,7,13");
    let canvas = Canvas::default();
    let root = layout(Some(&tree), &canvas).unwrap();
    let max_depth = root.descendants().iter().map(|n| n.depth).max().unwrap();
    let band = canvas.inner_height() / max_depth as f64;

    for node in root.descendants() {
        let expected = canvas.margin.top + node.depth as f64 * band;
        assert!((node.y - expected).abs() < EPS);
    }
    assert_eq!(max_depth, tree.height() - 1);
}

#[test]
fn given_parent_with_two_children_when_laid_out_then_sits_between_them() {
    let tree = tree("8,3,10,1,6,14,4,7,13");
    let root = layout(Some(&tree), &Canvas::default()).unwrap();

    for node in root.descendants() {
        if let [left, right] = node.children.as_slice() {
            let mid = (left.x + right.x) / 2.0;
            assert!((node.x - mid).abs() < EPS, "{} not centred", node.data.value);
        }
    }
}

#[test]
fn given_same_tree_when_laid_out_twice_then_positions_are_identical() {
    let tree = tree("50,25,75,12,37,62,87");
    let canvas = Canvas::default();
    assert_eq!(layout(Some(&tree), &canvas), layout(Some(&tree), &canvas));
}

#[test]
fn given_three_node_tree_when_laid_out_then_children_are_spread_over_inner_width() {
    let tree = tree("10,5,15");
    let root = layout(Some(&tree), &Canvas::default()).unwrap();

    let xs: Vec<f64> = root.children.iter().map(|c| c.x).collect();
    assert!((xs[0] - 225.0).abs() < EPS);
    assert!((xs[1] - 575.0).abs() < EPS);
    assert!(root.children.iter().all(|c| (c.y - 550.0).abs() < EPS));
}

#[test]
fn given_right_leaning_chain_when_laid_out_then_nodes_stack_vertically() {
    let tree = tree("5,5,5");
    let root = layout(Some(&tree), &Canvas::default()).unwrap();

    for node in root.descendants() {
        assert!((node.x - 400.0).abs() < EPS);
    }
    let ys: Vec<f64> = root.descendants().iter().map(|n| n.y).collect();
    assert_eq!(ys, vec![50.0, 300.0, 550.0]);
}
