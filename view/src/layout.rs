use std::{fmt::Debug, hash::Hash};

use displaydoc::Display;
use indexmap::{IndexMap, map::Entry};
use novelty_tree::Tree;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Render;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }
}

/// Spacing between siblings and between a node and its children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            horizontal_spacing: 12.0,
            vertical_spacing: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub rect: Rect,
    /// Where connectors attach.
    pub anchor: Point,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<K> {
    pub from: K,
    pub to: K,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum LayoutError {
    /// Two nodes share the identity key {key}
    DuplicateKey { key: String },
}

/// Positions of every node of a tree, keyed by identity, and the connectors
/// from each parent to its children.
///
/// Each node sits centered above the row of its children's subtrees.
#[derive(Debug, Clone, Serialize)]
pub struct Layout<K: Hash + Eq> {
    pub nodes: IndexMap<K, Placement>,
    pub edges: Vec<Edge<K>>,
    pub bounds: Size,
}

impl<K> Layout<K>
where
    K: Hash + Eq + Clone + Debug,
{
    #[tracing::instrument(skip_all)]
    pub fn compute<T, FK, FS>(
        tree: &Tree<T>,
        options: &LayoutOptions,
        key_of: FK,
        size_of: FS,
    ) -> Result<Self, LayoutError>
    where
        FK: Fn(&T) -> K,
        FS: Fn(&T) -> Size,
    {
        let measured = measure(tree, options, &size_of);

        let mut nodes = IndexMap::with_capacity(measured.subtree_count);
        place(
            tree,
            &measured,
            Point::default(),
            0,
            options,
            &key_of,
            &mut nodes,
        )?;

        let mut edges = Vec::new();
        for parent in tree.bfs() {
            let from = key_of(&parent.value);
            let start = nodes[&from].anchor;
            for child in &parent.children {
                let to = key_of(&child.value);
                let end = nodes[&to].anchor;
                edges.push(Edge {
                    from: from.clone(),
                    to,
                    start,
                    end,
                });
            }
        }

        let bounds = Size::new(
            measured.width,
            nodes
                .values()
                .map(|placement| placement.rect.max_y())
                .fold(0.0, f64::max),
        );

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            width = bounds.width,
            height = bounds.height,
            "computed layout"
        );

        Ok(Self {
            nodes,
            edges,
            bounds,
        })
    }

    /// Lay out rendered content as single lines of text, one unit per
    /// character.
    pub fn text<T, FK>(tree: &Tree<T>, options: &LayoutOptions, key_of: FK) -> Result<Self, LayoutError>
    where
        T: Render,
        FK: Fn(&T) -> K,
    {
        Self::compute(tree, options, key_of, |value| {
            Size::new(value.render().chars().count() as f64, 1.0)
        })
    }

    pub fn placement(&self, key: &K) -> Option<&Placement> {
        self.nodes.get(key)
    }

    pub fn anchor(&self, key: &K) -> Option<Point> {
        self.placement(key).map(|placement| placement.anchor)
    }
}

/// Widths of a node and of the subtrees below it.
struct Measured {
    size: Size,
    row_width: f64,
    width: f64,
    subtree_count: usize,
    children: Vec<Measured>,
}

fn measure<T, FS>(tree: &Tree<T>, options: &LayoutOptions, size_of: &FS) -> Measured
where
    FS: Fn(&T) -> Size,
{
    let size = size_of(&tree.value);
    let children: Vec<Measured> = tree
        .children
        .iter()
        .map(|child| measure(child, options, size_of))
        .collect();
    let gaps = children.len().saturating_sub(1) as f64 * options.horizontal_spacing;
    let row_width = children.iter().map(|child| child.width).sum::<f64>() + gaps;
    Measured {
        size,
        row_width,
        width: size.width.max(row_width),
        subtree_count: 1 + children.iter().map(|child| child.subtree_count).sum::<usize>(),
        children,
    }
}

fn place<T, K, FK>(
    tree: &Tree<T>,
    measured: &Measured,
    origin: Point,
    depth: usize,
    options: &LayoutOptions,
    key_of: &FK,
    nodes: &mut IndexMap<K, Placement>,
) -> Result<(), LayoutError>
where
    K: Hash + Eq + Debug,
    FK: Fn(&T) -> K,
{
    let rect = Rect {
        origin: Point::new(
            origin.x + (measured.width - measured.size.width) / 2.0,
            origin.y,
        ),
        size: measured.size,
    };
    match nodes.entry(key_of(&tree.value)) {
        Entry::Occupied(entry) => {
            return Err(LayoutError::DuplicateKey {
                key: format!("{:?}", entry.key()),
            });
        }
        Entry::Vacant(entry) => {
            entry.insert(Placement {
                rect,
                anchor: rect.center(),
                depth,
            });
        }
    }

    let mut x = origin.x + (measured.width - measured.row_width) / 2.0;
    let y = rect.max_y() + options.vertical_spacing;
    for (child, measured_child) in tree.children.iter().zip(&measured.children) {
        place(
            child,
            measured_child,
            Point::new(x, y),
            depth + 1,
            options,
            key_of,
            nodes,
        )?;
        x += measured_child.width + options.horizontal_spacing;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use novelty_tree::tree;

    use super::*;

    fn unit_boxes(tree: &Tree<u32>, options: &LayoutOptions) -> Layout<u32> {
        Layout::compute(tree, options, |value| *value, |_| Size::new(10.0, 10.0)).unwrap()
    }

    #[test]
    fn parent_centered_over_children() {
        let tree = tree![1; tree![2], tree![3]];
        let layout = unit_boxes(&tree, &LayoutOptions::default());

        // Row: 10 + 12 + 10 = 32 wide.
        assert_eq!(layout.bounds, Size::new(32.0, 32.0));
        assert_eq!(layout.anchor(&1), Some(Point::new(16.0, 5.0)));
        assert_eq!(layout.anchor(&2), Some(Point::new(5.0, 27.0)));
        assert_eq!(layout.anchor(&3), Some(Point::new(27.0, 27.0)));
        assert_eq!(layout.placement(&3).map(|p| p.depth), Some(1));
    }

    #[test]
    fn wide_parent_centers_children_row() {
        let tree = tree!["a long title".to_string(); tree!["x".to_string()]];
        let options = LayoutOptions {
            horizontal_spacing: 2.0,
            vertical_spacing: 1.0,
        };
        let layout = Layout::text(&tree, &options, |value: &String| value.clone()).unwrap();
        let child = layout.placement(&"x".to_string()).unwrap();
        assert_eq!(child.rect.origin, Point::new(5.5, 2.0));
        assert_eq!(layout.bounds, Size::new(12.0, 3.0));
    }

    #[test]
    fn siblings_do_not_overlap() {
        let tree = tree![
            1;
            tree![2; tree![4], tree![5], tree![6]],
            tree![3; tree![7]],
        ];
        let layout = unit_boxes(&tree, &LayoutOptions::default());
        let rects: Vec<Rect> = [4, 5, 6, 7]
            .iter()
            .map(|key| layout.placement(key).unwrap().rect)
            .collect();
        for pair in rects.windows(2) {
            assert!(pair[0].max_x() + 12.0 <= pair[1].origin.x + f64::EPSILON);
            assert_eq!(pair[0].origin.y, pair[1].origin.y);
        }
    }

    #[test]
    fn edges_connect_anchors_in_level_order() {
        let tree = tree![1; tree![2; tree![4]], tree![3]];
        let layout = unit_boxes(&tree, &LayoutOptions::default());
        let pairs: Vec<(u32, u32)> = layout.edges.iter().map(|edge| (edge.from, edge.to)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 4)]);
        for edge in &layout.edges {
            assert_eq!(Some(edge.start), layout.anchor(&edge.from));
            assert_eq!(Some(edge.end), layout.anchor(&edge.to));
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let tree = tree![1; tree![2], tree![2]];
        let err = Layout::compute(&tree, &LayoutOptions::default(), |v| *v, |_| Size::default())
            .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateKey { key: "2".to_string() });
        assert_eq!(err.to_string(), "Two nodes share the identity key 2");
    }

    #[test]
    fn serializes_nodes_by_key() {
        let tree = tree!["root".to_string()];
        let layout = Layout::text(&tree, &LayoutOptions::default(), |value: &String| value.clone())
            .unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["nodes"]["root"]["anchor"]["x"], 2.0);
        assert_eq!(json["edges"], serde_json::json!([]));
    }
}
