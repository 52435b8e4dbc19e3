mod builder;
mod encode;
mod expand;
mod traverse;

pub use crate::builder::*;
pub use crate::traverse::*;

/// An ordered, rooted tree: a value and the subtrees below it.
///
/// Every tree exclusively owns its children, so the structure can never
/// contain itself.
///
/// Building and traversal use explicit stacks and queues. Dropping,
/// [`Tree::height`], [`Tree::map`], [`Tree::as_ref`] and encoding recurse
/// once per level.
///
/// ```
/// use novelty_tree::{tree, Order};
///
/// let tree = tree![1; tree![2; tree![3], tree![4]], tree![5]];
/// assert_eq!(tree.traversal(Order::Bfs).to_string(), "1, 2, 5, 3, 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree<T> {
    pub value: T,
    pub children: Vec<Tree<T>>,
}

impl<T> Tree<T> {
    /// A tree with no children.
    pub fn new(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children<I>(value: T, children: I) -> Self
    where
        I: IntoIterator<Item = Tree<T>>,
    {
        Self {
            value,
            children: children.into_iter().collect(),
        }
    }

    /// Declare the children in a block.
    ///
    /// ```
    /// use novelty_tree::Tree;
    ///
    /// let show_epilogue = false;
    /// let tree = Tree::build("intro", |children| {
    ///     children.node("left", |children| {
    ///         children.extend(["cave", "river"].map(Tree::new));
    ///     });
    ///     if show_epilogue {
    ///         children.leaf("epilogue");
    ///     }
    ///     children.leaf("right");
    /// });
    /// assert_eq!(tree.len(), 5);
    /// ```
    pub fn build<F>(value: T, children: F) -> Self
    where
        F: FnOnce(&mut ChildrenBuilder<T>),
    {
        let mut builder = ChildrenBuilder::new();
        children(&mut builder);
        Self::with_children(value, builder.build())
    }

    /// Append a leaf holding `value` and return the tree.
    pub fn child(mut self, value: T) -> Self {
        self.children.push(Tree::new(value));
        self
    }

    /// Append a child built from a leaf holding `value` and return the tree.
    pub fn with_child<F>(mut self, value: T, configure: F) -> Self
    where
        F: FnOnce(Tree<T>) -> Tree<T>,
    {
        self.children.push(configure(Tree::new(value)));
        self
    }

    /// Append a leaf holding `value` in place, returning the new child.
    pub fn push(&mut self, value: T) -> &mut Tree<T> {
        self.push_tree(Tree::new(value))
    }

    pub fn push_tree(&mut self, tree: Tree<T>) -> &mut Tree<T> {
        let index = self.children.len();
        self.children.push(tree);
        &mut self.children[index]
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.dfs().count()
    }

    /// Number of levels, so a leaf has a height of one.
    pub fn height(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Tree::height)
            .max()
            .unwrap_or_default()
    }

    pub fn into_parts(self) -> (T, Vec<Tree<T>>) {
        (self.value, self.children)
    }

    /// Transform every value, keeping the shape. `map` sees values in
    /// depth-first pre-order.
    pub fn map<U, F>(self, mut map: F) -> Tree<U>
    where
        F: FnMut(T) -> U,
    {
        fn map_recursive<T, U, F>(tree: Tree<T>, map: &mut F) -> Tree<U>
        where
            F: FnMut(T) -> U,
        {
            let value = map(tree.value);
            let children = tree
                .children
                .into_iter()
                .map(|child| map_recursive(child, map))
                .collect();
            Tree { value, children }
        }

        map_recursive(self, &mut map)
    }

    pub fn as_ref(&self) -> Tree<&T> {
        Tree {
            value: &self.value,
            children: self.children.iter().map(Tree::as_ref).collect(),
        }
    }
}

impl<T> From<(T, Vec<Tree<T>>)> for Tree<T> {
    fn from((value, children): (T, Vec<Tree<T>>)) -> Self {
        Self { value, children }
    }
}

/// Tree literal: `tree![value]` for a leaf, `tree![value; child, ...]`
/// for a node with children.
#[macro_export]
macro_rules! tree {
    ($value:expr $(,)?) => {
        $crate::Tree::new($value)
    };
    ($value:expr; $($child:expr),* $(,)?) => {
        $crate::Tree::with_children($value, [$($child),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<u32> {
        tree![
            1;
            tree![2; tree![3], tree![4]],
            tree![5; tree![6; tree![7], tree![8]], tree![9]],
        ]
    }

    #[test]
    fn literal_and_explicit_forms_agree() {
        let explicit = Tree::with_children(
            1,
            vec![
                Tree::with_children(2, vec![Tree::new(3), Tree::new(4)]),
                Tree::with_children(
                    5,
                    vec![
                        Tree::with_children(6, vec![Tree::new(7), Tree::new(8)]),
                        Tree::new(9),
                    ],
                ),
            ],
        );
        assert_eq!(sample(), explicit);
        assert_eq!(Tree::from((42, vec![])), tree![42]);
    }

    #[test]
    fn fluent_children_append_in_order() {
        let tree = Tree::new("root")
            .child("a")
            .with_child("b", |b| b.child("b1").child("b2"))
            .child("c");
        let expected = tree!["root"; tree!["a"], tree!["b"; tree!["b1"], tree!["b2"]], tree!["c"]];
        assert_eq!(tree, expected);
    }

    #[test]
    fn push_returns_new_child() {
        let mut tree = Tree::new(0);
        tree.push(1).push(2);
        tree.push(3);
        assert_eq!(tree, tree![0; tree![1; tree![2]], tree![3]]);
    }

    #[test]
    fn size_and_height() {
        let tree = sample();
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.height(), 4);
        assert!(!tree.is_leaf());
        assert_eq!(tree![42].len(), 1);
        assert_eq!(tree![42].height(), 1);
    }

    #[test]
    fn map_keeps_shape_and_visits_in_pre_order() {
        let mut seen = Vec::new();
        let mapped = sample().map(|value| {
            seen.push(value);
            value * 10
        });
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(mapped.values_bfs().copied().collect::<Vec<_>>(), vec![
            10, 20, 50, 30, 40, 60, 90, 70, 80
        ]);
    }

    #[test]
    fn as_ref_borrows_every_value() {
        let tree = sample();
        let borrowed = tree.as_ref();
        assert_eq!(borrowed.map(|value| *value), tree);
    }
}
