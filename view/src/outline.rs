use std::fmt::{self, Display};

use novelty_tree::Tree;
use termtree::Tree as DisplayTree;

use crate::Render;

/// Box-drawing outline of a tree, one node per line.
///
/// ```
/// use novelty_tree::tree;
/// use novelty_view::Outline;
///
/// let tree = tree![1; tree![2], tree![3]];
/// let outline = Outline::new(&tree).to_string();
/// assert_eq!(outline.lines().collect::<Vec<_>>(), ["1", "├── 2", "└── 3"]);
/// ```
#[derive(Debug, Clone)]
pub struct Outline {
    root: DisplayTree<String>,
}

impl Outline {
    pub fn new<T: Render>(tree: &Tree<T>) -> Self {
        Self::with_label(tree, |value| value.render())
    }

    pub fn with_label<T, F>(tree: &Tree<T>, label: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        Self {
            root: display_tree(tree, &label),
        }
    }
}

fn display_tree<T, F>(tree: &Tree<T>, label: &F) -> DisplayTree<String>
where
    F: Fn(&T) -> String,
{
    DisplayTree::new(label(&tree.value)).with_leaves(
        tree.children
            .iter()
            .map(|child| display_tree(child, label)),
    )
}

impl Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
