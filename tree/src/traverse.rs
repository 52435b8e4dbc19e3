use std::{
    collections::VecDeque,
    fmt::{self, Display},
    iter::FusedIterator,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Tree;

/// Breadth-first (level order) iterator over the nodes of a [`Tree`].
///
/// ```
/// use novelty_tree::tree;
///
/// let tree = tree![1; tree![2; tree![3], tree![4]], tree![5; tree![6; tree![7], tree![8]], tree![9]]];
/// let values: Vec<_> = tree.bfs().map(|node| node.value).collect();
/// assert_eq!(values, [1, 2, 5, 3, 4, 6, 9, 7, 8]);
/// ```
#[derive(Debug)]
pub struct Bfs<'a, T> {
    queue: VecDeque<&'a Tree<T>>,
}

impl<'a, T> Bfs<'a, T> {
    pub fn new(root: &'a Tree<T>) -> Self {
        Self {
            queue: VecDeque::from([root]),
        }
    }
}

impl<T> Clone for Bfs<'_, T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<'a, T> Iterator for Bfs<'a, T> {
    type Item = &'a Tree<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.queue.pop_front()?;
        self.queue.extend(&tree.children);
        Some(tree)
    }
}

impl<T> FusedIterator for Bfs<'_, T> {}

/// Depth-first pre-order iterator over the nodes of a [`Tree`].
///
/// ```
/// use novelty_tree::tree;
///
/// let tree = tree![1; tree![2; tree![3], tree![4]], tree![5; tree![6; tree![7], tree![8]], tree![9]]];
/// let values: Vec<_> = tree.dfs().map(|node| node.value).collect();
/// assert_eq!(values, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
/// ```
#[derive(Debug)]
pub struct Dfs<'a, T> {
    stack: Vec<&'a Tree<T>>,
}

impl<'a, T> Dfs<'a, T> {
    pub fn new(root: &'a Tree<T>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<T> Clone for Dfs<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, T> Iterator for Dfs<'a, T> {
    type Item = &'a Tree<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        // Reversed so the first child is popped next.
        self.stack.extend(tree.children.iter().rev());
        Some(tree)
    }
}

impl<T> FusedIterator for Dfs<'_, T> {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Bfs,
    #[default]
    Dfs,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown traversal order \"{0}\", expected \"bfs\" or \"dfs\"")]
pub struct ParseOrderError(String);

impl FromStr for Order {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Order::Bfs),
            "dfs" | "depth-first" => Ok(Order::Dfs),
            _ => Err(ParseOrderError(s.to_string())),
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Bfs => write!(f, "bfs"),
            Order::Dfs => write!(f, "dfs"),
        }
    }
}

/// Either traversal, picked at runtime.
#[derive(Debug)]
pub enum Walk<'a, T> {
    Bfs(Bfs<'a, T>),
    Dfs(Dfs<'a, T>),
}

impl<T> Clone for Walk<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Walk::Bfs(bfs) => Walk::Bfs(bfs.clone()),
            Walk::Dfs(dfs) => Walk::Dfs(dfs.clone()),
        }
    }
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = &'a Tree<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Walk::Bfs(bfs) => bfs.next(),
            Walk::Dfs(dfs) => dfs.next(),
        }
    }
}

impl<T> FusedIterator for Walk<'_, T> {}

/// A restartable traversal of a tree: every iteration starts again from the
/// root.
///
/// Displays as the visited values joined with `", "`.
#[derive(Debug)]
pub struct Traversal<'a, T> {
    tree: &'a Tree<T>,
    order: Order,
}

impl<T> Clone for Traversal<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Traversal<'_, T> {}

impl<'a, T> Traversal<'a, T> {
    pub fn order(&self) -> Order {
        self.order
    }

    pub fn iter(&self) -> Walk<'a, T> {
        self.tree.walk(self.order)
    }

    pub fn values(&self) -> impl Iterator<Item = &'a T> + use<'a, T> {
        self.iter().map(|tree| &tree.value)
    }
}

impl<'a, T> IntoIterator for Traversal<'a, T> {
    type Item = &'a Tree<T>;
    type IntoIter = Walk<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Display> Display for Traversal<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.values().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl<T> Tree<T> {
    pub fn bfs(&self) -> Bfs<'_, T> {
        Bfs::new(self)
    }

    pub fn dfs(&self) -> Dfs<'_, T> {
        Dfs::new(self)
    }

    pub fn walk(&self, order: Order) -> Walk<'_, T> {
        match order {
            Order::Bfs => Walk::Bfs(self.bfs()),
            Order::Dfs => Walk::Dfs(self.dfs()),
        }
    }

    pub fn traversal(&self, order: Order) -> Traversal<'_, T> {
        Traversal { tree: self, order }
    }

    /// ```
    /// use novelty_tree::tree;
    ///
    /// let tree = tree![1; tree![2; tree![4]], tree![3]];
    /// assert_eq!(tree.bfs_display().to_string(), "1, 2, 3, 4");
    /// assert_eq!(tree.dfs_display().to_string(), "1, 2, 4, 3");
    /// ```
    pub fn bfs_display(&self) -> Traversal<'_, T> {
        self.traversal(Order::Bfs)
    }

    pub fn dfs_display(&self) -> Traversal<'_, T> {
        self.traversal(Order::Dfs)
    }

    pub fn values_bfs(&self) -> impl Iterator<Item = &T> {
        self.bfs().map(|tree| &tree.value)
    }

    pub fn values_dfs(&self) -> impl Iterator<Item = &T> {
        self.dfs().map(|tree| &tree.value)
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a Tree<T>;
    type IntoIter = Dfs<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.dfs()
    }
}
