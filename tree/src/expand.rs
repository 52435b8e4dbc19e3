use std::{convert::Infallible, future};

use futures_util::FutureExt;

use crate::Tree;

impl<T> Tree<T> {
    /// Grow a tree from `root` by asking `children_of` for the children of
    /// every value it produces, until it produces none.
    ///
    /// There is no cycle detection: a relation that leads back to a value
    /// already being expanded never terminates.
    ///
    /// ```
    /// use novelty_tree::{tree, Tree};
    ///
    /// let tree = Tree::from_fn(1, |&v| if v < 4 { vec![v * 2, v * 2 + 1] } else { vec![] });
    /// assert_eq!(tree, tree![1; tree![2; tree![4], tree![5]], tree![3; tree![6], tree![7]]]);
    /// ```
    pub fn from_fn<F, I>(root: T, mut children_of: F) -> Self
    where
        F: FnMut(&T) -> I,
        I: IntoIterator<Item = T>,
    {
        match Self::try_from_fn(root, |value| Ok::<I, Infallible>(children_of(value))) {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Like [`Tree::from_fn`], but the first error from `children_of` aborts
    /// the whole construction and is returned as is.
    pub fn try_from_fn<F, I, E>(root: T, mut children_of: F) -> Result<Self, E>
    where
        F: FnMut(&T) -> Result<I, E>,
        I: IntoIterator<Item = T>,
    {
        let mut ready = |value: &T| future::ready(children_of(value));
        match expand(root, &mut ready).now_or_never() {
            Some(result) => result,
            None => unreachable!("ready futures never suspend"),
        }
    }

    /// Like [`Tree::from_fn`], but `children_of` may suspend. Siblings are
    /// expanded one after another, in the order `children_of` listed them.
    ///
    /// The returned future must not borrow the value it was given; copy what
    /// it needs out of the value first. Dropping the future stops the
    /// expansion.
    pub async fn from_async<F, Fut, I>(root: T, mut children_of: F) -> Self
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = I>,
        I: IntoIterator<Item = T>,
    {
        let mut infallible = |value: &T| children_of(value).map(Ok::<I, Infallible>);
        match expand(root, &mut infallible).await {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Like [`Tree::from_async`], but any error at any depth aborts the
    /// whole construction.
    pub async fn try_from_async<F, Fut, I, E>(root: T, mut children_of: F) -> Result<Self, E>
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = Result<I, E>>,
        I: IntoIterator<Item = T>,
    {
        expand(root, &mut children_of).await
    }

    /// Grow a tree from values that hold their own children.
    ///
    /// ```
    /// use novelty_tree::Tree;
    ///
    /// #[derive(Clone)]
    /// struct Page {
    ///     name: &'static str,
    ///     links: Vec<Page>,
    /// }
    ///
    /// let page = Page {
    ///     name: "start",
    ///     links: vec![Page { name: "end", links: vec![] }],
    /// };
    /// let tree = Tree::from_accessor(page, |page| page.links.as_slice());
    /// assert_eq!(tree.children[0].value.name, "end");
    /// ```
    pub fn from_accessor<F>(root: T, children: F) -> Self
    where
        T: Clone,
        F: Fn(&T) -> &[T],
    {
        Self::from_fn(root, |value| children(value).to_vec())
    }
}

struct Frame<T, I> {
    value: T,
    pending: I,
    children: Vec<Tree<T>>,
}

impl<T, I> Frame<T, I> {
    fn into_tree(self) -> Tree<T> {
        Tree {
            value: self.value,
            children: self.children,
        }
    }
}

/// Depth-first expansion shared by every `from` flavour. Each value is
/// passed to `children_of` exactly once, in pre-order, and the ancestors of
/// the value being expanded live on an explicit stack rather than the call
/// stack.
async fn expand<T, F, Fut, I, E>(root: T, children_of: &mut F) -> Result<Tree<T>, E>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<I, E>>,
    I: IntoIterator<Item = T>,
{
    let pending = children_of(&root).await?.into_iter();
    let mut current = Frame {
        value: root,
        pending,
        children: Vec::new(),
    };
    let mut ancestors = Vec::new();

    loop {
        if let Some(child) = current.pending.next() {
            let pending = children_of(&child).await?.into_iter();
            let parent = std::mem::replace(
                &mut current,
                Frame {
                    value: child,
                    pending,
                    children: Vec::new(),
                },
            );
            ancestors.push(parent);
            continue;
        }

        let tree = current.into_tree();
        match ancestors.pop() {
            Some(mut parent) => {
                parent.children.push(tree);
                current = parent;
            }
            None => return Ok(tree),
        }
    }
}
