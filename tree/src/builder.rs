use crate::Tree;

/// Collects children for [`Tree::build`], keeping them in declaration order.
#[derive(Debug, Clone)]
pub struct ChildrenBuilder<T> {
    children: Vec<Tree<T>>,
}

impl<T> Default for ChildrenBuilder<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

impl<T> ChildrenBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tree: Tree<T>) -> &mut Self {
        self.children.push(tree);
        self
    }

    pub fn leaf(&mut self, value: T) -> &mut Self {
        self.push(Tree::new(value))
    }

    /// Add a child whose own children are declared in a nested block.
    pub fn node<F>(&mut self, value: T, children: F) -> &mut Self
    where
        F: FnOnce(&mut ChildrenBuilder<T>),
    {
        self.push(Tree::build(value, children))
    }

    pub fn push_if<F>(&mut self, condition: bool, tree: F) -> &mut Self
    where
        F: FnOnce() -> Tree<T>,
    {
        if condition {
            self.push(tree());
        }
        self
    }

    pub fn push_opt(&mut self, tree: Option<Tree<T>>) -> &mut Self {
        if let Some(tree) = tree {
            self.push(tree);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn build(self) -> Vec<Tree<T>> {
        self.children
    }
}

impl<T> Extend<Tree<T>> for ChildrenBuilder<T> {
    fn extend<I: IntoIterator<Item = Tree<T>>>(&mut self, iter: I) {
        self.children.extend(iter);
    }
}

impl<T> FromIterator<Tree<T>> for ChildrenBuilder<T> {
    fn from_iter<I: IntoIterator<Item = Tree<T>>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Tree, tree};

    #[test]
    fn empty_block_builds_leaf() {
        let tree = Tree::build(1, |_| {});
        assert_eq!(tree, tree![1]);
    }

    #[test]
    fn fixed_children_keep_order() {
        let tree = Tree::build(1, |children| {
            children.leaf(2).leaf(3);
            children.node(4, |children| {
                children.leaf(5);
            });
        });
        assert_eq!(tree, tree![1; tree![2], tree![3], tree![4; tree![5]]]);
    }

    #[test]
    fn conditional_children() {
        let build = |flag: bool| {
            Tree::build("start", |children| {
                if flag {
                    children.leaf("yes");
                } else {
                    children.leaf("no");
                }
                children.push_if(flag, || tree!["bonus"]);
                children.push_opt(None);
            })
        };
        assert_eq!(build(true), tree!["start"; tree!["yes"], tree!["bonus"]]);
        assert_eq!(build(false), tree!["start"; tree!["no"]]);
    }

    #[test]
    fn children_from_collection_are_flattened_in_order() {
        let chapters = vec![vec![1, 2], vec![], vec![3]];
        let tree = Tree::build(0, |children| {
            for chapter in &chapters {
                children.extend(chapter.iter().copied().map(Tree::new));
            }
            children.leaf(4);
        });
        let values: Vec<_> = tree.children.iter().map(|child| child.value).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }
}
