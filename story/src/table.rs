use std::fmt::{self, Display};

use displaydoc::Display;
use indexmap::IndexMap;
use novelty_tree::Tree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Story, StoryNode};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A story node stored on its own, naming its children by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub links: Vec<NodeId>,
}

impl From<&StoryNode> for TableNode {
    fn from(node: &StoryNode) -> Self {
        Self {
            title: node.title.clone(),
            link_title: node.link_title.clone(),
            content: node.content.clone(),
            links: Vec::new(),
        }
    }
}

impl From<TableNode> for StoryNode {
    fn from(node: TableNode) -> Self {
        Self {
            title: node.title,
            link_title: node.link_title,
            content: node.content,
            children: Vec::new(),
        }
    }
}

/// Flat story format: every node keyed by id, plus the id of the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub root: NodeId,
    pub nodes: IndexMap<NodeId, TableNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum TableError {
    /// Root node {0} is not in the table
    MissingRoot(NodeId),
    /// Node {parent} links to unknown node {id}
    UnknownNode { parent: NodeId, id: NodeId },
}

impl NodeTable {
    /// Resolve the links into a tree, starting at the root.
    ///
    /// Links must not loop back to an ancestor.
    pub fn tree(&self) -> Result<Tree<(&NodeId, &TableNode)>, TableError> {
        let root = self
            .nodes
            .get_key_value(&self.root)
            .ok_or_else(|| TableError::MissingRoot(self.root.clone()))?;

        Tree::try_from_fn(root, |&(parent, node)| {
            node.links
                .iter()
                .map(|id| {
                    self.nodes
                        .get_key_value(id)
                        .ok_or_else(|| TableError::UnknownNode {
                            parent: parent.clone(),
                            id: id.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
    }

    pub fn to_story(&self) -> Result<Story, TableError> {
        let tree = self.tree()?.map(|(_, node)| StoryNode::from(node.clone()));
        let mut story = Story::from_tree(tree);
        story.title = self.title.clone();
        story.tagline = self.tagline.clone();
        story.author = self.author.clone();
        Ok(story)
    }

    /// Flatten a story, numbering nodes depth first.
    pub fn from_story(story: &Story) -> Self {
        fn flatten(tree: &Tree<&StoryNode>, nodes: &mut IndexMap<NodeId, TableNode>) -> NodeId {
            let id = NodeId(format!("node-{}", nodes.len()));
            nodes.insert(id.clone(), TableNode::from(tree.value));
            let links = tree
                .children
                .iter()
                .map(|child| flatten(child, nodes))
                .collect();
            if let Some(node) = nodes.get_mut(&id) {
                node.links = links;
            }
            id
        }

        let mut nodes = IndexMap::new();
        let root = flatten(&story.tree_ref(), &mut nodes);
        Self {
            title: story.title.clone(),
            tagline: story.tagline.clone(),
            author: story.author.clone(),
            root,
            nodes,
        }
    }
}
