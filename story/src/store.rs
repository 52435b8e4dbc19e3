use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use displaydoc::Display;
use indexmap::IndexMap;
use novelty_tree::Tree;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{TableNode, NodeId, Story, NodeTable, StoryNode};

/// Somewhere story nodes can be read from one at a time.
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn read(&self, id: &NodeId) -> Result<TableNode, StoreError>;
}

#[derive(Debug, Error, Display)]
pub enum StoreError {
    /// Node {0} not found
    NotFound(NodeId),
    /// Failed to read node {id} from {path:?}
    Read {
        id: NodeId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to write node {id} to {path:?}
    Write {
        id: NodeId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to decode node {id}
    Decode {
        id: NodeId,
        #[source]
        source: serde_json::Error,
    },
    /// Failed to encode node {id}
    Encode {
        id: NodeId,
        #[source]
        source: serde_json::Error,
    },
}

/// Nodes kept as `<id>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &NodeId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    pub async fn write(&self, id: &NodeId, node: &TableNode) -> Result<(), StoreError> {
        let path = self.path(id);
        let bytes = serde_json::to_vec_pretty(node).map_err(|source| StoreError::Encode {
            id: id.clone(),
            source,
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                id: id.clone(),
                path,
                source,
            })
    }

    /// Write every node of a table, returning the root id.
    pub async fn write_table(&self, table: &NodeTable) -> Result<NodeId, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Write {
                id: table.root.clone(),
                path: self.dir.clone(),
                source,
            })?;
        for (id, node) in &table.nodes {
            self.write(id, node).await?;
        }
        debug!(dir = ?self.dir, nodes = table.nodes.len(), "wrote table");
        Ok(table.root.clone())
    }
}

#[async_trait]
impl NodeStore for LocalFileStore {
    async fn read(&self, id: &NodeId) -> Result<TableNode, StoreError> {
        let path = self.path(id);
        let result = tokio::fs::read(&path).await;
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(source) => {
                return Err(StoreError::Read {
                    id: id.clone(),
                    path,
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            id: id.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: IndexMap<NodeId, TableNode>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, node: TableNode) -> Option<TableNode> {
        self.nodes.insert(id, node)
    }
}

impl From<NodeTable> for MemoryStore {
    fn from(table: NodeTable) -> Self {
        Self {
            nodes: table.nodes,
        }
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn read(&self, id: &NodeId) -> Result<TableNode, StoreError> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// Read the nodes reachable from `root`, one store read per link, in
/// depth-first order.
#[tracing::instrument(skip(store))]
pub async fn load_tree<S>(store: &S, root: NodeId) -> Result<Tree<(NodeId, TableNode)>, StoreError>
where
    S: NodeStore + ?Sized,
{
    let node = store.read(&root).await?;
    let tree = Tree::try_from_async((root, node), move |(_, node): &(NodeId, TableNode)| {
        let links = node.links.clone();
        async move {
            let mut children = Vec::with_capacity(links.len());
            for id in links {
                trace!(%id, "reading node");
                let child = store.read(&id).await?;
                children.push((id, child));
            }
            Ok::<_, StoreError>(children)
        }
    })
    .await?;
    debug!(nodes = tree.len(), "loaded story tree");
    Ok(tree)
}

pub async fn load_story<S>(store: &S, root: NodeId) -> Result<Story, StoreError>
where
    S: NodeStore + ?Sized,
{
    let tree = load_tree(store, root).await?;
    Ok(Story::from_tree(tree.map(|(_, node)| StoryNode::from(node))))
}
