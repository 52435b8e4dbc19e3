use std::{
    fmt::{self, Display},
    time::{SystemTime, UNIX_EPOCH},
};

use novelty_tree::Tree;
use novelty_view::Render;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl StoryId {
    pub fn generate() -> Self {
        Self(cuid2::create_id())
    }
}

impl Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix time of 2001-01-01T00:00:00Z.
const REFERENCE_DATE_UNIX_SECS: f64 = 978_307_200.0;

/// Fractional seconds since 2001-01-01T00:00:00Z, the way story documents
/// store dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn now() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();
        Self::from_unix_secs(unix)
    }

    pub fn from_unix_secs(secs: f64) -> Self {
        Self(secs - REFERENCE_DATE_UNIX_SECS)
    }

    pub fn unix_secs(&self) -> f64 {
        self.0 + REFERENCE_DATE_UNIX_SECS
    }
}

/// One passage of a story. Its children are the passages a reader can go
/// to next, each offered under its `link_title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<StoryNode>,
}

impl StoryNode {
    pub fn new<C: Into<String>>(content: C) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn link_title<S: Into<String>>(mut self, link_title: S) -> Self {
        self.link_title = Some(link_title.into());
        self
    }

    pub fn title_or_untitled(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled",
        }
    }

    /// Text of the link leading to this node, falling back to its title.
    pub fn link_or_title(&self) -> &str {
        match self.link_title.as_deref() {
            Some(link) if !link.is_empty() => link,
            _ => self.title_or_untitled(),
        }
    }
}

impl Render for StoryNode {
    fn render(&self) -> String {
        self.title_or_untitled().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default = "StoryId::generate")]
    pub id: StoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "Timestamp::now")]
    pub created: Timestamp,
    #[serde(default = "Timestamp::now")]
    pub updated: Timestamp,
    pub root_node: StoryNode,
}

impl Story {
    pub fn new(root_node: StoryNode) -> Self {
        let created = Timestamp::now();
        Self {
            id: StoryId::generate(),
            title: None,
            tagline: None,
            author: None,
            created,
            updated: created,
            root_node,
        }
    }

    /// Build a story from a declared tree. Each node's own `children` are
    /// replaced by the values of its child trees.
    ///
    /// ```
    /// use novelty_story::{Story, StoryNode};
    /// use novelty_tree::Tree;
    ///
    /// let story = Story::from_tree(Tree::build(StoryNode::new("Wake up."), |children| {
    ///     children.leaf(StoryNode::new("Sleep in.").link_title("Stay in bed"));
    ///     children.leaf(StoryNode::new("Get up.").link_title("Get out of bed"));
    /// }));
    /// assert_eq!(story.root_node.children.len(), 2);
    /// ```
    pub fn from_tree(tree: Tree<StoryNode>) -> Self {
        fn attach_children(tree: Tree<StoryNode>) -> StoryNode {
            let (mut node, children) = tree.into_parts();
            node.children = children.into_iter().map(attach_children).collect();
            node
        }

        Self::new(attach_children(tree))
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn tagline<S: Into<String>>(mut self, tagline: S) -> Self {
        self.tagline = Some(tagline.into());
        self
    }

    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn title_or_untitled(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled Story",
        }
    }

    /// The story as an owned tree of its nodes.
    pub fn tree(&self) -> Tree<StoryNode> {
        Tree::from_accessor(self.root_node.clone(), |node| node.children.as_slice())
    }

    /// The story as a tree borrowing its nodes.
    pub fn tree_ref(&self) -> Tree<&StoryNode> {
        Tree::from_fn(&self.root_node, |&node| node.children.iter().collect::<Vec<_>>())
    }

    /// Every node, depth first from the root.
    pub fn nodes(&self) -> Vec<&StoryNode> {
        self.tree_ref().values_dfs().copied().collect()
    }

    pub fn touch(&mut self) {
        self.updated = Timestamp::now();
    }

    pub fn sample() -> Self {
        let tree = Tree::build(
            StoryNode::new("The story begins **here**.").title("Beginnings"),
            |children| {
                children.node(
                    StoryNode::new("This is the first route.")
                        .title("Mock 1")
                        .link_title("Go to Mock 1"),
                    |children| {
                        children.node(
                            StoryNode::new("From node 1 to 2.")
                                .title("Mock 2")
                                .link_title("Go to Mock 2"),
                            |children| {
                                children.leaf(StoryNode::new("From node 2 to 4.").title("Mock 4"));
                            },
                        );
                        children.leaf(StoryNode::new("From node 1 to 3.").title("Mock 3"));
                    },
                );
            },
        );

        Self::from_tree(tree)
            .title("Mock Story")
            .tagline("Mock Tagline")
            .author("John Doe")
    }
}

#[cfg(test)]
mod tests {
    use novelty_tree::{Order, tree};

    use super::*;

    fn titles<'a>(nodes: impl IntoIterator<Item = &'a StoryNode>) -> Vec<&'a str> {
        nodes.into_iter().map(StoryNode::title_or_untitled).collect()
    }

    #[test]
    fn from_tree_attaches_children() {
        let story = Story::from_tree(tree![
            StoryNode::new("a").title("A");
            tree![StoryNode::new("b").title("B"); tree![StoryNode::new("c").title("C")]],
        ]);
        let b = &story.root_node.children[0];
        assert_eq!(b.title.as_deref(), Some("B"));
        assert_eq!(b.children[0].title.as_deref(), Some("C"));
    }

    #[test]
    fn nodes_are_depth_first() {
        let story = Story::sample();
        assert_eq!(
            titles(story.nodes()),
            vec!["Beginnings", "Mock 1", "Mock 2", "Mock 4", "Mock 3"]
        );
    }

    #[test]
    fn owned_and_borrowed_trees_agree() {
        let story = Story::sample();
        let owned = story.tree();
        assert_eq!(owned.len(), 5);
        assert_eq!(owned.as_ref(), story.tree_ref());
        let level_order: Vec<&str> = owned
            .walk(Order::Bfs)
            .map(|node| node.value.title_or_untitled())
            .collect();
        assert_eq!(level_order, vec!["Beginnings", "Mock 1", "Mock 2", "Mock 3", "Mock 4"]);
    }

    #[test]
    fn untitled_fallbacks() {
        let node = StoryNode::new("text").title("");
        assert_eq!(node.title_or_untitled(), "Untitled");
        assert_eq!(node.link_or_title(), "Untitled");
        assert_eq!(node.clone().link_title("Go").link_or_title(), "Go");
        assert_eq!(Story::new(node).title_or_untitled(), "Untitled Story");
    }

    #[test]
    fn decodes_camel_case_document() {
        let json = r#"{
            "title": "Tiny",
            "rootNode": {
                "title": "Start",
                "content": "Once.",
                "children": [{ "linkTitle": "Go on", "content": "Then." }]
            }
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.title.as_deref(), Some("Tiny"));
        assert_eq!(story.root_node.children[0].link_or_title(), "Go on");
        assert!(!story.id.0.is_empty());
    }

    #[test]
    fn decodes_reference_date_timestamps_and_uuid_ids() {
        let json = r#"{
            "id": "5B4E6F0A-1C2D-4E3F-8A9B-0C1D2E3F4A5B",
            "title": "Exported",
            "created": 774000000.25,
            "updated": 774000100.5,
            "rootNode": { "title": "Start", "content": "Once.", "children": [] }
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.id.0, "5B4E6F0A-1C2D-4E3F-8A9B-0C1D2E3F4A5B");
        assert_eq!(story.created, Timestamp(774000000.25));
        assert_eq!(story.updated.unix_secs(), 774000100.5 + 978_307_200.0);
        assert!(story.created < story.updated);
    }

    #[test]
    fn timestamps_count_from_2001() {
        assert_eq!(Timestamp::from_unix_secs(978_307_200.0), Timestamp(0.0));
        let now = Timestamp::now();
        // Any clock after 2020 is more than 19 years past the reference date.
        assert!(now.0 > 19.0 * 365.0 * 24.0 * 3600.0);
    }
}
