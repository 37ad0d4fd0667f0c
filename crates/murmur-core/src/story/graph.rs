//! The immutable story graph.

use std::collections::HashMap;

use serde::Deserialize;

use super::ending::Ending;
use super::node::StoryNode;
use crate::error::{StoryError, StoryResult};

/// On-disk shape of a story file.
#[derive(Debug, Deserialize)]
struct StoryFile {
    title: String,
    #[serde(default = "default_protagonist")]
    protagonist: String,
    start: String,
    #[serde(default)]
    ai_context: Option<String>,
    nodes: Vec<StoryNode>,
    #[serde(default)]
    endings: Vec<Ending>,
}

fn default_protagonist() -> String {
    "They".to_string()
}

/// Mapping from node id to node definition, plus the ordered ending list.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    title: String,
    protagonist: String,
    start: String,
    ai_context: Option<String>,
    nodes: Vec<StoryNode>,
    index: HashMap<String, usize>,
    endings: Vec<Ending>,
}

impl StoryGraph {
    /// Build a graph. Fails on duplicate node ids or an unknown start node.
    pub fn new(
        title: impl Into<String>,
        protagonist: impl Into<String>,
        start: impl Into<String>,
        nodes: Vec<StoryNode>,
        endings: Vec<Ending>,
    ) -> StoryResult<Self> {
        let start = start.into();
        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), pos).is_some() {
                return Err(StoryError::DuplicateNode(node.id.clone()));
            }
        }
        if !index.contains_key(&start) {
            return Err(StoryError::MissingStart(start));
        }

        Ok(Self {
            title: title.into(),
            protagonist: protagonist.into(),
            start,
            ai_context: None,
            nodes,
            index,
            endings,
        })
    }

    /// Parse a story from its JSON representation.
    pub fn from_json(json: &str) -> StoryResult<Self> {
        let file: StoryFile = serde_json::from_str(json)?;
        let graph = Self::new(
            file.title,
            file.protagonist,
            file.start,
            file.nodes,
            file.endings,
        )?;
        Ok(match file.ai_context {
            Some(ctx) => graph.with_ai_context(ctx),
            None => graph,
        })
    }

    /// Set the background description handed to text generators.
    pub fn with_ai_context(mut self, context: impl Into<String>) -> Self {
        self.ai_context = Some(context.into());
        self
    }

    /// Story title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display name of the narrative character, used in status lines.
    pub fn protagonist(&self) -> &str {
        &self.protagonist
    }

    /// Id of the designated first node.
    pub fn start_id(&self) -> &str {
        &self.start
    }

    /// Background description for text generators, if any.
    pub fn ai_context(&self) -> Option<&str> {
        self.ai_context.as_deref()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&StoryNode> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Look up a node by id, failing with [`StoryError::NodeNotFound`].
    pub fn require(&self, id: &str) -> StoryResult<&StoryNode> {
        self.node(id)
            .ok_or_else(|| StoryError::NodeNotFound(id.to_string()))
    }

    /// Whether a node id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in authored order.
    pub fn nodes(&self) -> &[StoryNode] {
        &self.nodes
    }

    /// Endings in evaluation order.
    pub fn endings(&self) -> &[Ending] {
        &self.endings
    }

    /// Look up an ending by id.
    pub fn ending(&self, id: &str) -> Option<&Ending> {
        self.endings.iter().find(|e| e.id == id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes. Always false for a constructed graph.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Choice, Condition, EndingCategory};

    const STORY: &str = r#"{
        "title": "Delubyo",
        "protagonist": "Maya",
        "start": "intro",
        "ai_context": "A typhoon is approaching Batanes.",
        "nodes": [
            {"id": "intro", "speaker": "maya", "text": "Are you there?",
             "choices": [{"id": "yes", "text": "Yes.", "target": "end"}]},
            {"id": "end", "speaker": "system", "text": "The line goes quiet."}
        ],
        "endings": [
            {"id": "quiet", "category": "neutral", "text": "Silence.",
             "condition": {"check": "at_node", "node": "end"}}
        ]
    }"#;

    #[test]
    fn loads_from_json() {
        let graph = StoryGraph::from_json(STORY).unwrap();
        assert_eq!(graph.title(), "Delubyo");
        assert_eq!(graph.protagonist(), "Maya");
        assert_eq!(graph.start_id(), "intro");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ai_context(), Some("A typhoon is approaching Batanes."));
        assert_eq!(graph.node("intro").unwrap().choices[0].target, "end");
        assert_eq!(graph.endings()[0].category, EndingCategory::Neutral);
        assert!(graph.ending("quiet").is_some());
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let nodes = vec![
            StoryNode::new("a", "maya", "one"),
            StoryNode::new("a", "maya", "two"),
        ];
        let err = StoryGraph::new("t", "Maya", "a", nodes, Vec::new()).unwrap_err();
        assert!(matches!(err, StoryError::DuplicateNode(id) if id == "a"));
    }

    #[test]
    fn rejects_missing_start() {
        let nodes = vec![StoryNode::new("a", "maya", "one")];
        let err = StoryGraph::new("t", "Maya", "b", nodes, Vec::new()).unwrap_err();
        assert!(matches!(err, StoryError::MissingStart(id) if id == "b"));
    }

    #[test]
    fn require_reports_unknown_nodes() {
        let nodes = vec![
            StoryNode::new("a", "maya", "one").with_choice(Choice::new("c", "go", "nowhere")),
        ];
        let graph = StoryGraph::new(
            "t",
            "Maya",
            "a",
            nodes,
            vec![Ending::new("e", EndingCategory::Good, "", Condition::Always)],
        )
        .unwrap();
        assert!(graph.require("a").is_ok());
        assert!(matches!(
            graph.require("nowhere"),
            Err(StoryError::NodeNotFound(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            StoryGraph::from_json("{ not json"),
            Err(StoryError::Parse(_))
        ));
    }
}
