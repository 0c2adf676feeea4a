//! Flattened, id-addressed evaluation results.
//!
//! A [`SerializedGraph`] is an owning table of nodes plus the id of its root.
//! Containers reference their children by [`NodeId`], so shared values and
//! cycles are expressed without duplication. Graphs are immutable once decoded.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Opaque key of one node inside a single graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node '{node_id}' is referenced but missing from the graph")]
    DanglingReference { node_id: NodeId },
}

/// One `key: value` slot of an object node. Keys are graph nodes too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    #[serde(rename = "stack")]
    pub stack_trace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub enum SerializedNode {
    String(String),
    Number(Number),
    Boolean(bool),
    Undefined,
    Null,
    Error(ErrorValue),
    Object(Vec<ObjectEntry>),
    Array(Vec<NodeId>),
}

impl SerializedNode {
    /// Wire name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Error(_) => "error",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }
}

/// Wire envelope: `{ "type": <kind>, "value": <payload> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

impl TryFrom<WireNode> for SerializedNode {
    type Error = String;

    fn try_from(wire: WireNode) -> Result<Self, String> {
        let kind = wire.kind;
        let value = wire.value;
        let node = match kind.as_str() {
            "string" => match value {
                Value::String(text) => Self::String(text),
                other => return Err(payload_error(&kind, &other)),
            },
            "number" => match value {
                Value::Number(number) => Self::Number(number),
                other => return Err(payload_error(&kind, &other)),
            },
            "boolean" => match value {
                Value::Bool(flag) => Self::Boolean(flag),
                other => return Err(payload_error(&kind, &other)),
            },
            "undefined" => Self::Undefined,
            "null" => Self::Null,
            "error" => Self::Error(decode_payload(&kind, value)?),
            "object" => Self::Object(decode_payload(&kind, value)?),
            "array" => Self::Array(decode_payload(&kind, value)?),
            _ => return Err(format!("unknown node type '{kind}'")),
        };
        Ok(node)
    }
}

impl From<SerializedNode> for WireNode {
    fn from(node: SerializedNode) -> Self {
        let kind = node.kind().to_string();
        let value = match node {
            SerializedNode::String(text) => Value::String(text),
            SerializedNode::Number(number) => Value::Number(number),
            SerializedNode::Boolean(flag) => Value::Bool(flag),
            SerializedNode::Undefined => Value::String("undefined".to_string()),
            SerializedNode::Null => Value::String("null".to_string()),
            SerializedNode::Error(error) => serde_json::to_value(error).unwrap_or(Value::Null),
            SerializedNode::Object(entries) => {
                serde_json::to_value(entries).unwrap_or(Value::Null)
            }
            SerializedNode::Array(items) => serde_json::to_value(items).unwrap_or(Value::Null),
        };
        Self { kind, value }
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|error| format!("invalid '{kind}' payload: {error}"))
}

fn payload_error(kind: &str, value: &Value) -> String {
    format!("invalid '{kind}' payload: {value}")
}

/// One evaluation result. Wire names are `root` and `serialized`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedGraph {
    #[serde(rename = "root")]
    pub root_id: NodeId,
    #[serde(rename = "serialized")]
    pub nodes: HashMap<NodeId, SerializedNode>,
}

impl SerializedGraph {
    pub fn new(root_id: impl Into<NodeId>, nodes: HashMap<NodeId, SerializedNode>) -> Self {
        Self {
            root_id: root_id.into(),
            nodes,
        }
    }

    pub fn resolve(&self, node_id: &NodeId) -> Result<&SerializedNode, GraphError> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| GraphError::DanglingReference {
                node_id: node_id.clone(),
            })
    }

    pub fn root(&self) -> Result<&SerializedNode, GraphError> {
        self.resolve(&self.root_id)
    }
}
