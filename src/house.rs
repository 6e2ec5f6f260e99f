//! House description data model.
//!
//! A house is a hierarchical document: levels contain nodes, each node
//! references a model asset and optionally carries an object-to-world
//! transform and a list of material specs. The document is parsed from
//! `house.json` via serde; this module only models the fields the exporter
//! consumes.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// Node type dispatch. The corpus encodes types as free-form strings; the
/// fallback arm keeps unseen strings around for logging without aborting a
/// batch over one malformed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Room,
    Ground,
    Box,
    Unknown(String),
}

impl From<&str> for NodeType {
    fn from(raw: &str) -> Self {
        match raw {
            "Object" => NodeType::Object,
            "Room" => NodeType::Room,
            "Ground" => NodeType::Ground,
            "Box" => NodeType::Box,
            other => NodeType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Object => f.write_str("Object"),
            NodeType::Room => f.write_str("Room"),
            NodeType::Ground => f.write_str("Ground"),
            NodeType::Box => f.write_str("Box"),
            NodeType::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(NodeType::from(raw.as_str()))
    }
}

fn default_node_type() -> NodeType {
    NodeType::Unknown(String::new())
}

/// Material spec referenced by a node: a diffuse color as an HTML-style hex
/// string and an optional dataset texture name.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub diffuse: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

/// A placed model reference within a level.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: NodeType,
    #[serde(rename = "modelId", default)]
    pub model_id: String,
    #[serde(default)]
    pub valid: u8,
    /// Column-major 4x4 object-to-world matrix; 16 floats when present.
    /// Room and Ground geometry is pre-baked in world space and ignores it.
    #[serde(default)]
    pub transform: Option<Vec<f32>>,
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
}

impl Node {
    pub fn is_valid(&self) -> bool {
        self.valid == 1
    }

    /// First material spec, used to color untextured surfaces.
    pub fn material(&self) -> Option<&MaterialSpec> {
        self.materials.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct House {
    pub id: String,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl House {
    /// Load a house description document. Owned by the scene builder for the
    /// duration of one batch iteration.
    pub fn load_from_json(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let house: House = serde_json::from_str(&text)?;
        Ok(house)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUSE_JSON: &str = r##"{
        "id": "0004d52d",
        "levels": [
            {
                "id": "0",
                "nodes": [
                    {
                        "id": "0_0",
                        "type": "Room",
                        "modelId": "fr_0rm_0",
                        "valid": 1
                    },
                    {
                        "id": "0_1",
                        "type": "Object",
                        "modelId": "s__1762",
                        "valid": 1,
                        "transform": [
                            1, 0, 0, 0,
                            0, 1, 0, 0,
                            0, 0, 1, 0,
                            4.5, 0.0, -2.25, 1
                        ],
                        "materials": [
                            {"name": "mat0", "diffuse": "#a3a3a3", "texture": "wood4"}
                        ]
                    },
                    {
                        "id": "0_2",
                        "type": "Box",
                        "modelId": "",
                        "valid": 1
                    },
                    {
                        "id": "0_3",
                        "type": "Portal",
                        "modelId": "p_0",
                        "valid": 1
                    },
                    {
                        "id": "0_4",
                        "type": "Object",
                        "modelId": "s__99",
                        "valid": 0
                    }
                ]
            }
        ]
    }"##;

    #[test]
    fn parses_levels_and_nodes_in_order() {
        let house: House = serde_json::from_str(HOUSE_JSON).unwrap();
        assert_eq!(house.id, "0004d52d");
        assert_eq!(house.levels.len(), 1);
        let nodes = &house.levels[0].nodes;
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0].node_type, NodeType::Room);
        assert_eq!(nodes[1].node_type, NodeType::Object);
        assert_eq!(nodes[2].node_type, NodeType::Box);
    }

    #[test]
    fn unrecognized_type_falls_back_to_unknown() {
        let house: House = serde_json::from_str(HOUSE_JSON).unwrap();
        let node = &house.levels[0].nodes[3];
        assert_eq!(node.node_type, NodeType::Unknown("Portal".to_string()));
        assert_eq!(node.node_type.to_string(), "Portal");
    }

    #[test]
    fn transform_and_materials_are_optional() {
        let house: House = serde_json::from_str(HOUSE_JSON).unwrap();
        let room = &house.levels[0].nodes[0];
        assert!(room.transform.is_none());
        assert!(room.material().is_none());

        let object = &house.levels[0].nodes[1];
        let transform = object.transform.as_ref().unwrap();
        assert_eq!(transform.len(), 16);
        assert_eq!(transform[12], 4.5);
        let mat = object.material().unwrap();
        assert_eq!(mat.diffuse.as_deref(), Some("#a3a3a3"));
        assert_eq!(mat.texture.as_deref(), Some("wood4"));
    }

    #[test]
    fn validity_flag_gates_nodes() {
        let house: House = serde_json::from_str(HOUSE_JSON).unwrap();
        assert!(house.levels[0].nodes[1].is_valid());
        assert!(!house.levels[0].nodes[4].is_valid());
    }
}
