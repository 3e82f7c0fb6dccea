//! Property sets and metaobjects: the semantic side of a model.

use serde::{Deserialize, Serialize};

/// One named property within a [`PropertySet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(rename = "valueType", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            property_type: None,
            value_type: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertySet {
    pub property_set_id: String,
    pub property_set_type: String,
    pub property_set_name: String,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Default)]
pub struct PropertySetParams {
    pub property_set_id: String,
    /// Defaults to `"Default"`.
    pub property_set_type: Option<String>,
    /// Defaults to the ID.
    pub property_set_name: Option<String>,
    pub properties: Vec<Property>,
}

/// A node of the semantic hierarchy. Leaf metaobjects usually share their
/// ID with an entity.
#[derive(Debug, Clone)]
pub struct MetaObject {
    pub meta_object_id: String,
    pub meta_object_type: String,
    pub meta_object_name: String,
    pub parent_meta_object_id: Option<String>,
    pub property_set_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MetaObjectParams {
    pub meta_object_id: String,
    /// Defaults to `"default"`.
    pub meta_object_type: Option<String>,
    /// Defaults to the ID.
    pub meta_object_name: Option<String>,
    pub parent_meta_object_id: Option<String>,
    pub property_set_ids: Vec<String>,
}
