//! Model-level configuration.

use crate::geometry::DEFAULT_EDGE_THRESHOLD;
use crate::types::Aabb;

/// Default diagonal length below which a k-d node stops splitting.
pub const DEFAULT_MIN_TILE_SIZE: f64 = 500.0;

/// Default recursion limit for k-d tree insertion.
pub const DEFAULT_MAX_KD_TREE_DEPTH: usize = 48;

/// Configuration and identification for an [`XktModel`](super::XktModel).
#[derive(Debug, Clone)]
pub struct XktModelConfig {
    /// Model ID, also used as the ID of the synthesized root metaobject.
    pub model_id: String,
    pub project_id: String,
    pub revision_id: String,
    pub author: String,
    pub created_at: String,
    pub creating_application: String,
    pub schema: String,
    /// Minimum tile diagonal; smaller k-d nodes collect entities instead of splitting.
    pub min_tile_size: f64,
    /// Pre-known model bounds for the k-d tree root, instead of the union of entity bounds.
    pub model_aabb: Option<Aabb>,
    /// Edge angle threshold in degrees for geometries that do not specify one.
    pub edge_threshold: f64,
    /// Depth at which k-d insertion stops descending and stores in place.
    pub max_kd_tree_depth: usize,
}

impl Default for XktModelConfig {
    fn default() -> Self {
        Self {
            model_id: "default".to_string(),
            project_id: String::new(),
            revision_id: String::new(),
            author: String::new(),
            created_at: String::new(),
            creating_application: String::new(),
            schema: String::new(),
            min_tile_size: DEFAULT_MIN_TILE_SIZE,
            model_aabb: None,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            max_kd_tree_depth: DEFAULT_MAX_KD_TREE_DEPTH,
        }
    }
}

impl XktModelConfig {
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_min_tile_size(mut self, min_tile_size: f64) -> Self {
        self.min_tile_size = min_tile_size;
        self
    }

    pub fn with_edge_threshold(mut self, degrees: f64) -> Self {
        self.edge_threshold = degrees;
        self
    }

    pub fn with_model_aabb(mut self, aabb: Aabb) -> Self {
        self.model_aabb = Some(aabb);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_creating_application(mut self, application: impl Into<String>) -> Self {
        self.creating_application = application.into();
        self
    }
}
