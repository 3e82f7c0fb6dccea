//! WASM bindings for xkt-convert.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Converter configuration options.
#[wasm_bindgen]
pub struct ConverterOptions {
    model_id: String,
    min_tile_size: f64,
    edge_threshold: f64,
    include_textures: bool,
    include_normals: bool,
    meta_model_json: Option<String>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ConverterOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ConverterOptions {
        ConverterOptions {
            model_id: "default".to_string(),
            min_tile_size: crate::model::DEFAULT_MIN_TILE_SIZE,
            edge_threshold: crate::geometry::DEFAULT_EDGE_THRESHOLD,
            include_textures: true,
            include_normals: true,
            meta_model_json: None,
        }
    }

    #[wasm_bindgen(setter)]
    pub fn set_model_id(&mut self, value: String) {
        self.model_id = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_min_tile_size(&mut self, value: f64) {
        self.min_tile_size = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_edge_threshold(&mut self, value: f64) {
        self.edge_threshold = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_include_textures(&mut self, value: bool) {
        self.include_textures = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_include_normals(&mut self, value: bool) {
        self.include_normals = value;
    }

    /// Embed this meta model JSON instead of the generated metadata.
    #[wasm_bindgen(setter)]
    pub fn set_meta_model_json(&mut self, value: String) {
        self.meta_model_json = Some(value);
    }
}

impl ConverterOptions {
    fn to_convert_options(&self) -> crate::ConvertOptions {
        let model = crate::XktModelConfig::default()
            .with_model_id(self.model_id.clone())
            .with_min_tile_size(self.min_tile_size)
            .with_edge_threshold(self.edge_threshold)
            .with_creating_application(concat!("xkt-convert v", env!("CARGO_PKG_VERSION")));
        let import = crate::GltfImportOptions {
            include_textures: self.include_textures,
            include_normals: self.include_normals,
            ..Default::default()
        };
        let mut write = crate::WriteOptions::default();
        if let Some(json) = &self.meta_model_json {
            write = write.with_meta_model_json(json.clone());
        }
        crate::ConvertOptions::default()
            .with_model_config(model)
            .with_import_options(import)
            .with_write_options(write)
    }
}

/// Conversion result containing XKT data.
#[wasm_bindgen]
pub struct ConversionResult {
    xkt_data: Vec<u8>,
    stats: crate::ConversionStats,
    texture_failures: usize,
}

#[wasm_bindgen]
impl ConversionResult {
    /// Get the XKT binary data.
    #[wasm_bindgen(getter)]
    pub fn xkt_data(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.xkt_data.as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn entity_count(&self) -> usize {
        self.stats.num_entities
    }

    #[wasm_bindgen(getter)]
    pub fn tile_count(&self) -> usize {
        self.stats.num_tiles
    }

    #[wasm_bindgen(getter)]
    pub fn geometry_count(&self) -> usize {
        self.stats.num_geometries
    }

    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> usize {
        self.stats.num_triangles
    }

    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.stats.num_vertices
    }

    /// Textures written without compressed image data.
    #[wasm_bindgen(getter)]
    pub fn texture_failure_count(&self) -> usize {
        self.texture_failures
    }

    /// Model bounds as `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    #[wasm_bindgen(getter)]
    pub fn aabb(&self) -> Vec<f64> {
        self.stats.aabb.to_array().to_vec()
    }
}

/// Convert GLB (or self-contained glTF JSON) bytes to XKT.
///
/// External buffers cannot be resolved in the browser; use `data:` URIs or GLB.
#[wasm_bindgen]
pub fn convert_gltf(
    data: &[u8],
    options: Option<ConverterOptions>,
) -> Result<ConversionResult, JsError> {
    let options = options.unwrap_or_default();
    let output = crate::convert_gltf(data, &options.to_convert_options())
        .map_err(|e| JsError::new(&e.to_string()))?;

    Ok(ConversionResult {
        xkt_data: output.xkt,
        stats: output.stats,
        texture_failures: output.report.texture_failures.len(),
    })
}
