//! One-shot finalization pipeline.

use super::kd_tree::KdTree;
use super::{Entity, Texture, Tile, XktModel};
use crate::compression::{
    create_positions_decode_matrix, oct_encode_normals, quantize_positions,
    transform_and_oct_encode_normals,
};
use crate::error::{Result, XktError};
use crate::geometry::is_triangle_mesh_solid;
use crate::texture::{
    load_image_from_path, DecodedImage, TextureEncoder, TextureEncodingOptions,
};
use crate::types::{transform_point, Aabb, PrimitiveType, TextureChannel};
use glam::{DMat4, DVec3};
use tracing::{debug, error, info, warn};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// Stages of [`XktModel::finalize`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStage {
    RemoveUnusedTextures,
    CompressTextures,
    BakeSingleUseGeometryPositions,
    BakeAndOctEncodeNormals,
    CreateEntityAabbs,
    BuildTiles,
    CreateReusedGeometriesDecodeMatrix,
    FlagSolidGeometries,
}

impl FinalizeStage {
    pub const ALL: [FinalizeStage; 8] = [
        FinalizeStage::RemoveUnusedTextures,
        FinalizeStage::CompressTextures,
        FinalizeStage::BakeSingleUseGeometryPositions,
        FinalizeStage::BakeAndOctEncodeNormals,
        FinalizeStage::CreateEntityAabbs,
        FinalizeStage::BuildTiles,
        FinalizeStage::CreateReusedGeometriesDecodeMatrix,
        FinalizeStage::FlagSolidGeometries,
    ];
}

/// A texture that could not be compressed. It is written with a placeholder payload.
#[derive(Debug)]
pub struct TextureFailure {
    pub texture_id: String,
    pub error: XktError,
}

/// Outcome of [`XktModel::finalize`].
#[derive(Debug, Default)]
pub struct FinalizeReport {
    /// The model was already finalized and nothing was done.
    pub already_finalized: bool,
    pub removed_textures: usize,
    pub texture_failures: Vec<TextureFailure>,
    pub num_tiles: usize,
}

impl XktModel {
    /// Compress, tile and freeze the model. Only the first call has any effect.
    pub fn finalize(&mut self) -> FinalizeReport {
        let mut report = FinalizeReport::default();
        if self.finalized {
            info!("XktModel already finalized");
            report.already_finalized = true;
            return report;
        }

        for stage in FinalizeStage::ALL {
            debug!(?stage, "finalize");
            match stage {
                FinalizeStage::RemoveUnusedTextures => {
                    report.removed_textures = self.remove_unused_textures();
                }
                FinalizeStage::CompressTextures => {
                    report.texture_failures = self.compress_textures();
                }
                FinalizeStage::BakeSingleUseGeometryPositions => {
                    self.bake_single_use_geometry_positions();
                }
                FinalizeStage::BakeAndOctEncodeNormals => self.bake_and_oct_encode_normals(),
                FinalizeStage::CreateEntityAabbs => self.create_entity_aabbs(),
                FinalizeStage::BuildTiles => self.build_tiles(),
                FinalizeStage::CreateReusedGeometriesDecodeMatrix => {
                    self.create_reused_geometries_decode_matrix();
                }
                FinalizeStage::FlagSolidGeometries => self.flag_solid_geometries(),
            }
        }

        report.num_tiles = self.tiles.len();
        self.finalized = true;
        info!(
            geometries = self.geometries.len(),
            meshes = self.meshes.len(),
            entities = self.entities.len(),
            tiles = self.tiles.len(),
            textures = self.textures.len(),
            "XktModel finalized"
        );
        report
    }

    /// Drop textures no texture set binds. Returns how many were removed.
    fn remove_unused_textures(&mut self) -> usize {
        let before = self.textures.len();
        self.textures.retain(|texture| texture.channel.is_some());
        self.texture_map.clear();
        for (index, texture) in self.textures.iter_mut().enumerate() {
            texture.texture_index = index;
            self.texture_map.insert(texture.texture_id.clone(), index);
        }
        before - self.textures.len()
    }

    fn compress_textures(&mut self) -> Vec<TextureFailure> {
        let encoder = self.texture_encoder.clone();
        let encoder = encoder.as_deref();

        #[cfg(not(target_arch = "wasm32"))]
        let results: Vec<std::result::Result<(), TextureFailure>> = self
            .textures
            .par_iter_mut()
            .map(|texture| compress_texture_reporting(texture, encoder))
            .collect();

        #[cfg(target_arch = "wasm32")]
        let results: Vec<std::result::Result<(), TextureFailure>> = self
            .textures
            .iter_mut()
            .map(|texture| compress_texture_reporting(texture, encoder))
            .collect();

        let failures: Vec<TextureFailure> = results.into_iter().filter_map(|r| r.err()).collect();
        for failure in &failures {
            warn!(texture = %failure.texture_id, error = %failure.error, "Texture compression failed");
        }
        failures
    }

    /// Geometries used by a single mesh are transformed into world space.
    fn bake_single_use_geometry_positions(&mut self) {
        for mesh in &self.meshes {
            let geometry = &mut self.geometries[mesh.geometry_index];
            if geometry.num_instances != 1 || mesh.matrix == DMat4::IDENTITY {
                continue;
            }
            for p in geometry.positions.chunks_exact_mut(3) {
                let world = transform_point(&mesh.matrix, DVec3::new(p[0], p[1], p[2]));
                p[0] = world.x;
                p[1] = world.y;
                p[2] = world.z;
            }
        }
    }

    /// Oct-encode normals. Single-use geometry normals go through the
    /// normal matrix of their mesh first.
    fn bake_and_oct_encode_normals(&mut self) {
        for mesh in &self.meshes {
            let geometry = &mut self.geometries[mesh.geometry_index];
            if geometry.normals_oct_encoded.is_some() {
                continue;
            }
            let Some(normals) = &geometry.normals else {
                continue;
            };
            let encoded = if geometry.is_reused() {
                oct_encode_normals(normals)
            } else {
                let normal_matrix = mesh.matrix.transpose().inverse();
                transform_and_oct_encode_normals(&normal_matrix, normals)
            };
            geometry.normals_oct_encoded = Some(encoded);
        }
    }

    fn create_entity_aabbs(&mut self) {
        for entity in &mut self.entities {
            let mut aabb = Aabb::collapsed();
            let mut has_reused_geometries = false;
            for &mesh_index in &entity.mesh_indices {
                let mesh = &self.meshes[mesh_index];
                let geometry = &self.geometries[mesh.geometry_index];
                if geometry.is_reused() {
                    has_reused_geometries = true;
                    for p in geometry.positions.chunks_exact(3) {
                        aabb.expand_point(transform_point(
                            &mesh.matrix,
                            DVec3::new(p[0], p[1], p[2]),
                        ));
                    }
                } else {
                    aabb.expand_aabb(&Aabb::from_positions(&geometry.positions));
                }
            }
            entity.aabb = aabb;
            entity.has_reused_geometries = has_reused_geometries;
        }
    }

    /// Partition entities with a k-d tree, emit one tile per populated node
    /// and move tile geometry into relative-to-center space.
    ///
    /// Entities are reordered so each tile covers a contiguous range.
    fn build_tiles(&mut self) {
        let root_aabb = self.config.model_aabb.unwrap_or_else(|| {
            let mut aabb = Aabb::collapsed();
            for entity in &self.entities {
                aabb.expand_aabb(&entity.aabb);
            }
            aabb
        });

        let mut tree = KdTree::new(
            root_aabb,
            self.config.min_tile_size,
            self.config.max_kd_tree_depth,
        );
        for (index, entity) in self.entities.iter().enumerate() {
            tree.insert(index, &entity.aabb);
        }

        let mut unplaced: Vec<Option<Entity>> =
            std::mem::take(&mut self.entities).into_iter().map(Some).collect();
        self.entity_map.clear();
        self.tiles.clear();

        for (tile_aabb, members) in tree.buckets() {
            let center = tile_aabb.center();
            let rtc_aabb = tile_aabb.translated(-center);
            let first = self.entities.len();

            for old_index in members {
                let Some(mut entity) = unplaced[old_index].take() else {
                    continue;
                };
                for &mesh_index in &entity.mesh_indices {
                    let mesh = &mut self.meshes[mesh_index];
                    let geometry = &mut self.geometries[mesh.geometry_index];
                    if geometry.is_reused() {
                        mesh.matrix = DMat4::from_translation(-center) * mesh.matrix;
                    } else {
                        for p in geometry.positions.chunks_exact_mut(3) {
                            p[0] -= center.x;
                            p[1] -= center.y;
                            p[2] -= center.z;
                        }
                        geometry.positions_quantized =
                            quantize_positions(&geometry.positions, &rtc_aabb);
                    }
                }
                entity.entity_index = self.entities.len();
                self.entity_map
                    .insert(entity.entity_id.clone(), entity.entity_index);
                self.entities.push(entity);
            }

            self.tiles.push(Tile {
                aabb: tile_aabb,
                entities: (first..self.entities.len()).collect(),
            });
        }

        // Every entity lands in some bucket; keep any stragglers rather than lose them.
        for mut entity in unplaced.into_iter().flatten() {
            error!(id = %entity.entity_id, "Entity missing from k-d tree");
            entity.entity_index = self.entities.len();
            self.entity_map
                .insert(entity.entity_id.clone(), entity.entity_index);
            self.entities.push(entity);
        }

        self.aabb = tree.root().aabb;
    }

    /// Quantize all reused geometries against their shared bounds.
    fn create_reused_geometries_decode_matrix(&mut self) {
        let mut aabb = Aabb::collapsed();
        for geometry in self.geometries.iter().filter(|g| g.is_reused()) {
            aabb.expand_aabb(&Aabb::from_positions(&geometry.positions));
        }

        if aabb.is_collapsed() {
            self.reused_geometries_decode_matrix = DMat4::IDENTITY;
            return;
        }

        self.reused_geometries_decode_matrix = create_positions_decode_matrix(&aabb);
        for geometry in self.geometries.iter_mut().filter(|g| g.is_reused()) {
            geometry.positions_quantized = quantize_positions(&geometry.positions, &aabb);
        }
    }

    fn flag_solid_geometries(&mut self) {
        for geometry in &mut self.geometries {
            if geometry.primitive_type == PrimitiveType::Triangles
                && !geometry.positions_quantized.is_empty()
            {
                geometry.solid =
                    is_triangle_mesh_solid(&geometry.indices, &geometry.positions_quantized);
            }
        }
    }
}

fn compress_texture_reporting(
    texture: &mut Texture,
    encoder: Option<&dyn TextureEncoder>,
) -> std::result::Result<(), TextureFailure> {
    compress_texture(texture, encoder).map_err(|error| TextureFailure {
        texture_id: texture.texture_id.clone(),
        error,
    })
}

/// Replace a texture's pixels with its final payload.
///
/// Uncompressed textures and failures keep a one-byte placeholder.
fn compress_texture(texture: &mut Texture, encoder: Option<&dyn TextureEncoder>) -> Result<()> {
    let raw = texture.image_data.take();
    texture.image_data = Some(vec![0]);

    let image = match (&texture.src, raw) {
        (Some(src), _) => {
            let image = load_image_from_path(src)?;
            texture.width = image.width;
            texture.height = image.height;
            image
        }
        (None, Some(pixels)) => DecodedImage::new(texture.width, texture.height, pixels),
        (None, None) => return Ok(()),
    };

    if !texture.compressed {
        return Ok(());
    }

    let encoder =
        encoder.ok_or_else(|| XktError::TextureEncode("no texture encoder configured".into()))?;
    let options =
        TextureEncodingOptions::for_channel(texture.channel.unwrap_or(TextureChannel::Color));
    texture.image_data = Some(encoder.encode(&image, &options)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EntityParams, GeometryParams, MeshParams, TextureParams, TextureSetParams, XktModelConfig,
    };
    use crate::types::MediaType;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn cube_positions(offset: f64) -> Vec<f64> {
        let mut positions = Vec::new();
        for z in [0.0, 1.0] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                positions.extend_from_slice(&[x + offset, y, z]);
            }
        }
        positions
    }

    const CUBE_INDICES: [u32; 36] = [
        0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, 3, 7, 6, 3, 6, 2, 0, 4, 7, 0, 7,
        3, 1, 2, 6, 1, 6, 5,
    ];

    fn add_cube(model: &mut XktModel, id: &str, offset: f64) {
        model
            .create_geometry(GeometryParams {
                geometry_id: format!("{id}-geometry"),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: cube_positions(offset),
                indices: Some(CUBE_INDICES.to_vec()),
                ..Default::default()
            })
            .unwrap();
        model
            .create_mesh(MeshParams {
                mesh_id: format!("{id}-mesh"),
                geometry_id: format!("{id}-geometry"),
                ..Default::default()
            })
            .unwrap();
        model
            .create_entity(EntityParams {
                entity_id: id.to_string(),
                mesh_ids: vec![format!("{id}-mesh")],
            })
            .unwrap();
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut model = XktModel::default();
        add_cube(&mut model, "a", 0.0);
        let first = model.finalize();
        assert!(!first.already_finalized);
        assert!(model.is_finalized());
        let second = model.finalize();
        assert!(second.already_finalized);
    }

    #[test]
    fn test_closed_cube_is_flagged_solid() {
        let mut model = XktModel::default();
        add_cube(&mut model, "a", 0.0);
        model.finalize();
        assert!(model.geometries()[0].solid);
    }

    #[test]
    fn test_single_use_positions_are_baked() {
        let mut model = XktModel::default();
        model
            .create_geometry(GeometryParams {
                geometry_id: "g".to_string(),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                indices: Some(vec![0, 1, 2]),
                ..Default::default()
            })
            .unwrap();
        model
            .create_mesh(MeshParams {
                mesh_id: "m".to_string(),
                geometry_id: "g".to_string(),
                position: Some(DVec3::new(100.0, 0.0, 0.0)),
                ..Default::default()
            })
            .unwrap();
        model
            .create_entity(EntityParams {
                entity_id: "e".to_string(),
                mesh_ids: vec!["m".to_string()],
            })
            .unwrap();
        model.finalize();

        let entity = model.entity("e").unwrap();
        assert_relative_eq!(entity.aabb.min.x, 100.0);
        assert_relative_eq!(entity.aabb.max.x, 101.0);
        assert!(!entity.has_reused_geometries);
    }

    #[test]
    fn test_reused_geometry_gets_shared_decode_matrix() {
        let mut model = XktModel::default();
        model
            .create_geometry(GeometryParams {
                geometry_id: "g".to_string(),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: cube_positions(0.0),
                indices: Some(CUBE_INDICES.to_vec()),
                ..Default::default()
            })
            .unwrap();
        for i in 0..3 {
            model
                .create_mesh(MeshParams {
                    mesh_id: format!("m{i}"),
                    geometry_id: "g".to_string(),
                    position: Some(DVec3::new(i as f64 * 10.0, 0.0, 0.0)),
                    ..Default::default()
                })
                .unwrap();
            model
                .create_entity(EntityParams {
                    entity_id: format!("e{i}"),
                    mesh_ids: vec![format!("m{i}")],
                })
                .unwrap();
        }
        model.finalize();

        let geometry = &model.geometries()[0];
        assert!(geometry.is_reused());
        assert_eq!(geometry.positions_quantized.len(), geometry.positions.len());
        assert_ne!(*model.reused_geometries_decode_matrix(), DMat4::IDENTITY);
        assert!(model.entities().iter().all(|e| e.has_reused_geometries));
        // Unit cube at the origin spans the full quantized range.
        assert_eq!(geometry.positions_quantized.iter().max(), Some(&65535));

        let e2 = model.entity("e2").unwrap();
        assert_relative_eq!(e2.aabb.min.x, 20.0);
    }

    #[test]
    fn test_no_reused_geometries_keeps_identity() {
        let mut model = XktModel::default();
        add_cube(&mut model, "a", 0.0);
        model.finalize();
        assert_eq!(*model.reused_geometries_decode_matrix(), DMat4::IDENTITY);
    }

    #[test]
    fn test_tile_coverage_and_order() {
        let mut model = XktModel::new(XktModelConfig::default().with_min_tile_size(10.0));
        for (i, offset) in [0.0, 1000.0, 2.0, 1003.0].iter().enumerate() {
            add_cube(&mut model, &format!("e{i}"), *offset);
        }
        let report = model.finalize();
        assert!(report.num_tiles >= 2);

        let total: usize = model.tiles().iter().map(|t| t.entities.len()).sum();
        assert_eq!(total, 4);

        // Tile ranges are contiguous and entity_index matches position.
        let mut next = 0;
        for tile in model.tiles() {
            for &entity_index in &tile.entities {
                assert_eq!(entity_index, next);
                assert_eq!(model.entities()[entity_index].entity_index, entity_index);
                assert!(tile.aabb.contains_aabb(&model.entities()[entity_index].aabb));
                next += 1;
            }
        }
        assert_eq!(model.entity("e1").unwrap().entity_id, "e1");
    }

    #[test]
    fn test_tile_local_positions_decode_to_world() {
        let mut model = XktModel::new(XktModelConfig::default().with_min_tile_size(10.0));
        add_cube(&mut model, "near", 0.0);
        add_cube(&mut model, "mid", 1200.0);
        add_cube(&mut model, "far", 5000.0);
        let world_positions: Vec<Vec<f64>> = model
            .geometries()
            .iter()
            .map(|geometry| geometry.positions.clone())
            .collect();
        model.finalize();
        assert!(model.tiles().len() > 1);

        let mut checked = 0;
        for tile in model.tiles() {
            let decode = tile.positions_decode_matrix();
            let center = tile.center();
            let tolerance = tile.aabb.extent() / 65535.0 + DVec3::splat(1e-9);
            for &entity_index in &tile.entities {
                let entity = &model.entities()[entity_index];
                for &mesh_index in &entity.mesh_indices {
                    let geometry_index = model.meshes()[mesh_index].geometry_index;
                    let geometry = &model.geometries()[geometry_index];
                    let original = &world_positions[geometry_index];
                    assert_eq!(geometry.positions_quantized.len(), original.len());

                    for (q, p) in geometry
                        .positions_quantized
                        .chunks_exact(3)
                        .zip(original.chunks_exact(3))
                    {
                        let local = transform_point(
                            &decode,
                            DVec3::new(q[0] as f64, q[1] as f64, q[2] as f64),
                        );
                        let error = (local + center - DVec3::new(p[0], p[1], p[2])).abs();
                        assert!(
                            error.cmple(tolerance).all(),
                            "error {error} exceeds {tolerance}"
                        );
                        checked += 1;
                    }
                }
            }
        }
        assert_eq!(checked, 3 * 8);
    }

    #[test]
    fn test_unused_textures_are_removed() {
        let mut model = XktModel::default();
        for id in ["unused", "used"] {
            model
                .create_texture(TextureParams {
                    texture_id: id.to_string(),
                    image_data: Some(vec![255; 4]),
                    width: 1,
                    height: 1,
                    compressed: false,
                    ..Default::default()
                })
                .unwrap();
        }
        model
            .create_texture_set(TextureSetParams {
                texture_set_id: "ts".to_string(),
                color_texture_id: Some("used".to_string()),
                ..Default::default()
            })
            .unwrap();

        let report = model.finalize();
        assert_eq!(report.removed_textures, 1);
        assert_eq!(model.textures().len(), 1);
        let texture = model.texture("used").unwrap();
        assert_eq!(texture.texture_index, 0);
        assert_eq!(texture.image_data.as_deref(), Some(&[0u8][..]));
        assert!(report.texture_failures.is_empty());
    }

    struct FixedEncoder;

    impl TextureEncoder for FixedEncoder {
        fn encode(
            &self,
            image: &DecodedImage,
            options: &TextureEncodingOptions,
        ) -> Result<Vec<u8>> {
            assert!(options.use_srgb);
            Ok(vec![0xAB; image.pixels.len() / 4])
        }
    }

    fn model_with_color_texture() -> XktModel {
        let mut model = XktModel::default();
        model
            .create_texture(TextureParams {
                texture_id: "t".to_string(),
                image_data: Some(vec![255; 16]),
                width: 2,
                height: 2,
                ..Default::default()
            })
            .unwrap();
        model
            .create_texture_set(TextureSetParams {
                texture_set_id: "ts".to_string(),
                color_texture_id: Some("t".to_string()),
                ..Default::default()
            })
            .unwrap();
        model
    }

    #[test]
    fn test_compressed_texture_uses_encoder() {
        let mut model = model_with_color_texture().with_texture_encoder(Arc::new(FixedEncoder));
        let report = model.finalize();
        assert!(report.texture_failures.is_empty());
        assert_eq!(model.textures()[0].image_data.as_deref(), Some(&[0xAB; 4][..]));
    }

    #[test]
    fn test_missing_encoder_is_reported_not_fatal() {
        let mut model = model_with_color_texture();
        let report = model.finalize();
        assert_eq!(report.texture_failures.len(), 1);
        assert_eq!(report.texture_failures[0].texture_id, "t");
        assert!(model.is_finalized());
        assert_eq!(model.textures()[0].image_data.as_deref(), Some(&[0u8][..]));
    }

    fn model_with_src_texture(src: &std::path::Path, compressed: bool) -> XktModel {
        let mut model = XktModel::default();
        model
            .create_texture(TextureParams {
                texture_id: "t".to_string(),
                src: Some(src.to_path_buf()),
                compressed,
                ..Default::default()
            })
            .unwrap();
        model
            .create_texture_set(TextureSetParams {
                texture_set_id: "ts".to_string(),
                color_texture_id: Some("t".to_string()),
                ..Default::default()
            })
            .unwrap();
        model
    }

    fn write_png(path: &std::path::Path, width: u32, height: u32) {
        let pixels = vec![200u8; (width * height * 4) as usize];
        image::RgbaImage::from_raw(width, height, pixels)
            .unwrap()
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_src_texture_is_decoded_and_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        write_png(&path, 4, 2);

        let mut model =
            model_with_src_texture(&path, true).with_texture_encoder(Arc::new(FixedEncoder));
        let report = model.finalize();
        assert!(report.texture_failures.is_empty());

        let texture = &model.textures()[0];
        assert_eq!(texture.width, 4);
        assert_eq!(texture.height, 2);
        assert_eq!(texture.media_type, Some(MediaType::Png));
        assert_eq!(texture.image_data.as_deref(), Some(&[0xAB; 8][..]));
    }

    #[test]
    fn test_uncompressed_src_texture_gets_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floor.png");
        write_png(&path, 3, 5);

        let mut model = model_with_src_texture(&path, false);
        let report = model.finalize();
        assert!(report.texture_failures.is_empty());

        let texture = &model.textures()[0];
        assert_eq!(texture.width, 3);
        assert_eq!(texture.height, 5);
        assert_eq!(texture.image_data.as_deref(), Some(&[0u8][..]));
    }

    #[test]
    fn test_unreadable_src_texture_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not a png").unwrap();
        let missing = dir.path().join("missing.png");

        for path in [corrupt, missing] {
            let mut model =
                model_with_src_texture(&path, true).with_texture_encoder(Arc::new(FixedEncoder));
            let report = model.finalize();
            assert!(model.is_finalized());
            assert_eq!(report.texture_failures.len(), 1);
            assert_eq!(report.texture_failures[0].texture_id, "t");
            assert_eq!(model.textures()[0].image_data.as_deref(), Some(&[0u8][..]));
        }
    }

    #[test]
    fn test_single_use_normals_are_rotated() {
        let mut model = XktModel::default();
        model
            .create_geometry(GeometryParams {
                geometry_id: "g".to_string(),
                primitive_type: Some(PrimitiveType::Triangles),
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                normals: Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
                indices: Some(vec![0, 1, 2]),
                ..Default::default()
            })
            .unwrap();
        model
            .create_mesh(MeshParams {
                mesh_id: "m".to_string(),
                geometry_id: "g".to_string(),
                rotation: Some(DVec3::new(90.0, 0.0, 0.0)),
                ..Default::default()
            })
            .unwrap();
        model
            .create_entity(EntityParams {
                entity_id: "e".to_string(),
                mesh_ids: vec!["m".to_string()],
            })
            .unwrap();
        model.finalize();

        let encoded = model.geometries()[0].normals_oct_encoded.as_ref().unwrap();
        assert_eq!(encoded.len(), 9);
        let decoded = crate::compression::oct_decode_vec2([encoded[0], encoded[1]]);
        // +Z rotated 90 degrees about X points to -Y.
        assert_relative_eq!(decoded.y, -1.0, epsilon = 0.02);
    }
}
