//! Material definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trackside_core::constants::{DEFAULT_MAP_TO, DEFAULT_MATERIAL_VERSION, MATERIAL_TAG_SLOTS};
use trackside_core::ValidationError;

/// One configuration stage of a material, kept as its raw key/value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageData {
    fields: Map<String, Value>,
}

impl StageData {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// A stage is usable when at least one field is non-null.
    pub fn has_any_value(&self) -> bool {
        self.fields.values().any(|v| !v.is_null())
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    fn numbers<const N: usize>(&self, key: &str) -> Option<[f64; N]> {
        let items = self.get(key)?.as_array()?;
        if items.len() != N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f64()?;
        }
        Some(out)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str().filter(|s| !s.is_empty())
    }

    /// RGBA multiplier.
    pub fn base_color_factor(&self) -> Option<[f64; 4]> {
        self.numbers("baseColorFactor")
    }

    pub fn roughness_factor(&self) -> Option<f64> {
        self.number("roughnessFactor")
    }

    pub fn opacity_factor(&self) -> Option<f64> {
        self.number("opacityFactor")
    }

    pub fn detail_normal_map_strength(&self) -> Option<f64> {
        self.number("detailNormalMapStrength")
    }

    pub fn detail_scale(&self) -> Option<[f64; 2]> {
        self.numbers("detailScale")
    }

    pub fn ambient_occlusion_map(&self) -> Option<&str> {
        self.text("ambientOcclusionMap")
    }

    pub fn base_color_map(&self) -> Option<&str> {
        self.text("baseColorMap")
    }

    pub fn normal_map(&self) -> Option<&str> {
        self.text("normalMap")
    }

    pub fn opacity_map(&self) -> Option<&str> {
        self.text("opacityMap")
    }

    pub fn roughness_map(&self) -> Option<&str> {
        self.text("roughnessMap")
    }

    pub fn detail_normal_map(&self) -> Option<&str> {
        self.text("detailNormalMap")
    }
}

/// A named material from the level's material catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    pub class_name: String,
    pub persistent_id: String,
    pub map_to: String,
    /// Stages in file order; null entries stay as `None`.
    pub stages: Vec<Option<StageData>>,
    pub alpha_ref: f64,
    pub alpha_test: bool,
    pub translucent: bool,
    pub translucent_z_write: bool,
    pub cast_shadows: bool,
    pub version: f64,
    pub annotation: Option<String>,
    /// `materialTagN` values keyed by N.
    pub material_tags: BTreeMap<usize, String>,
}

impl Material {
    /// First stage with at least one non-null field.
    pub fn primary_stage(&self) -> Option<&StageData> {
        self.stages.iter().flatten().find(|s| s.has_any_value())
    }

    /// Index of the primary stage in `stages`.
    pub fn primary_stage_index(&self) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.as_ref().is_some_and(StageData::has_any_value))
    }

    pub fn usable_stage_count(&self) -> usize {
        self.stages
            .iter()
            .flatten()
            .filter(|s| s.has_any_value())
            .count()
    }
}

fn default_map_to() -> String {
    DEFAULT_MAP_TO.to_string()
}

fn default_cast_shadows() -> bool {
    true
}

fn default_version() -> f64 {
    DEFAULT_MATERIAL_VERSION
}

/// A material entry as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRecord {
    pub class: String,
    #[serde(default)]
    pub persistent_id: String,
    #[serde(default = "default_map_to")]
    pub map_to: String,
    #[serde(default, rename = "Stages", alias = "stages")]
    pub stages: Option<Vec<Option<StageData>>>,
    #[serde(default)]
    pub alpha_ref: f64,
    #[serde(default)]
    pub alpha_test: bool,
    #[serde(default)]
    pub translucent: bool,
    #[serde(default, rename = "translucentZWrite")]
    pub translucent_z_write: bool,
    #[serde(default = "default_cast_shadows")]
    pub cast_shadows: bool,
    #[serde(default = "default_version")]
    pub version: f64,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// Build a material named by its catalog key.
    pub fn from_record(name: &str, record: MaterialRecord) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MalformedRecord {
                kind: "Material",
                reason: "empty material name".into(),
            });
        }

        let material_tags = (0..MATERIAL_TAG_SLOTS)
            .filter_map(|slot| {
                let tag = record.extra.get(&format!("materialTag{slot}"))?.as_str()?;
                Some((slot, tag.to_string()))
            })
            .collect();

        Ok(Material {
            name: name.to_string(),
            class_name: record.class,
            persistent_id: record.persistent_id,
            map_to: record.map_to,
            stages: record.stages.unwrap_or_default(),
            alpha_ref: record.alpha_ref,
            alpha_test: record.alpha_test,
            translucent: record.translucent,
            translucent_z_write: record.translucent_z_write,
            cast_shadows: record.cast_shadows,
            version: record.version,
            annotation: record.annotation,
            material_tags,
        })
    }
}
