use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A field mapping between a GHL contact field and a Clio contact attribute
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataMapping {
    pub id: i64,
    pub ghl_field: String,
    pub clio_field: String,
    pub mapping_type: String,
    pub transform_logic: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataMapping {
    pub fn kind(&self) -> Option<MappingType> {
        MappingType::parse(&self.mapping_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    #[default]
    Direct,
    Transform,
    Custom,
}

impl MappingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingType::Direct => "direct",
            MappingType::Transform => "transform",
            MappingType::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(MappingType::Direct),
            "transform" => Some(MappingType::Transform),
            "custom" => Some(MappingType::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDataMapping {
    pub ghl_field: String,
    pub clio_field: String,
    #[serde(default)]
    pub mapping_type: MappingType,
    #[serde(default)]
    pub transform_logic: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataMappingPatch {
    pub ghl_field: Option<String>,
    pub clio_field: Option<String>,
    pub mapping_type: Option<MappingType>,
    pub transform_logic: Option<String>,
    pub is_active: Option<bool>,
}

impl DataMappingPatch {
    pub fn apply(&self, mapping: &mut DataMapping) {
        if let Some(v) = &self.ghl_field {
            mapping.ghl_field = v.clone();
        }
        if let Some(v) = &self.clio_field {
            mapping.clio_field = v.clone();
        }
        if let Some(v) = self.mapping_type {
            mapping.mapping_type = v.as_str().to_string();
        }
        if let Some(v) = &self.transform_logic {
            mapping.transform_logic = Some(v.clone());
        }
        if let Some(v) = self.is_active {
            mapping.is_active = v;
        }
    }
}
