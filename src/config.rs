//! Generator settings, read from an already-merged configuration tree.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::platform::{DEFAULT_MYSQL_TABLE_TYPE, GenericPlatform, MysqlPlatform, Platform, PlatformKind};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub generator: GeneratorSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorSection {
    pub platform: PlatformKind,
    /// Forces heavy indexing on every database, whatever the schema says.
    pub heavy_indexing: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub adapters: AdaptersSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdaptersSection {
    pub mysql: MysqlSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MysqlSection {
    pub table_type: String,
}

impl Default for MysqlSection {
    fn default() -> Self {
        Self {
            table_type: DEFAULT_MYSQL_TABLE_TYPE.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_tree(tree: &Value) -> Result<Self> {
        if tree.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(tree)?)
    }

    pub fn platform(&self) -> Box<dyn Platform> {
        match self.generator.platform {
            PlatformKind::Mysql => Box::new(MysqlPlatform::new(
                self.database.adapters.mysql.table_type.clone(),
            )),
            kind => Box::new(GenericPlatform::new(kind)),
        }
    }
}
