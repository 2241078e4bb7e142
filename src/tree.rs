//! Typed view of a schema tree that was already deserialized from its
//! source syntax (XML, YAML, JSON...) into nested maps and arrays.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTree {
    pub name: String,
    #[serde(default)]
    pub default_id_method: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub identifier_quoting: Option<bool>,
    #[serde(default)]
    pub default_string_format: Option<String>,
    #[serde(default)]
    pub heavy_indexing: Option<bool>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub default_accessor_visibility: Option<String>,
    #[serde(default)]
    pub default_mutator_visibility: Option<String>,
    #[serde(default, rename = "external-schemas", alias = "externalSchemas")]
    pub external_schemas: Vec<ExternalSchemaTree>,
    #[serde(default)]
    pub behaviors: BehaviorsTree,
    #[serde(default)]
    pub vendor: OneOrMany<VendorTree>,
    #[serde(default)]
    pub domains: Vec<DomainTree>,
    #[serde(default)]
    pub tables: Vec<TableTree>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSchemaTree {
    pub filename: String,
    #[serde(default = "default_true")]
    pub reference_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableTree {
    pub name: String,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub php_name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub id_method: Option<String>,
    #[serde(default)]
    pub id_method_parameter: OneOrMany<IdMethodParameterTree>,
    #[serde(default)]
    pub heavy_indexing: Option<bool>,
    #[serde(default)]
    pub identifier_quoting: Option<bool>,
    #[serde(default)]
    pub default_string_format: Option<String>,
    #[serde(default)]
    pub default_accessor_visibility: Option<String>,
    #[serde(default)]
    pub default_mutator_visibility: Option<String>,
    #[serde(default)]
    pub for_reference_only: bool,
    #[serde(default)]
    pub skip_sql: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_cross_ref: bool,
    #[serde(default)]
    pub allow_pk_insert: bool,
    #[serde(default)]
    pub columns: Vec<ColumnTree>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyTree>,
    #[serde(default)]
    pub indices: Vec<IndexTree>,
    #[serde(default)]
    pub uniques: Vec<IndexTree>,
    #[serde(default)]
    pub behaviors: BehaviorsTree,
    #[serde(default)]
    pub vendor: OneOrMany<VendorTree>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTree {
    pub name: String,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub php_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub column_type: Option<String>,
    #[serde(default)]
    pub sql_type: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub default_expr: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub lazy_load: bool,
    #[serde(default)]
    pub primary_string: bool,
    #[serde(default)]
    pub inheritance: Vec<InheritanceTree>,
    #[serde(default)]
    pub vendor: OneOrMany<VendorTree>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTree {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub sql_type: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub default_expr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceTree {
    pub key: Value,
    #[serde(alias = "class")]
    pub class_name: String,
    #[serde(default)]
    pub extends: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyTree {
    #[serde(default)]
    pub name: Option<String>,
    pub foreign_table: String,
    #[serde(default)]
    pub foreign_schema: Option<String>,
    #[serde(default)]
    pub php_name: Option<String>,
    #[serde(default)]
    pub ref_php_name: Option<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
    #[serde(default)]
    pub skip_sql: bool,
    #[serde(default)]
    pub default_join: Option<String>,
    #[serde(default)]
    pub references: Vec<ReferenceTree>,
    #[serde(default)]
    pub vendor: OneOrMany<VendorTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceTree {
    pub local: String,
    pub foreign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexTree {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<IndexColumnTree>,
    #[serde(default)]
    pub vendor: OneOrMany<VendorTree>,
}

/// Index column, either a bare name or `{ "name": ..., "size": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndexColumnTree {
    Name(String),
    Sized {
        name: String,
        #[serde(default)]
        size: Option<u32>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdMethodParameterTree {
    #[serde(default)]
    pub name: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorTree {
    #[serde(rename = "type")]
    pub vendor_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorTree {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Behaviors, either as a list of `{name, id?, parameters}` records or as
/// a `{name: {parameters}}` map in declaration order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BehaviorsTree {
    List(Vec<BehaviorTree>),
    Map(Map<String, Value>),
}

impl Default for BehaviorsTree {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl BehaviorsTree {
    pub fn into_list(self) -> Vec<BehaviorTree> {
        match self {
            Self::List(list) => list,
            Self::Map(map) => map
                .into_iter()
                .map(|(name, params)| BehaviorTree {
                    name,
                    id: None,
                    parameters: match params {
                        Value::Object(params) => params,
                        _ => Map::new(),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Render a scalar tree value as the string the model stores.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn default_true() -> bool {
    true
}
