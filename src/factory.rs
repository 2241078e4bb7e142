//! Builds the model graph from a schema tree.
//!
//! Construction follows a fixed order: database settings and domains,
//! external schemas, database behaviors, database vendor info, then each
//! table with its columns, foreign keys, indices, uniques, behaviors, vendor
//! info and id-method parameters. Every step only refers to what earlier
//! steps built. Foreign tables are not resolved here; that is left to
//! [`crate::finalize`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::behavior::BehaviorRegistry;
use crate::error::{ModelError, Result};
use crate::loader::{JsonFileLoader, SchemaLoader, resolve_include};
use crate::model::{
    Behavior, Column, ColumnDefault, Database, Domain, ExternalSchema, ForeignKey, IdMethod,
    IdMethodParameter, Index, IndexColumn, Inheritance, ReferentialAction, Schema, StringFormat,
    Table, Unique, VendorInfo, Visibility,
};
use crate::tree::{
    BehaviorTree, ColumnTree, DomainTree, ForeignKeyTree, IndexColumnTree, IndexTree, OneOrMany,
    SchemaTree, TableTree, VendorTree, scalar_to_string,
};
use crate::types::ColumnType;

/// Include bookkeeping for one root build: the chain of files being built
/// and every file loaded so far.
#[derive(Default)]
struct Includes {
    stack: Vec<PathBuf>,
    loaded: BTreeSet<PathBuf>,
}

pub struct ModelFactory {
    registry: BehaviorRegistry,
    loader: Box<dyn SchemaLoader>,
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::new(BehaviorRegistry::with_builtins())
    }
}

impl ModelFactory {
    pub fn new(registry: BehaviorRegistry) -> Self {
        Self {
            registry,
            loader: Box::new(JsonFileLoader),
        }
    }

    pub fn with_loader(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Build a schema from a tree that has no file location. Such a tree
    /// may only include external schemas by absolute path.
    pub fn build(&self, tree: &Value) -> Result<Schema> {
        self.build_at(tree, None)
    }

    /// Build a schema from a tree read from `location`.
    pub fn build_at(&self, tree: &Value, location: Option<&Path>) -> Result<Schema> {
        let tree = SchemaTree::deserialize(tree)?;
        let mut includes = Includes::default();
        if let Some(location) = location {
            includes.stack.push(location.to_path_buf());
            includes.loaded.insert(location.to_path_buf());
        }
        self.build_schema(&tree, location, false, &mut includes)
    }

    /// Load the tree at `path` with the configured loader and build it.
    pub fn load(&self, path: &Path) -> Result<Schema> {
        let tree = self.loader.load(path)?;
        self.build_at(&tree, Some(path))
    }

    fn build_schema(
        &self,
        tree: &SchemaTree,
        location: Option<&Path>,
        reference_only: bool,
        includes: &mut Includes,
    ) -> Result<Schema> {
        let mut database = self.build_database(tree)?;
        let externals = self.build_external_schemas(tree, location, includes)?;

        for behavior in tree.behaviors.clone().into_list() {
            database.add_behavior(self.build_behavior(behavior)?)?;
        }
        database.vendor = build_vendor(&tree.vendor)?;

        for table in &tree.tables {
            let table = self.build_table(&database, table, reference_only)?;
            database.add_table(table)?;
        }

        tracing::debug!(
            database = %database.name,
            tables = database.tables().len(),
            behaviors = database.behaviors().len(),
            "Built database"
        );

        let mut schema = Schema::new();
        schema.location = location.map(Path::to_path_buf);
        schema.reference_only = reference_only;
        schema.add_database(database)?;
        for external in externals {
            schema.add_external_schema(external)?;
        }
        schema.check_qualified_names()?;

        Ok(schema)
    }

    fn build_database(&self, tree: &SchemaTree) -> Result<Database> {
        let mut database = Database::new(&tree.name);
        database.namespace = tree.namespace.clone();
        database.schema = tree.schema.clone();

        if let Some(method) = &tree.default_id_method {
            database.default_id_method = parse_id_method(method)?;
        }
        if let Some(quoting) = tree.identifier_quoting {
            database.identifier_quoting = quoting;
        }
        if let Some(format) = &tree.default_string_format {
            database.default_string_format = parse_string_format(format)?;
        }
        if let Some(heavy) = tree.heavy_indexing {
            database.heavy_indexing = heavy;
        }
        if let Some(visibility) = &tree.default_accessor_visibility {
            database.default_accessor_visibility = parse_visibility(visibility)?;
        }
        if let Some(visibility) = &tree.default_mutator_visibility {
            database.default_mutator_visibility = parse_visibility(visibility)?;
        }

        for domain in &tree.domains {
            database.add_domain(build_domain(domain)?)?;
        }

        Ok(database)
    }

    fn build_external_schemas(
        &self,
        tree: &SchemaTree,
        location: Option<&Path>,
        includes: &mut Includes,
    ) -> Result<Vec<ExternalSchema>> {
        let mut externals = Vec::new();

        for external in &tree.external_schemas {
            let path = resolve_include(location, &external.filename)?;
            if includes.stack.contains(&path) {
                return Err(ModelError::load(&path, "schema includes itself"));
            }
            // Reached through another include already; its tables are merged there.
            if !includes.loaded.insert(path.clone()) {
                tracing::debug!(path = %path.display(), "External schema already loaded");
                continue;
            }

            tracing::debug!(path = %path.display(), "Loading external schema");
            let source = self.loader.load(&path)?;
            let source = SchemaTree::deserialize(&source).map_err(|e| ModelError::load(&path, e))?;

            includes.stack.push(path.clone());
            let schema = self.build_schema(&source, Some(&path), external.reference_only, includes);
            includes.stack.pop();

            externals.push(ExternalSchema {
                path,
                reference_only: external.reference_only,
                schema: schema?,
            });
        }

        Ok(externals)
    }

    fn build_table(&self, database: &Database, tree: &TableTree, reference_only: bool) -> Result<Table> {
        let mut table = Table::new(&tree.name);
        table.sql_name = tree.table_name.clone();
        table.php_name = tree.php_name.clone();
        table.namespace = tree.namespace.clone();
        table.schema = tree.schema.clone();
        table.description = tree.description.clone();
        table.id_method = tree.id_method.as_deref().map(parse_id_method).transpose()?;
        table.heavy_indexing = tree.heavy_indexing;
        table.identifier_quoting = tree.identifier_quoting;
        table.default_string_format = tree
            .default_string_format
            .as_deref()
            .map(parse_string_format)
            .transpose()?;
        table.default_accessor_visibility = tree
            .default_accessor_visibility
            .as_deref()
            .map(parse_visibility)
            .transpose()?;
        table.default_mutator_visibility = tree
            .default_mutator_visibility
            .as_deref()
            .map(parse_visibility)
            .transpose()?;
        table.for_reference_only = tree.for_reference_only || reference_only;
        table.skip_sql = tree.skip_sql;
        table.read_only = tree.read_only;
        table.is_abstract = tree.is_abstract;
        table.is_cross_ref = tree.is_cross_ref;
        table.allow_pk_insert = tree.allow_pk_insert;

        for column in &tree.columns {
            table.add_column(build_column(database, &tree.name, column)?)?;
        }
        for fk in &tree.foreign_keys {
            table.add_foreign_key(build_foreign_key(&tree.name, fk)?)?;
        }
        for index in &tree.indices {
            table.add_index(build_index(index)?)?;
        }
        for unique in &tree.uniques {
            table.add_unique(Unique(build_index(unique)?))?;
        }
        for behavior in tree.behaviors.clone().into_list() {
            table.add_behavior(self.build_behavior(behavior)?)?;
        }
        table.vendor = build_vendor(&tree.vendor)?;

        for parameter in tree.id_method_parameter.clone().into_vec() {
            let value = scalar_to_string(&parameter.value).ok_or_else(|| {
                ModelError::Configuration(format!(
                    "id method parameter of table '{}' must be a scalar",
                    tree.name
                ))
            })?;
            table.id_method_parameters.push(IdMethodParameter {
                name: parameter.name,
                value,
            });
        }

        tracing::trace!(
            table = %table.name,
            columns = table.columns().len(),
            foreign_keys = table.foreign_keys().len(),
            "Built table"
        );
        Ok(table)
    }

    fn build_behavior(&self, tree: BehaviorTree) -> Result<Behavior> {
        let mut behavior = self.registry.create(&tree.name)?;
        if let Some(id) = tree.id {
            behavior = behavior.with_id(id);
        }
        for (name, value) in &tree.parameters {
            let value = scalar_to_string(value).ok_or_else(|| {
                ModelError::Configuration(format!(
                    "parameter '{}' of behavior '{}' must be a scalar",
                    name, tree.name
                ))
            })?;
            behavior.set_parameter(name, value);
        }
        Ok(behavior)
    }
}

fn build_domain(tree: &DomainTree) -> Result<Domain> {
    let mut domain = Domain::named(&tree.name, parse_column_type(&tree.column_type)?);
    domain.sql_type = tree.sql_type.clone();
    domain.size = tree.size;
    domain.scale = tree.scale;
    let owner = format!("domain '{}'", tree.name);
    domain.default = build_default(tree.default_value.as_ref(), tree.default_expr.as_deref(), &owner)?;
    Ok(domain)
}

fn build_column(database: &Database, table: &str, tree: &ColumnTree) -> Result<Column> {
    let mut domain = match &tree.domain {
        Some(name) => database
            .domain(name)
            .ok_or_else(|| {
                ModelError::Reference(format!(
                    "column '{}.{}' uses unknown domain '{}'",
                    table, tree.name, name
                ))
            })?
            .for_column(),
        None => Domain::default(),
    };

    if let Some(column_type) = &tree.column_type {
        domain.column_type = parse_column_type(column_type)?;
    }
    if tree.sql_type.is_some() {
        domain.sql_type = tree.sql_type.clone();
    }
    if tree.size.is_some() {
        domain.size = tree.size;
    }
    if tree.scale.is_some() {
        domain.scale = tree.scale;
    }
    let owner = format!("column '{}.{}'", table, tree.name);
    if let Some(default) = build_default(tree.default_value.as_ref(), tree.default_expr.as_deref(), &owner)? {
        domain.default = Some(default);
    }

    let mut column = Column::with_domain(&tree.name, domain);
    column.sql_name = tree.column_name.clone();
    column.php_name = tree.php_name.clone();
    column.description = tree.description.clone();
    column.primary_key = tree.primary_key;
    column.auto_increment = tree.auto_increment;
    column.not_null = tree.required || tree.primary_key;
    column.lazy_load = tree.lazy_load;
    column.primary_string = tree.primary_string;

    for inheritance in &tree.inheritance {
        let key = scalar_to_string(&inheritance.key).ok_or_else(|| {
            ModelError::Configuration(format!("inheritance key on {} must be a scalar", owner))
        })?;
        let mut entry = Inheritance::new(key, &inheritance.class_name);
        entry.ancestor = inheritance.extends.clone();
        column.add_inheritance(entry)?;
    }
    column.vendor = build_vendor(&tree.vendor)?;

    Ok(column)
}

fn build_default(
    value: Option<&Value>,
    expr: Option<&str>,
    owner: &str,
) -> Result<Option<ColumnDefault>> {
    let value = value.filter(|v| !v.is_null());
    match (value, expr) {
        (Some(_), Some(_)) => Err(ModelError::Configuration(format!(
            "{} sets both defaultValue and defaultExpr",
            owner
        ))),
        (Some(value), None) => scalar_to_string(value)
            .map(|v| Some(ColumnDefault::Value(v)))
            .ok_or_else(|| {
                ModelError::Configuration(format!("defaultValue of {} must be a scalar", owner))
            }),
        (None, Some(expr)) => Ok(Some(ColumnDefault::Expression(expr.to_string()))),
        (None, None) => Ok(None),
    }
}

fn build_foreign_key(table: &str, tree: &ForeignKeyTree) -> Result<ForeignKey> {
    let name = match &tree.name {
        Some(name) => name.clone(),
        // Implicit keys name their synthesized columns, so they take the
        // bare foreign table name.
        None if tree.references.is_empty() => tree
            .foreign_table
            .rsplit('.')
            .next()
            .unwrap_or(&tree.foreign_table)
            .to_string(),
        None => {
            let locals: Vec<&str> = tree.references.iter().map(|r| r.local.as_str()).collect();
            format!("{}_fk_{}", table, locals.join("_"))
        }
    };

    let mut fk = ForeignKey::new(name, &tree.foreign_table);
    fk.foreign_schema = tree.foreign_schema.clone();
    fk.php_name = tree.php_name.clone();
    fk.ref_php_name = tree.ref_php_name.clone();
    fk.on_delete = parse_action(tree.on_delete.as_deref())?;
    fk.on_update = parse_action(tree.on_update.as_deref())?;
    fk.skip_sql = tree.skip_sql;
    fk.default_join = tree.default_join.clone();
    for reference in &tree.references {
        fk.add_reference(&reference.local, &reference.foreign);
    }
    fk.vendor = build_vendor(&tree.vendor)?;

    Ok(fk)
}

fn build_index(tree: &IndexTree) -> Result<Index> {
    let mut index = match &tree.name {
        Some(name) => Index::named(name),
        None => Index::new(),
    };
    for column in &tree.columns {
        index.add_column(match column {
            IndexColumnTree::Name(name) => IndexColumn::new(name),
            IndexColumnTree::Sized { name, size } => IndexColumn {
                name: name.clone(),
                size: *size,
            },
        });
    }
    index.vendor = build_vendor(&tree.vendor)?;
    Ok(index)
}

fn build_vendor(trees: &OneOrMany<VendorTree>) -> Result<Vec<VendorInfo>> {
    trees
        .clone()
        .into_vec()
        .into_iter()
        .map(|tree| {
            let mut vendor = VendorInfo::new(&tree.vendor_type);
            for (name, value) in &tree.parameters {
                let value = scalar_to_string(value).ok_or_else(|| {
                    ModelError::Configuration(format!(
                        "vendor parameter '{}' for '{}' must be a scalar",
                        name, tree.vendor_type
                    ))
                })?;
                vendor.parameters.insert(name.clone(), value);
            }
            Ok(vendor)
        })
        .collect()
}

fn parse_column_type(name: &str) -> Result<ColumnType> {
    ColumnType::from_str(name)
        .ok_or_else(|| ModelError::Configuration(format!("unknown column type '{}'", name)))
}

fn parse_id_method(name: &str) -> Result<IdMethod> {
    IdMethod::from_str(name)
        .ok_or_else(|| ModelError::Configuration(format!("unknown id method '{}'", name)))
}

fn parse_string_format(name: &str) -> Result<StringFormat> {
    StringFormat::from_str(name)
        .ok_or_else(|| ModelError::Configuration(format!("unknown string format '{}'", name)))
}

fn parse_visibility(name: &str) -> Result<Visibility> {
    Visibility::from_str(name)
        .ok_or_else(|| ModelError::Configuration(format!("unknown visibility '{}'", name)))
}

fn parse_action(name: Option<&str>) -> Result<ReferentialAction> {
    match name {
        None => Ok(ReferentialAction::None),
        Some(name) => ReferentialAction::from_str(name).ok_or_else(|| {
            ModelError::Configuration(format!("unknown referential action '{}'", name))
        }),
    }
}
