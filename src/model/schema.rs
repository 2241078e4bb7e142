use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ModelError, Result};

use super::{Database, Table};

/// A schema pulled in through `external-schemas`.
#[derive(Debug, Clone)]
pub struct ExternalSchema {
    pub path: PathBuf,
    /// Tables are usable as foreign-key targets only, never emitted.
    pub reference_only: bool,
    pub schema: Schema,
}

/// Root of the model: one or more databases plus the external schemas
/// merged into them.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// File the schema was read from, used to resolve relative includes.
    pub location: Option<PathBuf>,
    pub reference_only: bool,
    databases: Vec<Database>,
    external_schemas: Vec<ExternalSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_database(&mut self, database: Database) -> Result<()> {
        if self.database(&database.name).is_some() {
            return Err(ModelError::Constraint(format!(
                "database '{}' is declared twice in the schema",
                database.name
            )));
        }
        self.databases.push(database);
        Ok(())
    }

    pub fn databases(&self) -> &[Database] {
        &self.databases
    }

    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.iter().find(|d| d.name == name)
    }

    pub fn database_mut(&mut self, name: &str) -> Option<&mut Database> {
        self.databases.iter_mut().find(|d| d.name == name)
    }

    pub(crate) fn databases_mut(&mut self) -> impl Iterator<Item = &mut Database> {
        self.databases.iter_mut()
    }

    pub fn external_schemas(&self) -> &[ExternalSchema] {
        &self.external_schemas
    }

    /// Attach an external schema and merge its tables into the database of
    /// the same name (or the only database of this schema).
    pub fn add_external_schema(&mut self, external: ExternalSchema) -> Result<()> {
        for source in external.schema.databases() {
            let target = match self.databases.iter().position(|d| d.name == source.name) {
                Some(pos) => pos,
                None if self.databases.len() == 1 => 0,
                None => {
                    self.databases.push(source.without_tables());
                    self.databases.len() - 1
                }
            };

            for table in source.tables() {
                let mut table = table.clone();
                if external.reference_only {
                    table.for_reference_only = true;
                }
                self.databases[target].add_table(table)?;
            }
        }

        tracing::debug!(
            path = %external.path.display(),
            reference_only = external.reference_only,
            "Merged external schema"
        );
        self.external_schemas.push(external);
        Ok(())
    }

    /// Merge another schema into this one; databases with the same name
    /// are combined.
    pub fn join(&mut self, other: Schema) -> Result<()> {
        for database in other.databases {
            match self.database_mut(&database.name) {
                Some(target) => {
                    for table in database.tables() {
                        target.add_table(table.clone())?;
                    }
                }
                None => self.databases.push(database),
            }
        }
        self.external_schemas.extend(other.external_schemas);
        Ok(())
    }

    /// Namespace plus table name must be unique across all databases.
    pub fn check_qualified_names(&self) -> Result<()> {
        let mut seen: BTreeMap<(String, String), &str> = BTreeMap::new();

        for database in &self.databases {
            for table in database.tables() {
                let namespace = table
                    .namespace
                    .clone()
                    .or_else(|| database.namespace.clone())
                    .unwrap_or_default();
                let key = (namespace, table.name.clone());
                if let Some(previous) = seen.insert(key.clone(), &database.name) {
                    return Err(ModelError::Constraint(format!(
                        "table '{}' in namespace '{}' is declared in both database '{}' and database '{}'",
                        key.1, key.0, previous, database.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Tables the emitters produce code and SQL for.
    pub fn emittable_tables(&self) -> impl Iterator<Item = (&Database, &Table)> {
        self.databases.iter().flat_map(|db| {
            db.tables()
                .iter()
                .filter(|t| !t.for_reference_only)
                .map(move |t| (db, t))
        })
    }
}
