//! Behavior plugins: named, parameterized extensions that modify the model
//! during finalization and contribute code to the emitters.
//!
//! A plugin exposes its capabilities through optional accessors instead of
//! conventionally named methods: [`BehaviorPlugin::database_modifier`],
//! [`BehaviorPlugin::table_modifier`] and [`BehaviorPlugin::modifier`].
//! Finalization only calls the first two; emitters look up the third.

mod archivable;
mod timestampable;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::model::{Behavior, Database, Table};

pub use archivable::Archivable;
pub use timestampable::Timestampable;

/// Emitter a builder modifier contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierTarget {
    Object,
    Query,
    TableMap,
}

pub trait DatabaseModifier: Send + Sync {
    /// Runs once per database, before any table behavior. May add tables
    /// and behaviors.
    fn modify_database(&self, behavior: &Behavior, database: &mut Database) -> Result<()>;
}

pub trait TableModifier: Send + Sync {
    /// Runs once per (table, behavior) pair. `table` names the decorated
    /// table; the whole database is passed so the hook can add tables.
    fn modify_table(&self, behavior: &Behavior, table: &str, database: &mut Database) -> Result<()>;
}

pub trait BuilderModifier: Send + Sync {
    /// Hook names this modifier renders code for.
    fn hooks(&self) -> &[&'static str];

    fn render(&self, hook: &str, behavior: &Behavior, table: &Table) -> Option<String>;
}

pub trait BehaviorPlugin: Send + Sync {
    /// Parameters applied before the user's own.
    fn default_parameters(&self) -> &[(&'static str, &'static str)] {
        &[]
    }

    /// Whether one entity may carry several instances (with distinct ids).
    fn allows_multiple(&self) -> bool {
        false
    }

    fn database_modifier(&self) -> Option<&dyn DatabaseModifier> {
        None
    }

    fn table_modifier(&self) -> Option<&dyn TableModifier> {
        None
    }

    fn modifier(&self, _target: ModifierTarget) -> Option<&dyn BuilderModifier> {
        None
    }
}

/// Behavior plugins by name. Injected into the model factory.
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    plugins: BTreeMap<String, Arc<dyn BehaviorPlugin>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("timestampable", Timestampable::default());
        registry.register("archivable", Archivable::default());
        registry
    }

    pub fn register<P>(&mut self, name: impl Into<String>, plugin: P)
    where
        P: BehaviorPlugin + 'static,
    {
        self.plugins.insert(name.into(), Arc::new(plugin));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(|k| k.as_str()).collect()
    }

    /// New, unattached instance of the named behavior.
    pub fn create(&self, name: &str) -> Result<Behavior> {
        let plugin = self.plugins.get(name).ok_or_else(|| {
            ModelError::Reference(format!(
                "behavior '{}' is not registered (known behaviors: {})",
                name,
                self.names().join(", ")
            ))
        })?;
        Ok(Behavior::new(name, Arc::clone(plugin)))
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.plugins.keys()).finish()
    }
}

// Shared lookup for table hooks.
fn table_mut<'a>(database: &'a mut Database, name: &str) -> Result<&'a mut Table> {
    let db_name = database.name.clone();
    database.table_mut(name).ok_or_else(|| {
        ModelError::Reference(format!(
            "behavior target table '{}' does not exist in database '{}'",
            name, db_name
        ))
    })
}
