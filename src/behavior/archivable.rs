//! Copies deleted rows into a generated archive table.

use crate::error::{ModelError, Result};
use crate::model::{Behavior, Column, Database, IdMethod, Table};
use crate::types::ColumnType;

use super::{BehaviorPlugin, BuilderModifier, ModifierTarget, TableModifier};

#[derive(Debug, Default)]
pub struct Archivable {
    object: ObjectHooks,
}

impl BehaviorPlugin for Archivable {
    fn default_parameters(&self) -> &[(&'static str, &'static str)] {
        &[
            ("archive_table", ""),
            ("archived_at_column", "archived_at"),
            ("log_archived_at", "true"),
        ]
    }

    fn table_modifier(&self) -> Option<&dyn TableModifier> {
        Some(self)
    }

    fn modifier(&self, target: ModifierTarget) -> Option<&dyn BuilderModifier> {
        match target {
            ModifierTarget::Object => Some(&self.object),
            _ => None,
        }
    }
}

/// Name of the archive table for `table`.
pub fn archive_table_name(behavior: &Behavior, table: &str) -> String {
    match behavior.parameter("archive_table") {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{}_archive", table),
    }
}

impl TableModifier for Archivable {
    fn modify_table(&self, behavior: &Behavior, table: &str, database: &mut Database) -> Result<()> {
        let archive_name = archive_table_name(behavior, table);
        if database.has_table(&archive_name) {
            return Ok(());
        }

        let source = database.table(table).ok_or_else(|| {
            ModelError::Reference(format!(
                "behavior target table '{}' does not exist in database '{}'",
                table, database.name
            ))
        })?;
        let archive = build_archive(source, &archive_name, behavior)?;

        tracing::debug!(source = table, archive = %archive_name, "Adding archive table");
        database.add_table(archive)
    }
}

fn build_archive(source: &Table, name: &str, behavior: &Behavior) -> Result<Table> {
    let mut archive = source.duplicate(name);
    archive.id_method = Some(IdMethod::None);

    let fk_names: Vec<String> = archive.foreign_keys().iter().map(|fk| fk.name.clone()).collect();
    for fk in fk_names {
        archive.remove_foreign_key(&fk);
    }

    let behavior_ids: Vec<String> = archive.behaviors().iter().map(|b| b.id().to_string()).collect();
    for id in behavior_ids {
        archive.remove_behavior(&id);
    }

    // Archived rows may repeat values that were unique in the source table.
    for unique in archive.take_uniques() {
        archive.add_index_if_missing(unique.into_index())?;
    }

    let column_names: Vec<String> = archive.columns().iter().map(|c| c.name.clone()).collect();
    for name in column_names {
        if let Some(column) = archive.column_mut(&name) {
            column.auto_increment = false;
        }
    }

    if behavior.flag("log_archived_at") {
        if let Some(column) = behavior.parameter("archived_at_column") {
            if !archive.has_column(column) {
                archive.add_column(Column::new(column, ColumnType::Timestamp))?;
            }
        }
    }

    Ok(archive)
}

#[derive(Debug, Default)]
struct ObjectHooks;

impl BuilderModifier for ObjectHooks {
    fn hooks(&self) -> &[&'static str] {
        &["pre_delete"]
    }

    fn render(&self, hook: &str, behavior: &Behavior, table: &Table) -> Option<String> {
        if hook != "pre_delete" {
            return None;
        }
        let archive = archive_table_name(behavior, &table.name);
        Some(format!(
            "self.archive_into::<{}>()?;",
            crate::naming::to_studly_case(&archive)
        ))
    }
}
