//! Keeps creation and last-update timestamps on a table.

use crate::error::Result;
use crate::model::{Behavior, Column, Database, Table};
use crate::naming;
use crate::types::ColumnType;

use super::{BehaviorPlugin, BuilderModifier, ModifierTarget, TableModifier, table_mut};

#[derive(Debug, Default)]
pub struct Timestampable {
    object: ObjectHooks,
    query: QueryHooks,
}

impl BehaviorPlugin for Timestampable {
    fn default_parameters(&self) -> &[(&'static str, &'static str)] {
        &[
            ("create_column", "created_at"),
            ("update_column", "updated_at"),
            ("disable_created_at", "false"),
            ("disable_updated_at", "false"),
        ]
    }

    fn table_modifier(&self) -> Option<&dyn TableModifier> {
        Some(self)
    }

    fn modifier(&self, target: ModifierTarget) -> Option<&dyn BuilderModifier> {
        match target {
            ModifierTarget::Object => Some(&self.object),
            ModifierTarget::Query => Some(&self.query),
            ModifierTarget::TableMap => None,
        }
    }
}

impl TableModifier for Timestampable {
    fn modify_table(&self, behavior: &Behavior, table: &str, database: &mut Database) -> Result<()> {
        let table = table_mut(database, table)?;

        for column in timestamp_columns(behavior) {
            if !table.has_column(column) {
                tracing::trace!(table = %table.name, column, "Adding timestamp column");
                table.add_column(Column::new(column, ColumnType::Timestamp))?;
            }
        }

        Ok(())
    }
}

fn create_column(behavior: &Behavior) -> Option<&str> {
    if behavior.flag("disable_created_at") {
        return None;
    }
    behavior.parameter("create_column")
}

fn update_column(behavior: &Behavior) -> Option<&str> {
    if behavior.flag("disable_updated_at") {
        return None;
    }
    behavior.parameter("update_column")
}

fn timestamp_columns(behavior: &Behavior) -> impl Iterator<Item = &str> {
    create_column(behavior).into_iter().chain(update_column(behavior))
}

fn touch(table: &Table, column: &str) -> String {
    format!(
        "if !self.is_column_modified({}TableMap::{}) {{ self.set_{}(now()); }}",
        table.php_name(),
        naming::column_constant_name(column),
        naming::to_snake_case(column)
    )
}

#[derive(Debug, Default)]
struct ObjectHooks;

impl BuilderModifier for ObjectHooks {
    fn hooks(&self) -> &[&'static str] {
        &["pre_insert", "pre_update"]
    }

    fn render(&self, hook: &str, behavior: &Behavior, table: &Table) -> Option<String> {
        let lines: Vec<String> = match hook {
            "pre_insert" => timestamp_columns(behavior).map(|c| touch(table, c)).collect(),
            "pre_update" => update_column(behavior).map(|c| touch(table, c)).into_iter().collect(),
            _ => return None,
        };

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

#[derive(Debug, Default)]
struct QueryHooks;

impl BuilderModifier for QueryHooks {
    fn hooks(&self) -> &[&'static str] {
        &["query_methods"]
    }

    fn render(&self, hook: &str, behavior: &Behavior, _table: &Table) -> Option<String> {
        if hook != "query_methods" {
            return None;
        }

        let mut methods = Vec::new();
        if let Some(column) = update_column(behavior) {
            methods.push(format!(
                "fn recently_updated(self, days: u32) -> Self {{ self.filter_by_{}_since(days) }}",
                naming::to_snake_case(column)
            ));
        }
        if let Some(column) = create_column(behavior) {
            methods.push(format!(
                "fn last_created_first(self) -> Self {{ self.order_by_{}_desc() }}",
                naming::to_snake_case(column)
            ));
        }

        if methods.is_empty() {
            None
        } else {
            Some(methods.join("\n"))
        }
    }
}
