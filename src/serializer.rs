//! Deterministic text dump of a schema model.

use crate::model::{Behavior, Column, ColumnDefault, Database, ForeignKey, Index, Schema, Table};

/// Serialize a Schema to its text dump. Two observably equal graphs give
/// the same string.
pub fn serialize(schema: &Schema) -> String {
    let mut output = String::new();

    for (i, database) in schema.databases().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        serialize_database(&mut output, database);
    }

    output
}

fn serialize_database(output: &mut String, database: &Database) {
    output.push_str(&format!(
        "database {} idMethod={} heavyIndexing={} identifierQuoting={} stringFormat={}\n",
        database.name,
        database.default_id_method.as_str(),
        database.heavy_indexing,
        database.identifier_quoting,
        database.default_string_format.as_str()
    ));
    if let Some(namespace) = &database.namespace {
        output.push_str(&format!("  namespace {}\n", namespace));
    }
    for behavior in database.behaviors() {
        serialize_behavior(output, behavior, "  ");
    }
    for table in database.tables() {
        serialize_table(output, table);
    }
}

fn serialize_table(output: &mut String, table: &Table) {
    output.push_str(&format!("  table {}", table.name));
    if table.sql_name() != table.name {
        output.push_str(&format!(" ({})", table.sql_name()));
    }
    if table.for_reference_only {
        output.push_str(" reference-only");
    }
    if table.skip_sql {
        output.push_str(" skip-sql");
    }
    output.push_str(&format!(
        " idMethod={} containsForeignPK={}\n",
        table.id_method().as_str(),
        table.contains_foreign_pk()
    ));

    for column in table.columns() {
        serialize_column(output, column);
    }
    for fk in table.foreign_keys() {
        serialize_foreign_key(output, fk);
    }
    for index in table.indices() {
        serialize_index(output, "index", index);
    }
    for unique in table.uniques() {
        serialize_index(output, "unique", unique.index());
    }
    for behavior in table.behaviors() {
        serialize_behavior(output, behavior, "    ");
    }
    if !table.referrers().is_empty() {
        let referrers: Vec<String> = table.referrers().iter().map(|r| r.to_string()).collect();
        output.push_str(&format!("    referrers {}\n", referrers.join(", ")));
    }
}

fn serialize_column(output: &mut String, column: &Column) {
    output.push_str(&format!("    column {} {}", column.name, column.column_type()));

    match (column.domain.size, column.domain.scale) {
        (Some(size), Some(scale)) => output.push_str(&format!("({},{})", size, scale)),
        (Some(size), None) => output.push_str(&format!("({})", size)),
        _ => {}
    }

    if column.primary_key {
        output.push_str(" pk");
    }
    if column.auto_increment {
        output.push_str(" autoIncrement");
    }
    if column.not_null {
        output.push_str(" notNull");
    }
    match column.default() {
        Some(ColumnDefault::Value(value)) => output.push_str(&format!(" default='{}'", value)),
        Some(ColumnDefault::Expression(expr)) => output.push_str(&format!(" default={}", expr)),
        None => {}
    }
    if !column.referrers().is_empty() {
        let referrers: Vec<String> = column.referrers().iter().map(|r| r.to_string()).collect();
        output.push_str(&format!(" <- {}", referrers.join(", ")));
    }
    output.push('\n');
}

fn serialize_foreign_key(output: &mut String, fk: &ForeignKey) {
    let pairs: Vec<String> = fk
        .references()
        .iter()
        .map(|r| format!("{}={}", r.local, r.foreign))
        .collect();
    output.push_str(&format!(
        "    foreignKey {} -> {} ({})",
        fk.name,
        fk.foreign_table_name,
        pairs.join(", ")
    ));
    if let Some(action) = fk.on_delete.as_sql() {
        output.push_str(&format!(" onDelete={}", action));
    }
    if let Some(action) = fk.on_update.as_sql() {
        output.push_str(&format!(" onUpdate={}", action));
    }
    output.push('\n');
}

fn serialize_index(output: &mut String, kind: &str, index: &Index) {
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|c| match c.size {
            Some(size) => format!("{}({})", c.name, size),
            None => c.name.clone(),
        })
        .collect();
    output.push_str(&format!(
        "    {} {} ({})\n",
        kind,
        index.name(),
        columns.join(", ")
    ));
}

fn serialize_behavior(output: &mut String, behavior: &Behavior, indent: &str) {
    output.push_str(&format!("{}behavior {}", indent, behavior.id()));
    if behavior.id() != behavior.name() {
        output.push_str(&format!(" ({})", behavior.name()));
    }
    for (name, value) in behavior.parameters() {
        output.push_str(&format!(" {}={}", name, value));
    }
    if behavior.is_executed() {
        output.push_str(" [executed]");
    }
    output.push('\n');
}
