//! Finalization: turns a freshly built schema into the graph the emitters
//! consume.
//!
//! Per database this drains the database and table behaviors through local
//! work queues until no hook is left to run (hooks may add tables or
//! behaviors of their own), then finalizes every table in order: heavy
//! indexing, id-method downgrade, implicit foreign-key columns, referrer
//! linking and platform indices.
//!
//! Derived back edges are rebuilt from scratch and behaviors remember that
//! they ran, so finalizing twice gives the same graph. On error the schema
//! is left half-finalized and must be rebuilt.

use std::collections::{BTreeSet, VecDeque};

use crate::error::{ModelError, Result};
use crate::model::{
    Column, Database, ForeignKey, IdMethod, Index, Schema, StringFormat, Table, Visibility,
};
use crate::naming;
use crate::platform::Platform;

pub fn finalize(schema: &mut Schema, platform: &dyn Platform) -> Result<()> {
    for database in schema.databases_mut() {
        finalize_database(database, platform)?;
    }
    Ok(())
}

pub fn finalize_database(database: &mut Database, platform: &dyn Platform) -> Result<()> {
    // Hooks of either kind may attach behaviors of the other kind.
    loop {
        let ran = run_database_behaviors(database)? + run_table_behaviors(database)?;
        if ran == 0 {
            break;
        }
    }

    let defaults = TableDefaults::of(database);
    for table in database.tables_mut() {
        defaults.apply(table);
        table.clear_referrers();
        table.set_contains_foreign_pk(false);
    }

    for pos in 0..database.tables().len() {
        finalize_table(database, pos, platform)?;
    }

    tracing::debug!(
        database = %database.name,
        tables = database.tables().len(),
        "Finalized database"
    );
    Ok(())
}

fn run_database_behaviors(database: &mut Database) -> Result<usize> {
    let mut queue = VecDeque::new();
    let mut seen = BTreeSet::new();
    enqueue_database_pending(database, &mut queue, &mut seen);
    let mut ran = 0;

    while let Some(id) = queue.pop_front() {
        let Some(behavior) = database.behavior(&id).cloned() else {
            continue;
        };

        let plugin = behavior.plugin();
        if let Some(modifier) = plugin.database_modifier() {
            tracing::debug!(database = %database.name, behavior = %id, "Running database behavior");
            modifier.modify_database(&behavior, database)?;
        } else if plugin.table_modifier().is_some() {
            // Without a database hook the behavior applies to every table.
            for table in database.tables_mut() {
                let taken = table.behaviors().iter().any(|b| {
                    b.id() == behavior.id() || (b.name() == behavior.name() && !plugin.allows_multiple())
                });
                if !taken {
                    let copy = behavior.for_table(&table.name);
                    table.add_behavior(copy)?;
                }
            }
        }

        if let Some(attached) = database.behavior_mut(&id) {
            attached.mark_executed();
        }
        ran += 1;

        enqueue_database_pending(database, &mut queue, &mut seen);
    }

    Ok(ran)
}

fn enqueue_database_pending(
    database: &Database,
    queue: &mut VecDeque<String>,
    seen: &mut BTreeSet<String>,
) {
    for behavior in database.behaviors() {
        if !behavior.is_executed() && seen.insert(behavior.id().to_string()) {
            queue.push_back(behavior.id().to_string());
        }
    }
}

fn run_table_behaviors(database: &mut Database) -> Result<usize> {
    let mut queue = VecDeque::new();
    let mut seen = BTreeSet::new();
    enqueue_pending(database, &mut queue, &mut seen);
    let mut ran = 0;

    while let Some((table, id)) = queue.pop_front() {
        // An earlier hook may have removed the behavior or its table.
        let Some(behavior) = database
            .table(&table)
            .and_then(|t| t.behavior(&id))
            .cloned()
        else {
            continue;
        };

        if let Some(modifier) = behavior.plugin().table_modifier() {
            tracing::trace!(table = %table, behavior = %id, "Running table behavior");
            modifier.modify_table(&behavior, &table, database)?;
        }
        if let Some(attached) = database.table_mut(&table).and_then(|t| t.behavior_mut(&id)) {
            attached.mark_executed();
        }
        ran += 1;

        enqueue_pending(database, &mut queue, &mut seen);
    }

    Ok(ran)
}

// Queue every (table, behavior id) pair that has not run and is not queued yet.
fn enqueue_pending(
    database: &Database,
    queue: &mut VecDeque<(String, String)>,
    seen: &mut BTreeSet<(String, String)>,
) {
    for table in database.tables() {
        for behavior in table.behaviors() {
            if behavior.is_executed() {
                continue;
            }
            let key = (table.name.clone(), behavior.id().to_string());
            if seen.insert(key.clone()) {
                queue.push_back(key);
            }
        }
    }
}

/// Database settings a table inherits unless it sets its own.
struct TableDefaults {
    id_method: IdMethod,
    heavy_indexing: bool,
    identifier_quoting: bool,
    string_format: StringFormat,
    namespace: Option<String>,
    accessor_visibility: Visibility,
    mutator_visibility: Visibility,
}

impl TableDefaults {
    fn of(database: &Database) -> Self {
        Self {
            id_method: database.default_id_method,
            heavy_indexing: database.heavy_indexing,
            identifier_quoting: database.identifier_quoting,
            string_format: database.default_string_format,
            namespace: database.namespace.clone(),
            accessor_visibility: database.default_accessor_visibility,
            mutator_visibility: database.default_mutator_visibility,
        }
    }

    fn apply(&self, table: &mut Table) {
        table.id_method.get_or_insert(self.id_method);
        table.heavy_indexing.get_or_insert(self.heavy_indexing);
        table.identifier_quoting.get_or_insert(self.identifier_quoting);
        table.default_string_format.get_or_insert(self.string_format);
        table
            .default_accessor_visibility
            .get_or_insert(self.accessor_visibility);
        table
            .default_mutator_visibility
            .get_or_insert(self.mutator_visibility);
        if table.namespace.is_none() {
            table.namespace = self.namespace.clone();
        }
    }
}

fn finalize_table(database: &mut Database, pos: usize, platform: &dyn Platform) -> Result<()> {
    let table = database.table_at_mut(pos);
    add_heavy_indices(table)?;

    if table.id_method() == IdMethod::Native && !table.has_auto_increment_column() {
        tracing::trace!(table = %table.name, "No auto-increment column, id method set to none");
        table.id_method = Some(IdMethod::None);
    }

    setup_foreign_key_references(database, pos)?;
    setup_referrers(database, pos)?;

    let indices = platform.extra_fk_indices(database, database.table_at(pos));
    let table = database.table_at_mut(pos);
    for index in indices {
        let name = index.name().to_string();
        if table.add_index_if_missing(index)? {
            tracing::trace!(table = %table.name, index = %name, "Added foreign key index");
        }
    }

    if !table.has_primary_key() && !table.for_reference_only {
        tracing::warn!(table = %table.name, "Table has no primary key");
    }

    Ok(())
}

// One index per primary-key suffix: pk[1..], pk[2..], ... pk[n-1..].
fn add_heavy_indices(table: &mut Table) -> Result<()> {
    if !table.is_heavy_indexing() {
        return Ok(());
    }

    let pk: Vec<String> = table
        .primary_key_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    for start in 1..pk.len() {
        let index = Index::on(&pk[start..]);
        if table.add_index_if_missing(index)? {
            tracing::trace!(table = %table.name, columns = ?&pk[start..], "Added heavy index");
        }
    }

    Ok(())
}

/// Give foreign keys declared without column pairs one local column per
/// foreign primary-key column.
fn setup_foreign_key_references(database: &mut Database, pos: usize) -> Result<()> {
    let implicit: Vec<ForeignKey> = database
        .table_at(pos)
        .foreign_keys()
        .iter()
        .filter(|fk| fk.is_implicit())
        .cloned()
        .collect();

    for fk in implicit {
        let foreign_pos = resolve_foreign_table(database, pos, &fk)?;
        let foreign = database.table_at(foreign_pos);
        let pk: Vec<Column> = foreign.primary_key().into_iter().cloned().collect();
        if pk.is_empty() {
            return Err(ModelError::Constraint(format!(
                "foreign key '{}' of table '{}' has no references and foreign table '{}' has no primary key",
                fk.name,
                fk.table_name(),
                foreign.name
            )));
        }

        let table = database.table_at_mut(pos);
        let mut pairs = Vec::with_capacity(pk.len());
        for foreign_column in &pk {
            let local = naming::implicit_fk_column_name(&fk.name, &foreign_column.name);
            if table.has_column(&local) {
                return Err(ModelError::Constraint(format!(
                    "column '{}' synthesized for foreign key '{}' already exists in table '{}'",
                    local, fk.name, table.name
                )));
            }

            tracing::trace!(table = %table.name, column = %local, "Adding implicit foreign key column");
            table.add_column(Column::with_domain(&local, foreign_column.domain.for_column()))?;
            pairs.push((local, foreign_column.name.clone()));
        }

        if let Some(target) = table.foreign_key_mut(&fk.name) {
            for (local, foreign) in pairs {
                target.add_reference(local, foreign);
            }
        }
    }

    Ok(())
}

/// Register every foreign key of the table with its foreign table and
/// foreign columns, and derive `contains_foreign_pk`.
fn setup_referrers(database: &mut Database, pos: usize) -> Result<()> {
    let fks = database.table_at(pos).foreign_keys().to_vec();
    let mut contains_foreign_pk = false;

    for fk in &fks {
        let foreign_pos = resolve_foreign_table(database, pos, fk)?;

        let local = database.table_at(pos);
        for name in fk.local_columns() {
            let column = local.column(name).ok_or_else(|| {
                ModelError::Reference(format!(
                    "foreign key '{}' of table '{}' uses unknown local column '{}'",
                    fk.name, local.name, name
                ))
            })?;
            if column.primary_key {
                contains_foreign_pk = true;
            }
        }

        let foreign = database.table_at(foreign_pos);
        for name in fk.foreign_columns() {
            if !foreign.has_column(name) {
                return Err(ModelError::Reference(format!(
                    "foreign key '{}' of table '{}' references unknown column '{}.{}'",
                    fk.name,
                    fk.table_name(),
                    foreign.name,
                    name
                )));
            }
        }

        let id = fk.id();
        let foreign = database.table_at_mut(foreign_pos);
        foreign.add_referrer(id.clone());
        for name in fk.foreign_columns() {
            if let Some(column) = foreign.column_mut(name) {
                column.add_referrer(id.clone());
            }
        }
        tracing::trace!(foreign_key = %id, foreign_table = %foreign.name, "Registered referrer");
    }

    database.table_at_mut(pos).set_contains_foreign_pk(contains_foreign_pk);
    Ok(())
}

fn resolve_foreign_table(database: &Database, pos: usize, fk: &ForeignKey) -> Result<usize> {
    let qualified = fk
        .foreign_schema
        .as_ref()
        .map(|schema| format!("{}.{}", schema, fk.foreign_table_name));

    database
        .table_position(&fk.foreign_table_name)
        .or_else(|| qualified.as_deref().and_then(|name| database.table_position(name)))
        .ok_or_else(|| {
            ModelError::Reference(format!(
                "foreign key '{}' of table '{}' references unknown table '{}' (known tables in database '{}': {})",
                fk.name,
                database.table_at(pos).name,
                fk.foreign_table_name,
                database.name,
                database.table_names().join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use super::*;
    use crate::behavior::{BehaviorPlugin, BehaviorRegistry, DatabaseModifier, TableModifier};
    use crate::error::ErrorKind;
    use crate::factory::ModelFactory;
    use crate::model::{Behavior, ForeignKeyId};
    use crate::platform::{GenericPlatform, MysqlPlatform};
    use crate::serializer::serialize;
    use crate::types::ColumnType;

    fn generic() -> GenericPlatform {
        GenericPlatform::default()
    }

    fn build(tree: Value) -> Schema {
        ModelFactory::default().build(&tree).unwrap()
    }

    fn build_finalized(tree: Value) -> Schema {
        let mut schema = build(tree);
        finalize(&mut schema, &generic()).unwrap();
        schema
    }

    fn bookstore() -> Value {
        json!({
            "name": "bookstore",
            "tables": [
                {
                    "name": "author",
                    "columns": [
                        { "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true },
                        { "name": "name", "type": "VARCHAR" }
                    ]
                },
                {
                    "name": "book",
                    "columns": [
                        { "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true },
                        { "name": "title", "type": "VARCHAR" },
                        { "name": "authorId", "type": "INTEGER" }
                    ],
                    "foreignKeys": [
                        { "name": "book_fk_author", "foreignTable": "author",
                          "references": [{ "local": "authorId", "foreign": "id" }] }
                    ]
                }
            ]
        })
    }

    fn book_author() -> Value {
        json!({
            "name": "bookstore",
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                { "name": "book", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                {
                    "name": "book_author",
                    "isCrossRef": true,
                    "columns": [
                        { "name": "book_id", "type": "INTEGER", "primaryKey": true },
                        { "name": "author_id", "type": "INTEGER", "primaryKey": true }
                    ],
                    "foreignKeys": [
                        { "foreignTable": "book", "references": [{ "local": "book_id", "foreign": "id" }] },
                        { "foreignTable": "author", "references": [{ "local": "author_id", "foreign": "id" }] }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_bookstore_end_to_end() {
        let schema = build_finalized(bookstore());
        let db = schema.database("bookstore").unwrap();
        let author = db.table("author").unwrap();
        let book = db.table("book").unwrap();
        let fk = ForeignKeyId::new("book", "book_fk_author");

        assert!(!book.contains_foreign_pk());
        assert_eq!(author.referrers(), &[fk.clone()]);
        assert!(book.column("authorId").unwrap().referrers().is_empty());
        assert_eq!(author.column("id").unwrap().referrers(), &[fk]);
        assert!(book.referrers().is_empty());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let tree = json!({
            "name": "bookstore",
            "heavyIndexing": true,
            "behaviors": { "timestampable": {} },
            "tables": [
                {
                    "name": "author",
                    "columns": [
                        { "name": "id", "type": "INTEGER", "primaryKey": true },
                        { "name": "region", "type": "INTEGER", "primaryKey": true }
                    ]
                },
                {
                    "name": "book",
                    "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true }],
                    "foreignKeys": [{ "foreignTable": "author" }],
                    "behaviors": { "archivable": {} }
                }
            ]
        });
        let mut schema = build(tree);
        let platform = MysqlPlatform::default();
        finalize(&mut schema, &platform).unwrap();
        let first = serialize(&schema);
        finalize(&mut schema, &platform).unwrap();
        assert_eq!(serialize(&schema), first);

        let db = schema.database("bookstore").unwrap();
        let book = db.table("book").unwrap();
        assert_eq!(
            book.columns().iter().filter(|c| c.name == "authorId").count(),
            1
        );
        assert_eq!(db.table("author").unwrap().referrers().len(), 1);
        assert_eq!(db.table("author").unwrap().indices().len(), 1);
    }

    #[test]
    fn test_referrer_symmetry() {
        let schema = build_finalized(book_author());
        let db = schema.database("bookstore").unwrap();

        for table in db.tables() {
            for fk in table.foreign_keys() {
                let foreign = db.table(&fk.foreign_table_name).unwrap();
                let id = fk.id();
                assert_eq!(foreign.referrers().iter().filter(|r| **r == id).count(), 1);
                for column in fk.foreign_columns() {
                    let column = foreign.column(column).unwrap();
                    assert!(column.has_referrer(&id));
                    assert_eq!(column.referrers().iter().filter(|r| **r == id).count(), 1);
                }
            }
        }
    }

    #[test]
    fn test_contains_foreign_pk() {
        let schema = build_finalized(book_author());
        let db = schema.database("bookstore").unwrap();
        assert!(db.table("book_author").unwrap().contains_foreign_pk());
        assert!(!db.table("book").unwrap().contains_foreign_pk());
        assert!(!db.table("author").unwrap().contains_foreign_pk());
    }

    #[test]
    fn test_implicit_foreign_key_column() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                {
                    "name": "book",
                    "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }],
                    "foreignKeys": [{ "name": "author", "foreignTable": "author" }]
                }
            ]
        }));
        let book = schema.database("bookstore").unwrap().table("book").unwrap();
        let column = book.column("authorId").unwrap();
        assert_eq!(column.column_type(), ColumnType::Integer);
        assert!(!column.primary_key);

        let fk = book.foreign_key("author").unwrap();
        assert_eq!(fk.references().len(), 1);
        assert_eq!(fk.references()[0].local, "authorId");
        assert_eq!(fk.references()[0].foreign, "id");
    }

    #[test]
    fn test_implicit_foreign_key_without_foreign_pk() {
        let mut schema = build(json!({
            "name": "bookstore",
            "tables": [
                { "name": "author", "columns": [{ "name": "name", "type": "VARCHAR" }] },
                { "name": "book", "foreignKeys": [{ "foreignTable": "author" }] }
            ]
        }));
        let err = finalize(&mut schema, &generic()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert!(err.to_string().contains("'author' has no primary key"));
    }

    #[test]
    fn test_implicit_foreign_key_column_collision() {
        let mut schema = build(json!({
            "name": "bookstore",
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                {
                    "name": "book",
                    "columns": [{ "name": "authorId", "type": "VARCHAR" }],
                    "foreignKeys": [{ "foreignTable": "author" }]
                }
            ]
        }));
        let err = finalize(&mut schema, &generic()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert!(err.to_string().contains("authorId"));
    }

    #[test]
    fn test_heavy_indexing_adds_suffix_indices() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "tables": [{
                "name": "edition",
                "heavyIndexing": true,
                "columns": [
                    { "name": "book_id", "type": "INTEGER", "primaryKey": true },
                    { "name": "lang", "type": "CHAR", "primaryKey": true },
                    { "name": "number", "type": "INTEGER", "primaryKey": true }
                ]
            }]
        }));
        let edition = schema.database("bookstore").unwrap().table("edition").unwrap();
        let indices: Vec<Vec<&str>> = edition
            .indices()
            .iter()
            .map(|i| i.column_names().collect())
            .collect();
        assert_eq!(indices, vec![vec!["lang", "number"], vec!["number"]]);
    }

    #[test]
    fn test_heavy_indexing_inherited_from_database() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "heavyIndexing": true,
            "tables": [
                {
                    "name": "edition",
                    "columns": [
                        { "name": "book_id", "type": "INTEGER", "primaryKey": true },
                        { "name": "lang", "type": "CHAR", "primaryKey": true }
                    ]
                },
                {
                    "name": "translation",
                    "heavyIndexing": false,
                    "columns": [
                        { "name": "book_id", "type": "INTEGER", "primaryKey": true },
                        { "name": "lang", "type": "CHAR", "primaryKey": true }
                    ]
                }
            ]
        }));
        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table("edition").unwrap().indices().len(), 1);
        assert!(db.table("translation").unwrap().indices().is_empty());
    }

    #[test]
    fn test_native_id_method_downgrade() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "tables": [
                {
                    "name": "isbn_lookup",
                    "idMethod": "native",
                    "columns": [{ "name": "isbn", "type": "CHAR", "primaryKey": true }]
                },
                {
                    "name": "author",
                    "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true }]
                }
            ]
        }));
        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table("isbn_lookup").unwrap().id_method(), IdMethod::None);
        assert_eq!(db.table("author").unwrap().id_method(), IdMethod::Native);
    }

    #[test]
    fn test_unresolved_foreign_table() {
        let mut schema = build(json!({
            "name": "bookstore",
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                {
                    "name": "book",
                    "columns": [{ "name": "publisher_id", "type": "INTEGER" }],
                    "foreignKeys": [{ "foreignTable": "publisher",
                                      "references": [{ "local": "publisher_id", "foreign": "id" }] }]
                }
            ]
        }));
        let err = finalize(&mut schema, &generic()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        let message = err.to_string();
        assert!(message.contains("'publisher'"));
        assert!(message.contains("author, book"));
    }

    #[test]
    fn test_unknown_reference_columns() {
        let mut tree = bookstore();
        tree["tables"][1]["foreignKeys"][0]["references"][0]["foreign"] = json!("uuid");
        let mut schema = build(tree);
        let err = finalize(&mut schema, &generic()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(err.to_string().contains("author.uuid"));

        let mut tree = bookstore();
        tree["tables"][1]["foreignKeys"][0]["references"][0]["local"] = json!("writer_id");
        let mut schema = build(tree);
        let err = finalize(&mut schema, &generic()).unwrap_err();
        assert!(err.to_string().contains("writer_id"));
    }

    #[test]
    fn test_foreign_table_by_qualified_name() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "tables": [
                {
                    "name": "author",
                    "schema": "people",
                    "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }]
                },
                {
                    "name": "book",
                    "columns": [{ "name": "author_id", "type": "INTEGER" }],
                    "foreignKeys": [{ "foreignTable": "people.author",
                                      "references": [{ "local": "author_id", "foreign": "id" }] }]
                }
            ]
        }));
        let author = schema.database("bookstore").unwrap().table("author").unwrap();
        assert_eq!(author.referrers().len(), 1);
    }

    #[test]
    fn test_external_reference_table_as_target() {
        let mut schema = build(bookstore());
        let mut external = Schema::new();
        let mut db = Database::new("bookstore");
        let mut publisher = Table::new("publisher");
        publisher
            .add_column(Column::new("id", ColumnType::Integer).primary())
            .unwrap();
        db.add_table(publisher).unwrap();
        external.add_database(db).unwrap();
        schema
            .add_external_schema(crate::model::ExternalSchema {
                path: "publisher.json".into(),
                reference_only: true,
                schema: external,
            })
            .unwrap();

        let db = schema.database_mut("bookstore").unwrap();
        let mut book = Table::new("catalog");
        book.add_column(Column::new("publisher_id", ColumnType::Integer))
            .unwrap();
        let mut fk = ForeignKey::new("catalog_fk_publisher", "publisher");
        fk.add_reference("publisher_id", "id");
        book.add_foreign_key(fk).unwrap();
        db.add_table(book).unwrap();

        finalize(&mut schema, &generic()).unwrap();
        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table("publisher").unwrap().referrers().len(), 1);
        let emitted: Vec<&str> = schema.emittable_tables().map(|(_, t)| t.name.as_str()).collect();
        assert!(!emitted.contains(&"publisher"));
    }

    #[test]
    fn test_cascading_defaults() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "namespace": "Bookstore",
            "defaultStringFormat": "JSON",
            "defaultMutatorVisibility": "protected",
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                { "name": "book", "namespace": "Catalog", "defaultStringFormat": "XML",
                  "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] }
            ]
        }));
        let db = schema.database("bookstore").unwrap();
        let author = db.table("author").unwrap();
        assert_eq!(author.namespace.as_deref(), Some("Bookstore"));
        assert_eq!(author.default_string_format, Some(StringFormat::Json));
        assert_eq!(author.default_mutator_visibility, Some(Visibility::Protected));
        let book = db.table("book").unwrap();
        assert_eq!(book.namespace.as_deref(), Some("Catalog"));
        assert_eq!(book.default_string_format, Some(StringFormat::Xml));
    }

    #[test]
    fn test_mysql_adds_foreign_key_indices() {
        let mut schema = build(bookstore());
        finalize(&mut schema, &MysqlPlatform::default()).unwrap();
        let book = schema.database("bookstore").unwrap().table("book").unwrap();
        assert_eq!(book.indices().len(), 1);
        assert_eq!(book.indices()[0].name(), "book_fi_authorId");

        let mut schema = build(bookstore());
        finalize(&mut schema, &MysqlPlatform::new("MyISAM")).unwrap();
        let book = schema.database("bookstore").unwrap().table("book").unwrap();
        assert!(book.indices().is_empty());
    }

    #[test]
    fn test_database_behavior_applies_to_tables() {
        let schema = build_finalized(json!({
            "name": "bookstore",
            "behaviors": { "timestampable": {} },
            "tables": [
                { "name": "author", "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }] },
                {
                    "name": "book",
                    "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }],
                    "behaviors": { "timestampable": { "create_column": "added_on" } }
                }
            ]
        }));
        let db = schema.database("bookstore").unwrap();
        assert!(db.behavior("timestampable").unwrap().is_executed());

        let author = db.table("author").unwrap();
        assert!(author.has_behavior("timestampable"));
        assert!(author.has_column("created_at"));
        assert!(author.behavior("timestampable").unwrap().is_executed());
        let book = db.table("book").unwrap();
        assert!(book.has_column("added_on"));
        assert!(!book.has_column("created_at"));
    }

    // Adds an audit table carrying its own behavior.
    struct Audited;

    impl BehaviorPlugin for Audited {
        fn table_modifier(&self) -> Option<&dyn TableModifier> {
            Some(self)
        }
    }

    impl TableModifier for Audited {
        fn modify_table(&self, _behavior: &Behavior, table: &str, database: &mut Database) -> Result<()> {
            let name = format!("{}_audit", table);
            if database.has_table(&name) {
                return Ok(());
            }
            let mut audit = Table::new(name);
            audit.add_column(Column::new("id", ColumnType::Integer).primary().auto_increment())?;
            audit.add_behavior(BehaviorRegistry::with_builtins().create("timestampable")?)?;
            database.add_table(audit)
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl BehaviorPlugin for Counting {
        fn allows_multiple(&self) -> bool {
            true
        }

        fn table_modifier(&self) -> Option<&dyn TableModifier> {
            Some(self)
        }
    }

    impl TableModifier for Counting {
        fn modify_table(&self, _behavior: &Behavior, _table: &str, _database: &mut Database) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Seeding;

    impl BehaviorPlugin for Seeding {
        fn database_modifier(&self) -> Option<&dyn DatabaseModifier> {
            Some(self)
        }
    }

    impl DatabaseModifier for Seeding {
        fn modify_database(&self, behavior: &Behavior, database: &mut Database) -> Result<()> {
            let name = behavior.parameter("table").unwrap_or("seed");
            let mut table = Table::new(name);
            table.add_column(Column::new("id", ColumnType::Integer).primary())?;
            database.add_table(table)
        }
    }

    #[test]
    fn test_behavior_generated_tables_run_their_behaviors() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register("audited", Audited);
        let tree = json!({
            "name": "bookstore",
            "tables": [{
                "name": "book",
                "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }],
                "behaviors": { "audited": {} }
            }]
        });
        let mut schema = ModelFactory::new(registry).build(&tree).unwrap();
        finalize(&mut schema, &generic()).unwrap();

        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table_names(), vec!["book", "book_audit"]);
        let audit = db.table("book_audit").unwrap();
        assert!(audit.has_column("created_at"));
        assert!(audit.behavior("timestampable").unwrap().is_executed());
    }

    #[test]
    fn test_table_behaviors_run_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register("counting", Counting(Arc::clone(&calls)));
        let tree = json!({
            "name": "bookstore",
            "tables": [{
                "name": "book",
                "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }],
                "behaviors": [
                    { "name": "counting" },
                    { "name": "counting", "id": "counting_again" }
                ]
            }]
        });
        let mut schema = ModelFactory::new(registry).build(&tree).unwrap();
        finalize(&mut schema, &generic()).unwrap();
        finalize(&mut schema, &generic()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_database_modifier_adds_table() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register("seeding", Seeding);
        let tree = json!({
            "name": "bookstore",
            "behaviors": { "seeding": { "table": "fixture" } },
            "tables": []
        });
        let mut schema = ModelFactory::new(registry).build(&tree).unwrap();
        finalize(&mut schema, &generic()).unwrap();
        finalize(&mut schema, &generic()).unwrap();

        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table_names(), vec!["fixture"]);
        assert_eq!(db.table("fixture").unwrap().id_method(), IdMethod::None);
    }

    // Attaches timestampable to the whole database.
    struct Bootstrap;

    impl BehaviorPlugin for Bootstrap {
        fn database_modifier(&self) -> Option<&dyn DatabaseModifier> {
            Some(self)
        }
    }

    impl DatabaseModifier for Bootstrap {
        fn modify_database(&self, _behavior: &Behavior, database: &mut Database) -> Result<()> {
            if database.behavior("timestampable").is_some() {
                return Ok(());
            }
            database.add_behavior(BehaviorRegistry::with_builtins().create("timestampable")?)
        }
    }

    // Asks the database for a fixture table.
    struct Fixtures;

    impl BehaviorPlugin for Fixtures {
        fn table_modifier(&self) -> Option<&dyn TableModifier> {
            Some(self)
        }
    }

    impl TableModifier for Fixtures {
        fn modify_table(&self, _behavior: &Behavior, table: &str, database: &mut Database) -> Result<()> {
            if database.behavior("seeding").is_some() {
                return Ok(());
            }
            let seeding = Behavior::new("seeding", Arc::new(Seeding))
                .with_parameter("table", format!("{}_fixture", table));
            database.add_behavior(seeding)
        }
    }

    #[test]
    fn test_database_behavior_added_by_database_hook() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register("bootstrap", Bootstrap);
        let tree = json!({
            "name": "bookstore",
            "behaviors": { "bootstrap": {} },
            "tables": [{
                "name": "book",
                "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }]
            }]
        });
        let mut schema = ModelFactory::new(registry).build(&tree).unwrap();
        finalize(&mut schema, &generic()).unwrap();
        let first = serialize(&schema);

        let db = schema.database("bookstore").unwrap();
        assert!(db.behavior("timestampable").unwrap().is_executed());
        assert!(db.table("book").unwrap().has_column("created_at"));

        finalize(&mut schema, &generic()).unwrap();
        assert_eq!(serialize(&schema), first);
    }

    #[test]
    fn test_database_behavior_added_by_table_hook() {
        let mut registry = BehaviorRegistry::with_builtins();
        registry.register("fixtures", Fixtures);
        let tree = json!({
            "name": "bookstore",
            "tables": [{
                "name": "book",
                "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true }],
                "behaviors": { "fixtures": {} }
            }]
        });
        let mut schema = ModelFactory::new(registry).build(&tree).unwrap();
        finalize(&mut schema, &generic()).unwrap();
        let first = serialize(&schema);

        let db = schema.database("bookstore").unwrap();
        assert_eq!(db.table_names(), vec!["book", "book_fixture"]);
        assert!(db.behavior("seeding").unwrap().is_executed());

        finalize(&mut schema, &generic()).unwrap();
        assert_eq!(serialize(&schema), first);
    }

    #[test]
    fn test_archivable_end_to_end() {
        let tree = json!({
            "name": "bookstore",
            "tables": [{
                "name": "book",
                "columns": [
                    { "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true },
                    { "name": "isbn", "type": "CHAR", "size": 13 }
                ],
                "uniques": [{ "columns": ["isbn"] }],
                "behaviors": { "timestampable": {}, "archivable": {} }
            }]
        });
        let schema = build_finalized(tree);
        let db = schema.database("bookstore").unwrap();
        let archive = db.table("book_archive").unwrap();

        assert!(archive.has_column("created_at"));
        assert!(archive.has_column("archived_at"));
        assert!(archive.behaviors().is_empty());
        assert_eq!(archive.id_method(), IdMethod::None);
        assert_eq!(archive.indices()[0].name(), "book_archive_u_isbn");
    }
}
