//! Naming conventions shared by the model and the code emitters.

use convert_case::{Case, Casing};

use crate::model::{ForeignKey, Table};

/// `book_author` -> `BookAuthor`
pub fn to_studly_case(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// `book_author` -> `bookAuthor`
pub fn to_camel_case(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// `BookAuthor` -> `book_author`
pub fn to_snake_case(name: &str) -> String {
    name.to_case(Case::Snake)
}

pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lcfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Constant under which emitted table maps expose a column, e.g. `COL_AUTHOR_ID`.
pub fn column_constant_name(column: &str) -> String {
    format!("COL_{}", column.to_case(Case::UpperSnake))
}

/// Local column created for a foreign key declared without explicit references.
pub fn implicit_fk_column_name(fk_name: &str, pk_column: &str) -> String {
    format!("{}{}", lcfirst(fk_name), ucfirst(pk_column))
}

/// Accessor name of the object a foreign key points at, seen from the local table.
pub fn relation_name(table: &Table, fk: &ForeignKey) -> String {
    if let Some(name) = &fk.php_name {
        return name.clone();
    }

    let base = to_studly_case(&fk.foreign_table_name);
    format!("{}{}", base, related_by_suffix(table, fk))
}

/// Accessor name of the referring objects, seen from the foreign table.
pub fn referrer_relation_name(table: &Table, fk: &ForeignKey) -> String {
    if let Some(name) = &fk.ref_php_name {
        return name.clone();
    }

    format!("{}{}", table.php_name(), related_by_suffix(table, fk))
}

// Disambiguates several foreign keys from one table to the same foreign table.
fn related_by_suffix(table: &Table, fk: &ForeignKey) -> String {
    let siblings = table
        .foreign_keys()
        .iter()
        .filter(|other| other.foreign_table_name == fk.foreign_table_name)
        .count();

    if siblings < 2 {
        return String::new();
    }

    let columns: String = fk
        .local_columns()
        .map(to_studly_case)
        .collect::<Vec<_>>()
        .join("");
    format!("RelatedBy{}", columns)
}
