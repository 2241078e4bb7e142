//! Platform descriptors consulted by the platform-specific step of
//! finalization.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::model::{Database, Index, Table, VendorInfo, vendor_parameter};

/// Supported target platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformKind {
    #[default]
    Generic,
    Mysql,
    Pgsql,
    Sqlite,
    Oracle,
    Mssql,
}

impl PlatformKind {
    /// Parse platform from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "generic" | "default" => Some(Self::Generic),
            "mysql" | "mariadb" => Some(Self::Mysql),
            "pgsql" | "postgres" | "postgresql" => Some(Self::Pgsql),
            "sqlite" => Some(Self::Sqlite),
            "oracle" | "oci" => Some(Self::Oracle),
            "mssql" | "sqlsrv" => Some(Self::Mssql),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Mysql => "mysql",
            Self::Pgsql => "pgsql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
            Self::Mssql => "mssql",
        }
    }
}

impl<'de> Deserialize<'de> for PlatformKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_str(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown platform '{}'", name)))
    }
}

/// Platform hooks used while finalizing a table.
pub trait Platform: fmt::Debug {
    fn kind(&self) -> PlatformKind;

    fn default_storage_engine(&self) -> Option<&str> {
        None
    }

    /// Whether the storage engine chosen for `table` needs an explicit index
    /// on the local columns of every foreign key.
    fn requires_explicit_fk_index(&self, _database: &Database, _table: &Table) -> bool {
        false
    }

    /// Indices to add to `table` at the end of its finalization.
    fn extra_fk_indices(&self, database: &Database, table: &Table) -> Vec<Index> {
        if !self.requires_explicit_fk_index(database, table) {
            return Vec::new();
        }

        table
            .foreign_keys()
            .iter()
            .filter_map(|fk| {
                let columns: Vec<&str> = fk.local_columns().collect();
                if columns.is_empty() || table.covers_columns(&columns) {
                    return None;
                }
                let mut index = Index::on(columns);
                index.name = Some(index.default_name(&table.name, "fi"));
                Some(index)
            })
            .collect()
    }
}

/// Platform without engine-specific index rules.
#[derive(Debug, Clone, Default)]
pub struct GenericPlatform {
    kind: PlatformKind,
}

impl GenericPlatform {
    pub fn new(kind: PlatformKind) -> Self {
        Self { kind }
    }
}

impl Platform for GenericPlatform {
    fn kind(&self) -> PlatformKind {
        self.kind
    }
}

pub const DEFAULT_MYSQL_TABLE_TYPE: &str = "InnoDB";

#[derive(Debug, Clone)]
pub struct MysqlPlatform {
    table_type: String,
}

impl MysqlPlatform {
    pub fn new(table_type: impl Into<String>) -> Self {
        Self {
            table_type: table_type.into(),
        }
    }

    /// Engine of a table: table vendor, then database vendor, then the
    /// configured default.
    pub fn storage_engine<'a>(&'a self, database: &'a Database, table: &'a Table) -> &'a str {
        mysql_engine(&table.vendor)
            .or_else(|| mysql_engine(&database.vendor))
            .unwrap_or(&self.table_type)
    }
}

fn mysql_engine(vendor: &[VendorInfo]) -> Option<&str> {
    vendor_parameter(vendor, "mysql", "Engine").or_else(|| vendor_parameter(vendor, "mysql", "Type"))
}

impl Default for MysqlPlatform {
    fn default() -> Self {
        Self::new(DEFAULT_MYSQL_TABLE_TYPE)
    }
}

impl Platform for MysqlPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Mysql
    }

    fn default_storage_engine(&self) -> Option<&str> {
        Some(&self.table_type)
    }

    fn requires_explicit_fk_index(&self, database: &Database, table: &Table) -> bool {
        self.storage_engine(database, table)
            .eq_ignore_ascii_case("InnoDB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ForeignKey};
    use crate::types::ColumnType;

    fn book() -> Table {
        let mut book = Table::new("book");
        book.add_column(Column::new("id", ColumnType::Integer).primary())
            .unwrap();
        book.add_column(Column::new("author_id", ColumnType::Integer))
            .unwrap();
        let mut fk = ForeignKey::new("book_fk_author", "author");
        fk.add_reference("author_id", "id");
        book.add_foreign_key(fk).unwrap();
        book
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(PlatformKind::from_str("PostgreSQL"), Some(PlatformKind::Pgsql));
        assert_eq!(PlatformKind::from_str("mysql"), Some(PlatformKind::Mysql));
        assert_eq!(PlatformKind::from_str("db2"), None);
    }

    #[test]
    fn test_innodb_needs_fk_index() {
        let db = Database::new("bookstore");
        let table = book();
        let indices = MysqlPlatform::default().extra_fk_indices(&db, &table);
        assert_eq!(indices.len(), 1);
        assert_eq!(indices[0].name(), "book_fi_author_id");
    }

    #[test]
    fn test_engine_from_vendor() {
        let mut db = Database::new("bookstore");
        db.vendor
            .push(VendorInfo::new("mysql").with_parameter("Engine", "MyISAM"));
        let mut table = book();
        let platform = MysqlPlatform::default();
        assert_eq!(platform.storage_engine(&db, &table), "MyISAM");
        assert!(platform.extra_fk_indices(&db, &table).is_empty());

        table
            .vendor
            .push(VendorInfo::new("mysql").with_parameter("Type", "InnoDB"));
        assert_eq!(platform.storage_engine(&db, &table), "InnoDB");
    }

    #[test]
    fn test_generic_adds_nothing() {
        let db = Database::new("bookstore");
        let platform = GenericPlatform::new(PlatformKind::Pgsql);
        assert!(platform.extra_fk_indices(&db, &book()).is_empty());
        assert_eq!(platform.kind(), PlatformKind::Pgsql);
    }
}
