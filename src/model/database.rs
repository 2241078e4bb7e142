use crate::error::{ModelError, Result};

use super::behavior::attach_behavior;
use super::{Behavior, Domain, IdMethod, StringFormat, Table, VendorInfo, Visibility};

#[derive(Debug, Clone)]
pub struct Database {
    pub name: String,
    pub default_id_method: IdMethod,
    pub namespace: Option<String>,
    pub schema: Option<String>,
    pub identifier_quoting: bool,
    pub default_string_format: StringFormat,
    pub heavy_indexing: bool,
    pub default_accessor_visibility: Visibility,
    pub default_mutator_visibility: Visibility,
    pub vendor: Vec<VendorInfo>,
    domains: Vec<Domain>,
    tables: Vec<Table>,
    behaviors: Vec<Behavior>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_id_method: IdMethod::Native,
            namespace: None,
            schema: None,
            identifier_quoting: false,
            default_string_format: StringFormat::Yaml,
            heavy_indexing: false,
            default_accessor_visibility: Visibility::Public,
            default_mutator_visibility: Visibility::Public,
            vendor: Vec::new(),
            domains: Vec::new(),
            tables: Vec::new(),
            behaviors: Vec::new(),
        }
    }

    //
    // tables
    //

    /// Append a table. Insertion order is the processing and emission order.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.has_table(&table.name) {
            return Err(ModelError::Constraint(format!(
                "table '{}' is declared twice in database '{}'",
                table.name, self.name
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Position of a table by logical name, falling back to the
    /// schema-qualified name.
    pub fn table_position(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name == name)
            .or_else(|| self.tables.iter().position(|t| t.qualified_name() == name))
    }

    /// Copy of the database settings with no tables and no behaviors.
    pub(crate) fn without_tables(&self) -> Database {
        Self {
            tables: Vec::new(),
            behaviors: Vec::new(),
            ..self.clone()
        }
    }

    pub(crate) fn table_at(&self, pos: usize) -> &Table {
        &self.tables[pos]
    }

    pub(crate) fn table_at_mut(&mut self, pos: usize) -> &mut Table {
        &mut self.tables[pos]
    }

    pub(crate) fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.iter_mut()
    }

    //
    // domains
    //

    pub fn add_domain(&mut self, domain: Domain) -> Result<()> {
        let Some(name) = domain.name.as_deref() else {
            return Err(ModelError::Configuration(format!(
                "domain declared without a name in database '{}'",
                self.name
            )));
        };
        if self.domain(name).is_some() {
            return Err(ModelError::Constraint(format!(
                "domain '{}' is declared twice in database '{}'",
                name, self.name
            )));
        }
        self.domains.push(domain);
        Ok(())
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name.as_deref() == Some(name))
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    //
    // behaviors
    //

    pub fn add_behavior(&mut self, mut behavior: Behavior) -> Result<()> {
        behavior.set_table(None);
        let owner = format!("database '{}'", self.name);
        attach_behavior(&mut self.behaviors, behavior, &owner)
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn behavior(&self, id: &str) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.id() == id)
    }

    pub(crate) fn behavior_mut(&mut self, id: &str) -> Option<&mut Behavior> {
        self.behaviors.iter_mut().find(|b| b.id() == id)
    }

    pub fn remove_behavior(&mut self, id: &str) -> Option<Behavior> {
        let pos = self.behaviors.iter().position(|b| b.id() == id)?;
        Some(self.behaviors.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    #[test]
    fn test_duplicate_table_rejected() {
        let mut db = Database::new("bookstore");
        db.add_table(Table::new("book")).unwrap();
        let err = db.add_table(Table::new("book")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Constraint violation: table 'book' is declared twice in database 'bookstore'"
        );
    }

    #[test]
    fn test_table_order_is_insertion_order() {
        let mut db = Database::new("bookstore");
        db.add_table(Table::new("publisher")).unwrap();
        db.add_table(Table::new("author")).unwrap();
        db.add_table(Table::new("book")).unwrap();
        assert_eq!(db.table_names(), vec!["publisher", "author", "book"]);
    }

    #[test]
    fn test_table_position_by_qualified_name() {
        let mut db = Database::new("bookstore");
        let mut table = Table::new("book");
        table.schema = Some("library".into());
        db.add_table(table).unwrap();
        assert_eq!(db.table_position("book"), Some(0));
        assert_eq!(db.table_position("library.book"), Some(0));
        assert_eq!(db.table_position("author"), None);
    }

    #[test]
    fn test_domains() {
        let mut db = Database::new("bookstore");
        db.add_domain(Domain::named("isbn", ColumnType::Char)).unwrap();
        assert!(db.domain("isbn").is_some());
        assert!(db.add_domain(Domain::named("isbn", ColumnType::Varchar)).is_err());
        assert!(db.add_domain(Domain::new(ColumnType::Varchar)).is_err());
    }
}
