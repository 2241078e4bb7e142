use crate::error::{ModelError, Result};
use crate::naming;
use crate::types::ColumnType;

use super::{ColumnDefault, Domain, ForeignKeyId, Inheritance, VendorInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Explicit SQL column name; defaults to `name`.
    pub sql_name: Option<String>,
    pub php_name: Option<String>,
    pub description: Option<String>,
    pub domain: Domain,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub not_null: bool,
    pub lazy_load: bool,
    pub primary_string: bool,
    pub vendor: Vec<VendorInfo>,
    inheritance: Vec<Inheritance>,
    referrers: Vec<ForeignKeyId>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::with_domain(name, Domain::new(column_type))
    }

    pub fn with_domain(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            sql_name: None,
            php_name: None,
            description: None,
            domain,
            primary_key: false,
            auto_increment: false,
            not_null: false,
            lazy_load: false,
            primary_string: false,
            vendor: Vec::new(),
            inheritance: Vec::new(),
            referrers: Vec::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn column_type(&self) -> ColumnType {
        self.domain.column_type
    }

    pub fn sql_name(&self) -> &str {
        self.sql_name.as_deref().unwrap_or(&self.name)
    }

    pub fn php_name(&self) -> String {
        self.php_name
            .clone()
            .unwrap_or_else(|| naming::to_studly_case(&self.name))
    }

    pub fn constant_name(&self) -> String {
        naming::column_constant_name(&self.name)
    }

    pub fn default(&self) -> Option<&ColumnDefault> {
        self.domain.default.as_ref()
    }

    /// Register a class keyed by a discriminator value. Keys are unique per column.
    pub fn add_inheritance(&mut self, inheritance: Inheritance) -> Result<()> {
        if self.inheritance.iter().any(|i| i.key == inheritance.key) {
            return Err(ModelError::Constraint(format!(
                "inheritance key '{}' is declared twice on column '{}'",
                inheritance.key, self.name
            )));
        }
        self.inheritance.push(inheritance);
        Ok(())
    }

    pub fn inheritance(&self) -> &[Inheritance] {
        &self.inheritance
    }

    pub fn is_inheritance(&self) -> bool {
        !self.inheritance.is_empty()
    }

    /// Foreign keys pointing at this column. Populated by finalization.
    pub fn referrers(&self) -> &[ForeignKeyId] {
        &self.referrers
    }

    pub fn has_referrer(&self, fk: &ForeignKeyId) -> bool {
        self.referrers.contains(fk)
    }

    pub(crate) fn add_referrer(&mut self, fk: ForeignKeyId) {
        if !self.referrers.contains(&fk) {
            self.referrers.push(fk);
        }
    }

    pub(crate) fn clear_referrers(&mut self) {
        self.referrers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_default_to_logical_name() {
        let column = Column::new("author_id", ColumnType::Integer);
        assert_eq!(column.sql_name(), "author_id");
        assert_eq!(column.php_name(), "AuthorId");
        assert_eq!(column.constant_name(), "COL_AUTHOR_ID");
    }

    #[test]
    fn test_duplicate_inheritance_key() {
        let mut column = Column::new("class_key", ColumnType::Integer);
        column.add_inheritance(Inheritance::new("1", "Essay")).unwrap();
        let err = column
            .add_inheritance(Inheritance::new("1", "Poem"))
            .unwrap_err();
        assert!(err.to_string().contains("inheritance key '1'"));
        assert!(column.is_inheritance());
    }

    #[test]
    fn test_referrers_are_deduplicated() {
        let mut column = Column::new("id", ColumnType::Integer).primary();
        let fk = ForeignKeyId::new("book", "book_fk_author");
        column.add_referrer(fk.clone());
        column.add_referrer(fk.clone());
        assert_eq!(column.referrers(), &[fk.clone()]);
        assert!(column.has_referrer(&fk));

        column.clear_referrers();
        assert!(!column.has_referrer(&fk));
    }
}
