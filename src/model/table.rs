use crate::behavior::{BuilderModifier, ModifierTarget};
use crate::error::{ModelError, Result};
use crate::naming;

use super::behavior::attach_behavior;
use super::{
    Behavior, Column, ForeignKey, ForeignKeyId, IdMethod, IdMethodParameter, Index, StringFormat,
    Unique, VendorInfo, Visibility,
};

#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    /// Explicit SQL table name; defaults to `name`.
    pub sql_name: Option<String>,
    pub php_name: Option<String>,
    pub namespace: Option<String>,
    pub schema: Option<String>,
    pub description: Option<String>,
    pub id_method: Option<IdMethod>,
    pub id_method_parameters: Vec<IdMethodParameter>,
    pub heavy_indexing: Option<bool>,
    pub identifier_quoting: Option<bool>,
    pub default_string_format: Option<StringFormat>,
    pub default_accessor_visibility: Option<Visibility>,
    pub default_mutator_visibility: Option<Visibility>,
    /// Usable as a foreign-key target but never emitted.
    pub for_reference_only: bool,
    pub skip_sql: bool,
    pub read_only: bool,
    pub is_abstract: bool,
    pub is_cross_ref: bool,
    pub allow_pk_insert: bool,
    pub vendor: Vec<VendorInfo>,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKey>,
    indices: Vec<Index>,
    uniques: Vec<Unique>,
    behaviors: Vec<Behavior>,
    referrers: Vec<ForeignKeyId>,
    contains_foreign_pk: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_name: None,
            php_name: None,
            namespace: None,
            schema: None,
            description: None,
            id_method: None,
            id_method_parameters: Vec::new(),
            heavy_indexing: None,
            identifier_quoting: None,
            default_string_format: None,
            default_accessor_visibility: None,
            default_mutator_visibility: None,
            for_reference_only: false,
            skip_sql: false,
            read_only: false,
            is_abstract: false,
            is_cross_ref: false,
            allow_pk_insert: false,
            vendor: Vec::new(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indices: Vec::new(),
            uniques: Vec::new(),
            behaviors: Vec::new(),
            referrers: Vec::new(),
            contains_foreign_pk: false,
        }
    }

    pub fn sql_name(&self) -> &str {
        self.sql_name.as_deref().unwrap_or(&self.name)
    }

    pub fn php_name(&self) -> String {
        self.php_name
            .clone()
            .unwrap_or_else(|| naming::to_studly_case(&self.name))
    }

    /// `schema.name` when the table lives in an explicit SQL schema.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn id_method(&self) -> IdMethod {
        self.id_method.unwrap_or_default()
    }

    pub fn is_heavy_indexing(&self) -> bool {
        self.heavy_indexing.unwrap_or(false)
    }

    //
    // columns
    //

    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(ModelError::Constraint(format!(
                "column '{}' already exists in table '{}'",
                column.name, self.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    pub fn primary_key_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    /// Primary key columns, or an error for emitters that cannot handle
    /// tables without one.
    pub fn require_primary_key(&self) -> Result<Vec<&Column>> {
        let pk = self.primary_key();
        if pk.is_empty() {
            return Err(ModelError::Constraint(format!(
                "table '{}' has no primary key",
                self.name
            )));
        }
        Ok(pk)
    }

    pub fn has_auto_increment_column(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    /// Discriminator column of a single-table inheritance hierarchy.
    pub fn child_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_inheritance())
    }

    pub fn primary_string_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_string)
    }

    //
    // foreign keys
    //

    pub fn add_foreign_key(&mut self, mut fk: ForeignKey) -> Result<()> {
        if self.foreign_key(&fk.name).is_some() {
            return Err(ModelError::Constraint(format!(
                "foreign key '{}' is declared twice in table '{}'",
                fk.name, self.name
            )));
        }
        fk.set_table(&self.name);
        self.foreign_keys.push(fk);
        Ok(())
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    pub(crate) fn foreign_key_mut(&mut self, name: &str) -> Option<&mut ForeignKey> {
        self.foreign_keys.iter_mut().find(|fk| fk.name == name)
    }

    pub fn remove_foreign_key(&mut self, name: &str) -> Option<ForeignKey> {
        let pos = self.foreign_keys.iter().position(|fk| fk.name == name)?;
        Some(self.foreign_keys.remove(pos))
    }

    //
    // indices and uniques
    //

    pub fn add_index(&mut self, mut index: Index) -> Result<()> {
        self.check_index_columns(&index, "index")?;
        if index.name.is_none() {
            index.name = Some(index.default_name(&self.name, "i"));
        }
        self.check_index_name(index.name())?;
        self.indices.push(index);
        Ok(())
    }

    /// Add `index` unless an index over exactly the same columns exists.
    /// Returns whether it was added.
    pub fn add_index_if_missing(&mut self, index: Index) -> Result<bool> {
        let columns: Vec<&str> = index.column_names().collect();
        if self.indices.iter().any(|i| i.has_columns(&columns)) {
            return Ok(false);
        }
        self.add_index(index)?;
        Ok(true)
    }

    pub fn add_unique(&mut self, mut unique: Unique) -> Result<()> {
        self.check_index_columns(&unique.0, "unique constraint")?;
        if unique.0.name.is_none() {
            unique.0.name = Some(unique.0.default_name(&self.name, "u"));
        }
        self.check_index_name(unique.name())?;
        self.uniques.push(unique);
        Ok(())
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    pub fn uniques(&self) -> &[Unique] {
        &self.uniques
    }

    pub fn take_uniques(&mut self) -> Vec<Unique> {
        std::mem::take(&mut self.uniques)
    }

    /// True if the primary key, an index or a unique constraint starts with `columns`.
    pub fn covers_columns(&self, columns: &[&str]) -> bool {
        let pk = Index::on(self.primary_key_names());
        pk.covers(columns)
            || self.indices.iter().any(|i| i.covers(columns))
            || self.uniques.iter().any(|u| u.index().covers(columns))
    }

    fn check_index_columns(&self, index: &Index, what: &str) -> Result<()> {
        if index.columns.is_empty() {
            return Err(ModelError::Constraint(format!(
                "{} '{}' on table '{}' has no columns",
                what,
                index.name(),
                self.name
            )));
        }
        for column in index.column_names() {
            if !self.has_column(column) {
                return Err(ModelError::Reference(format!(
                    "{} on table '{}' references unknown column '{}'",
                    what, self.name, column
                )));
            }
        }
        Ok(())
    }

    fn check_index_name(&self, name: &str) -> Result<()> {
        let taken = self.indices.iter().any(|i| i.name() == name)
            || self.uniques.iter().any(|u| u.name() == name);
        if taken {
            return Err(ModelError::Constraint(format!(
                "index name '{}' is used twice in table '{}'",
                name, self.name
            )));
        }
        Ok(())
    }

    //
    // behaviors
    //

    pub fn add_behavior(&mut self, mut behavior: Behavior) -> Result<()> {
        behavior.set_table(Some(&self.name));
        let owner = format!("table '{}'", self.name);
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

    pub fn has_behavior(&self, id: &str) -> bool {
        self.behavior(id).is_some()
    }

    pub fn remove_behavior(&mut self, id: &str) -> Option<Behavior> {
        let pos = self.behaviors.iter().position(|b| b.id() == id)?;
        Some(self.behaviors.remove(pos))
    }

    /// Builder modifiers the emitters must consult for `target`, in
    /// behavior attachment order.
    pub fn modifiers(&self, target: ModifierTarget) -> Vec<(&Behavior, &dyn BuilderModifier)> {
        self.behaviors
            .iter()
            .filter_map(|b| b.modifier(target).map(|m| (b, m)))
            .collect()
    }

    //
    // derived back edges
    //

    /// Foreign keys of other tables (or this one) pointing at this table.
    pub fn referrers(&self) -> &[ForeignKeyId] {
        &self.referrers
    }

    /// True iff a primary-key column is also the local side of a foreign key.
    pub fn contains_foreign_pk(&self) -> bool {
        self.contains_foreign_pk
    }

    pub(crate) fn add_referrer(&mut self, fk: ForeignKeyId) {
        if !self.referrers.contains(&fk) {
            self.referrers.push(fk);
        }
    }

    pub(crate) fn set_contains_foreign_pk(&mut self, value: bool) {
        self.contains_foreign_pk = value;
    }

    pub(crate) fn clear_referrers(&mut self) {
        self.referrers.clear();
        for column in &mut self.columns {
            column.clear_referrers();
        }
    }

    /// Deep copy under a new name. Foreign keys, behaviors and default index
    /// names are re-linked to the copy; referrers are not carried over.
    pub fn duplicate(&self, name: &str) -> Table {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy.sql_name = None;
        copy.php_name = None;
        copy.clear_referrers();
        copy.contains_foreign_pk = false;

        for fk in &mut copy.foreign_keys {
            fk.set_table(name);
        }
        for behavior in &mut copy.behaviors {
            *behavior = behavior.for_table(name);
        }

        let old_prefix = format!("{}_", self.name);
        let new_prefix = format!("{}_", name);
        let rename = |index: &mut Index| {
            if let Some(rest) = index.name.as_deref().and_then(|n| n.strip_prefix(&old_prefix)) {
                index.name = Some(format!("{}{}", new_prefix, rest));
            }
        };
        copy.indices.iter_mut().for_each(rename);
        copy.uniques.iter_mut().map(|u| &mut u.0).for_each(rename);

        copy
    }
}
