use std::fmt;

use super::VendorInfo;

/// Stable identity of a foreign key: owning table plus the key's name.
/// Referrer lists store these instead of references into the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForeignKeyId {
    pub table: String,
    pub name: String,
}

impl ForeignKeyId {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ForeignKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    None,
    Cascade,
    SetNull,
    Restrict,
    NoAction,
    SetDefault,
}

impl ReferentialAction {
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "" | "none" => Some(Self::None),
            "cascade" => Some(Self::Cascade),
            "setnull" => Some(Self::SetNull),
            "restrict" => Some(Self::Restrict),
            "noaction" => Some(Self::NoAction),
            "setdefault" => Some(Self::SetDefault),
            _ => None,
        }
    }

    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Cascade => Some("CASCADE"),
            Self::SetNull => Some("SET NULL"),
            Self::Restrict => Some("RESTRICT"),
            Self::NoAction => Some("NO ACTION"),
            Self::SetDefault => Some("SET DEFAULT"),
        }
    }
}

/// One (local column, foreign column) pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub local: String,
    pub foreign: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    /// Logical (or schema-qualified) name of the referenced table. Resolved
    /// against the database during finalization.
    pub foreign_table_name: String,
    pub foreign_schema: Option<String>,
    pub php_name: Option<String>,
    pub ref_php_name: Option<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
    pub skip_sql: bool,
    pub default_join: Option<String>,
    pub vendor: Vec<VendorInfo>,
    references: Vec<Reference>,
    table: String,
}

impl ForeignKey {
    pub fn new(name: impl Into<String>, foreign_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreign_table_name: foreign_table.into(),
            foreign_schema: None,
            php_name: None,
            ref_php_name: None,
            on_delete: ReferentialAction::None,
            on_update: ReferentialAction::None,
            skip_sql: false,
            default_join: None,
            vendor: Vec::new(),
            references: Vec::new(),
            table: String::new(),
        }
    }

    pub fn add_reference(&mut self, local: impl Into<String>, foreign: impl Into<String>) {
        self.references.push(Reference {
            local: local.into(),
            foreign: foreign.into(),
        });
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// True when the key was declared without column pairs; finalization
    /// fills them from the foreign primary key.
    pub fn is_implicit(&self) -> bool {
        self.references.is_empty()
    }

    pub fn local_columns(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.local.as_str())
    }

    pub fn foreign_columns(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.foreign.as_str())
    }

    /// Name of the table that owns this key.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> ForeignKeyId {
        ForeignKeyId::new(self.table.clone(), self.name.clone())
    }

    pub(crate) fn set_table(&mut self, table: &str) {
        self.table = table.to_string();
    }
}
