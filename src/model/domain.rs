use crate::types::ColumnType;

/// Default value of a column: either a literal or a SQL expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDefault {
    Value(String),
    Expression(String),
}

/// Type, size, scale and default of a column. Named domains are declared
/// once on a database and copied into the columns that use them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Domain {
    pub name: Option<String>,
    pub column_type: ColumnType,
    pub sql_type: Option<String>,
    pub size: Option<u32>,
    pub scale: Option<u32>,
    pub default: Option<ColumnDefault>,
}

impl Domain {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: Some(name.into()),
            column_type,
            ..Self::default()
        }
    }

    /// Copy of this domain as used by a column: the name is dropped.
    pub fn for_column(&self) -> Self {
        Self {
            name: None,
            ..self.clone()
        }
    }
}
