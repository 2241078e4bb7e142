use super::VendorInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    /// Prefix length for engines that index a leading part of the value.
    pub size: Option<u32>,
}

impl IndexColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }
}

/// Ordered list of columns of the owning table. Column names are checked
/// against the table when the index is added to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    pub name: Option<String>,
    pub columns: Vec<IndexColumn>,
    pub vendor: Vec<VendorInfo>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(IndexColumn::new).collect(),
            ..Self::default()
        }
    }

    pub fn add_column(&mut self, column: IndexColumn) {
        self.columns.push(column);
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        self.column_names().eq(names.iter().copied())
    }

    /// True if the index can serve lookups on `names` (its leading columns match).
    pub fn covers(&self, names: &[&str]) -> bool {
        !names.is_empty()
            && self.columns.len() >= names.len()
            && self.column_names().zip(names).all(|(a, b)| a == *b)
    }

    pub(crate) fn default_name(&self, table: &str, marker: &str) -> String {
        let columns: Vec<&str> = self.column_names().collect();
        format!("{}_{}_{}", table, marker, columns.join("_"))
    }
}

/// Unique constraint; shares the shape of [`Index`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unique(pub Index);

impl Unique {
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Index::on(columns))
    }

    pub fn index(&self) -> &Index {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.0.column_names()
    }

    pub fn into_index(self) -> Index {
        self.0
    }
}
