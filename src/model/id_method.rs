/// Primary-key generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMethod {
    /// Platform auto-increment (identity, serial, sequence...).
    #[default]
    Native,
    None,
}

impl IdMethod {
    /// `autoincrement` and `sequence` are older spellings of `native`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" | "autoincrement" | "sequence" => Some(Self::Native),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::None => "none",
        }
    }
}

/// Extra argument for the id method, e.g. the name of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMethodParameter {
    pub name: Option<String>,
    pub value: String,
}

/// Format used when a generated object is rendered as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    #[default]
    Yaml,
    Json,
    Xml,
    Csv,
}

impl StringFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "YAML" => Some(Self::Yaml),
            "JSON" => Some(Self::Json),
            "XML" => Some(Self::Xml),
            "CSV" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Csv => "CSV",
        }
    }
}

/// Visibility of generated accessors and mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}
