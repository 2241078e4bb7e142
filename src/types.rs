//! Column type names and their aliases.

use std::fmt;

/// Canonical column types understood by the emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Decimal,
    Numeric,
    Char,
    #[default]
    Varchar,
    LongVarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Enum,
    Object,
    Array,
    Json,
    Uuid,
}

impl ColumnType {
    /// Parse a type name as written in a schema, ignoring case and any
    /// parenthesized size suffix.
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let base = lower.split('(').next().unwrap_or(&lower).trim();

        let typ = match base {
            // Integer types
            "boolean" | "bool" => Self::Boolean,
            "tinyint" => Self::TinyInt,
            "smallint" | "int2" => Self::SmallInt,
            "integer" | "int" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInt,

            // Floating point
            "float" => Self::Float,
            "real" | "float4" => Self::Real,
            "double" | "double precision" | "float8" => Self::Double,
            "decimal" => Self::Decimal,
            "numeric" => Self::Numeric,

            // String types
            "char" | "character" => Self::Char,
            "varchar" | "character varying" | "string" => Self::Varchar,
            "longvarchar" | "text" => Self::LongVarchar,
            "clob" | "longtext" => Self::Clob,

            // Date/time
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" | "datetime" | "timestamptz" => Self::Timestamp,

            // Binary
            "binary" => Self::Binary,
            "varbinary" => Self::VarBinary,
            "longvarbinary" | "bytea" => Self::LongVarBinary,
            "blob" | "longblob" => Self::Blob,

            // Structured
            "enum" => Self::Enum,
            "object" => Self::Object,
            "array" => Self::Array,
            "json" | "jsonb" => Self::Json,
            "uuid" => Self::Uuid,

            _ => return None,
        };

        Some(typ)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Enum => "ENUM",
            Self::Object => "OBJECT",
            Self::Array => "ARRAY",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Float
                | Self::Real
                | Self::Double
                | Self::Decimal
                | Self::Numeric
        )
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::Char | Self::Varchar | Self::LongVarchar | Self::Clob
        )
    }

    pub fn is_lob(self) -> bool {
        matches!(self, Self::Clob | Self::Blob | Self::LongVarBinary)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
