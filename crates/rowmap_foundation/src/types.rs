//! Value-type names and the small enumerations attached to mappings.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// A resolved, fully qualified type name.
///
/// Cloning is cheap; names are shared between every mapping that uses them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// The catch-all value type.
    pub const OBJECT: &'static str = "Object";
    /// Cursor results bound to an OUT parameter.
    pub const RESULT_SET: &'static str = "ResultSet";
    /// Generic key/value container.
    pub const MAP: &'static str = "Map";

    /// Creates a type name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this names the generic map type.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.as_str() == Self::MAP
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// JDBC type tag of a column or parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum JdbcType {
    Array,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    Blob,
    Clob,
    Boolean,
    Cursor,
    Undefined,
    NVarchar,
    NChar,
    NClob,
    Struct,
    JavaObject,
    Distinct,
    Ref,
    DataLink,
    RowId,
    LongNVarchar,
    SqlXml,
    DateTimeOffset,
    TimeWithTimezone,
    TimestampWithTimezone,
}

impl JdbcType {
    const ALL: [(&'static str, Self); 41] = [
        ("ARRAY", Self::Array),
        ("BIT", Self::Bit),
        ("TINYINT", Self::TinyInt),
        ("SMALLINT", Self::SmallInt),
        ("INTEGER", Self::Integer),
        ("BIGINT", Self::BigInt),
        ("FLOAT", Self::Float),
        ("REAL", Self::Real),
        ("DOUBLE", Self::Double),
        ("NUMERIC", Self::Numeric),
        ("DECIMAL", Self::Decimal),
        ("CHAR", Self::Char),
        ("VARCHAR", Self::Varchar),
        ("LONGVARCHAR", Self::LongVarchar),
        ("DATE", Self::Date),
        ("TIME", Self::Time),
        ("TIMESTAMP", Self::Timestamp),
        ("BINARY", Self::Binary),
        ("VARBINARY", Self::VarBinary),
        ("LONGVARBINARY", Self::LongVarBinary),
        ("NULL", Self::Null),
        ("OTHER", Self::Other),
        ("BLOB", Self::Blob),
        ("CLOB", Self::Clob),
        ("BOOLEAN", Self::Boolean),
        ("CURSOR", Self::Cursor),
        ("UNDEFINED", Self::Undefined),
        ("NVARCHAR", Self::NVarchar),
        ("NCHAR", Self::NChar),
        ("NCLOB", Self::NClob),
        ("STRUCT", Self::Struct),
        ("JAVA_OBJECT", Self::JavaObject),
        ("DISTINCT", Self::Distinct),
        ("REF", Self::Ref),
        ("DATALINK", Self::DataLink),
        ("ROWID", Self::RowId),
        ("LONGNVARCHAR", Self::LongNVarchar),
        ("SQLXML", Self::SqlXml),
        ("DATETIMEOFFSET", Self::DateTimeOffset),
        ("TIME_WITH_TIMEZONE", Self::TimeWithTimezone),
        ("TIMESTAMP_WITH_TIMEZONE", Self::TimestampWithTimezone),
    ];

    /// Returns the canonical upper-case tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, ty)| *ty == self)
            .map_or("UNDEFINED", |(name, _)| name)
    }
}

impl FromStr for JdbcType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, ty)| *ty)
            .ok_or_else(|| Error::new(ErrorKind::InvalidJdbcType(s.to_string())))
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a statement parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterMode {
    /// Bound into the statement.
    #[default]
    In,
    /// Read back after execution.
    Out,
    /// Both bound and read back.
    InOut,
}

impl FromStr for ParameterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "INOUT" => Ok(Self::InOut),
            other => Err(Error::new(ErrorKind::InvalidParameterMode(other.to_string()))),
        }
    }
}

/// When a nested mapping is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FetchType {
    /// Loaded on first access.
    Lazy,
    /// Loaded with the owning row.
    #[default]
    Eager,
}

impl FetchType {
    /// Interprets a `fetchType` attribute; anything but `lazy` is eager.
    #[must_use]
    pub fn from_attr(value: Option<&str>, lazy_by_default: bool) -> Self {
        match value {
            Some("lazy") => Self::Lazy,
            Some(_) => Self::Eager,
            None if lazy_by_default => Self::Lazy,
            None => Self::Eager,
        }
    }
}
