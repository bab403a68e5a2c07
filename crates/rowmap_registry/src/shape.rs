//! Result and parameter shapes.
//!
//! A [`ResultShape`] describes how a row (or a subset of its columns) maps
//! onto a structured value; a [`ParameterShape`] describes how a structured
//! value is bound to statement parameters.

use indexmap::IndexMap;
use rowmap_foundation::{JdbcType, ParameterMode, TypeName};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// FieldMapping
// =============================================================================

/// Role flags of a field mapping.
///
/// Constructor arguments and plain properties share one list; the flags are
/// the only thing telling them apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldFlags {
    /// Part of the row identity.
    pub id: bool,
    /// Passed to the target type's constructor.
    pub constructor: bool,
}

impl FieldFlags {
    /// Flags of a plain property mapping.
    pub const NONE: Self = Self {
        id: false,
        constructor: false,
    };
    /// Flags of an identifier property mapping.
    pub const ID: Self = Self {
        id: true,
        constructor: false,
    };
    /// Flags of a constructor argument.
    pub const CONSTRUCTOR: Self = Self {
        id: false,
        constructor: true,
    };
    /// Flags of an identifier constructor argument.
    pub const ID_CONSTRUCTOR: Self = Self {
        id: true,
        constructor: true,
    };
}

/// One `property=column` pair of a composite column binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompositeColumn {
    /// Property on the nested statement's parameter.
    pub property: String,
    /// Column of the current row.
    pub column: String,
}

/// One property/column (or nested shape) binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldMapping {
    /// Property or constructor-argument name.
    pub property: Option<String>,
    /// Column name; `None` for composite bindings.
    pub column: Option<String>,
    /// Declared or inferred value type.
    pub java_type: Option<TypeName>,
    /// JDBC type tag.
    pub jdbc_type: Option<JdbcType>,
    /// Qualified id of a nested statement.
    pub nested_select: Option<String>,
    /// Qualified id of a nested result shape.
    pub nested_shape: Option<String>,
    /// Type-handler override.
    pub type_handler: Option<TypeName>,
    /// Role flags.
    pub flags: FieldFlags,
    /// Whether the nested value loads lazily.
    pub lazy: bool,
    /// Prefix applied to columns of the nested shape.
    pub column_prefix: Option<String>,
    /// Columns that must be non-null for the nested value to be built.
    pub not_null_columns: Vec<String>,
    /// Composite column bindings for nested statements.
    pub composites: Vec<CompositeColumn>,
    /// Name of the result set feeding this mapping.
    pub result_set: Option<String>,
    /// Columns of the foreign result set to join on.
    pub foreign_column: Option<String>,
}

impl FieldMapping {
    /// Creates a plain property/column mapping.
    #[must_use]
    pub fn new(property: &str, column: &str) -> Self {
        Self {
            property: Some(property.to_string()),
            column: Some(column.to_string()),
            ..Self::default()
        }
    }

    /// Builder method to set the role flags.
    #[must_use]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns true if this mapping builds its value from another shape.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.nested_shape.is_some() && self.result_set.is_none()
    }

    /// Returns true if two mappings target the same property.
    #[must_use]
    pub fn same_property(&self, other: &Self) -> bool {
        matches!((&self.property, &other.property), (Some(a), Some(b)) if a == b)
    }
}

// =============================================================================
// Discriminator
// =============================================================================

/// Conditional shape selection keyed by a column's runtime value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Discriminator {
    /// Column whose value selects the case.
    pub column: String,
    /// Declared value type of the column.
    pub java_type: Option<TypeName>,
    /// JDBC type tag of the column.
    pub jdbc_type: Option<JdbcType>,
    /// Type-handler override.
    pub type_handler: Option<TypeName>,
    /// Literal value to qualified shape id, in document order.
    pub cases: IndexMap<String, String>,
}

impl Discriminator {
    /// Returns the shape id selected by a literal value.
    #[must_use]
    pub fn case(&self, value: &str) -> Option<&str> {
        self.cases.get(value).map(String::as_str)
    }
}

// =============================================================================
// ResultShape
// =============================================================================

/// How a row maps to a structured value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultShape {
    /// Qualified id.
    pub id: String,
    /// Target type; a shape may legitimately have none.
    pub type_name: Option<TypeName>,
    /// Effective field mappings, inherited ones first.
    pub fields: Vec<FieldMapping>,
    /// Optional discriminator.
    pub discriminator: Option<Discriminator>,
    /// Qualified id of the parent shape, if declared.
    pub extends: Option<String>,
    /// Auto-mapping override; `None` defers to the session default.
    pub auto_mapping: Option<bool>,
}

impl ResultShape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Mappings flagged as identifiers.
    pub fn id_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| f.flags.id)
    }

    /// Mappings flagged as constructor arguments.
    pub fn constructor_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| f.flags.constructor)
    }

    /// Mappings that set properties after construction.
    pub fn property_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| !f.flags.constructor)
    }

    /// Upper-cased names of every column this shape reads directly.
    #[must_use]
    pub fn mapped_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let direct = self.fields.iter().filter_map(|f| f.column.as_deref());
        let composite = self
            .fields
            .iter()
            .flat_map(|f| f.composites.iter().map(|c| c.column.as_str()));
        for column in direct.chain(composite) {
            let upper = column.to_uppercase();
            if !columns.contains(&upper) {
                columns.push(upper);
            }
        }
        columns
    }

    /// Returns true if any mapping embeds another shape.
    #[must_use]
    pub fn has_nested_shapes(&self) -> bool {
        self.fields.iter().any(FieldMapping::is_nested)
    }

    /// Returns true if any mapping runs a nested statement.
    #[must_use]
    pub fn has_nested_selects(&self) -> bool {
        self.fields.iter().any(|f| f.nested_select.is_some())
    }
}

// =============================================================================
// ParameterShape
// =============================================================================

/// One parameter binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterMapping {
    /// Property read from (or written to) the parameter object.
    pub property: String,
    /// Value type.
    pub java_type: Option<TypeName>,
    /// JDBC type tag.
    pub jdbc_type: Option<JdbcType>,
    /// Result shape of an OUT cursor parameter.
    pub result_shape: Option<String>,
    /// Parameter direction.
    pub mode: ParameterMode,
    /// Numeric scale of decimal OUT parameters.
    pub numeric_scale: Option<i32>,
    /// Type-handler override.
    pub type_handler: Option<TypeName>,
}

/// How a structured value maps to bound statement parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterShape {
    /// Qualified id.
    pub id: String,
    /// Parameter object type.
    pub type_name: Option<TypeName>,
    /// Bindings in document order.
    pub mappings: Vec<ParameterMapping>,
}
