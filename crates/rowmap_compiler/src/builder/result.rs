//! Result shape construction.
//!
//! A `resultMap` element becomes one [`ResultShape`]; every association,
//! collection or discriminator case without an explicit `select` or
//! `resultMap` becomes an additional anonymous shape built in place. The
//! builder returns all of them, nested shapes before the shapes that
//! reference them.

use indexmap::IndexMap;
use rowmap_foundation::{Error, FetchType, Node, Result, TypeName};
use rowmap_registry::{CompositeColumn, Discriminator, FieldFlags, FieldMapping, ResultShape};

use super::BuildContext;

/// Attributes naming a shape's target type, by precedence.
const TYPE_ATTRIBUTES: &[&str] = &["type", "ofType", "resultType", "javaType"];

/// Elements that build an anonymous nested shape when they name none.
const NESTED_ELEMENTS: &[&str] = &["association", "collection", "case"];

/// Builds the result shapes declared by one `resultMap` element.
#[derive(Debug)]
pub struct ResultShapeBuilder<'a> {
    cx: BuildContext<'a>,
    built: Vec<ResultShape>,
}

impl<'a> ResultShapeBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub fn new(cx: BuildContext<'a>) -> Self {
        Self {
            cx,
            built: Vec::new(),
        }
    }

    /// Builds a document-level `resultMap` sitting at `index` among the
    /// children of the root element `root_name`.
    ///
    /// Returns every shape built, the declared one last.
    pub fn build_top_level(
        mut self,
        root_name: &str,
        index: usize,
        node: &Node,
    ) -> Result<Vec<ResultShape>> {
        let segment = node.identifier_segment(index);
        let path = format!("{root_name}_{segment}");
        self.build(node, &path, &segment, &[], None)?;
        Ok(self.built)
    }

    fn build(
        &mut self,
        node: &Node,
        path: &str,
        segment: &str,
        seed: &[FieldMapping],
        enclosing: Option<&TypeName>,
    ) -> Result<String> {
        self.build_shape(node, path, seed, enclosing)
            .map_err(|e| e.in_activity(segment))
    }

    fn build_shape(
        &mut self,
        node: &Node,
        path: &str,
        seed: &[FieldMapping],
        enclosing: Option<&TypeName>,
    ) -> Result<String> {
        let type_name = match self.cx.types.resolve(node.first_attr(TYPE_ATTRIBUTES))? {
            Some(declared) => Some(declared),
            None => self.inherit_enclosing_type(node, enclosing),
        };

        let mut fields = seed.to_vec();
        let mut discriminator = None;
        for (index, child) in node.children().iter().enumerate() {
            let segment = child.identifier_segment(index);
            let child_path = format!("{path}_{segment}");
            match child.name() {
                "constructor" => {
                    for (arg_index, arg) in child.children().iter().enumerate() {
                        let arg_segment = arg.identifier_segment(arg_index);
                        let arg_path = format!("{child_path}_{arg_segment}");
                        let flags = if arg.name() == "idArg" {
                            FieldFlags::ID_CONSTRUCTOR
                        } else {
                            FieldFlags::CONSTRUCTOR
                        };
                        let field =
                            self.build_field(arg, &arg_path, &arg_segment, type_name.as_ref(), flags)?;
                        fields.push(field);
                    }
                }
                "discriminator" => {
                    discriminator = Some(self.build_discriminator(
                        child,
                        &child_path,
                        &fields,
                        type_name.as_ref(),
                    )?);
                }
                name => {
                    let flags = if name == "id" {
                        FieldFlags::ID
                    } else {
                        FieldFlags::NONE
                    };
                    let field =
                        self.build_field(child, &child_path, &segment, type_name.as_ref(), flags)?;
                    fields.push(field);
                }
            }
        }

        let id = match node.non_empty_attr("id") {
            Some(id) => self.cx.scope.qualify_definition(id)?,
            None => self.cx.scope.anonymous_id(path),
        };
        let shape = ResultShape {
            id: id.clone(),
            type_name,
            fields,
            discriminator,
            extends: node
                .non_empty_attr("extends")
                .map(|parent| self.cx.scope.qualify_reference(parent)),
            auto_mapping: node.attr_bool("autoMapping")?,
        };
        self.built.push(shape);
        Ok(id)
    }

    /// Target type of a nested shape that declares none.
    fn inherit_enclosing_type(&self, node: &Node, enclosing: Option<&TypeName>) -> Option<TypeName> {
        if node.non_empty_attr("resultMap").is_some() {
            return None;
        }
        match node.name() {
            "association" => {
                let property = node.non_empty_attr("property")?;
                self.cx.metadata.setter_type(enclosing?, property)
            }
            "case" => enclosing.cloned(),
            _ => None,
        }
    }

    fn build_field(
        &mut self,
        node: &Node,
        path: &str,
        segment: &str,
        enclosing: Option<&TypeName>,
        flags: FieldFlags,
    ) -> Result<FieldMapping> {
        let property = if flags.constructor {
            node.non_empty_attr("name")
        } else {
            node.non_empty_attr("property")
        };
        let (column, composites) = parse_column(node)?;

        let java_type = match self.cx.type_attr(node, "javaType")? {
            Some(declared) => Some(declared),
            None => property
                .zip(enclosing)
                .and_then(|(property, ty)| self.cx.metadata.setter_type(ty, property)),
        };

        let nested_select = node
            .non_empty_attr("select")
            .map(|select| self.cx.scope.qualify_reference(select));
        let nested_shape = match node.non_empty_attr("resultMap") {
            Some(shape) => Some(self.cx.scope.qualify_reference(shape)),
            None if nested_select.is_none() && NESTED_ELEMENTS.contains(&node.name()) => {
                self.validate_collection(node, enclosing)?;
                Some(self.build(node, path, segment, &[], enclosing)?)
            }
            None => None,
        };

        let lazy = FetchType::from_attr(node.non_empty_attr("fetchType"), self.cx.config.lazy_loading)
            == FetchType::Lazy;

        Ok(FieldMapping {
            property: property.map(String::from),
            column,
            java_type,
            jdbc_type: BuildContext::jdbc_type(node)?,
            nested_select,
            nested_shape,
            type_handler: self.cx.type_attr(node, "typeHandler")?,
            flags,
            lazy,
            column_prefix: node.non_empty_attr("columnPrefix").map(String::from),
            not_null_columns: parse_not_null_columns(node.non_empty_attr("notNullColumn")),
            composites,
            result_set: node.non_empty_attr("resultSet").map(String::from),
            foreign_column: node.non_empty_attr("foreignColumn").map(String::from),
        })
    }

    fn build_discriminator(
        &mut self,
        node: &Node,
        path: &str,
        fields: &[FieldMapping],
        enclosing: Option<&TypeName>,
    ) -> Result<Discriminator> {
        let column = node
            .non_empty_attr("column")
            .ok_or_else(|| Error::missing_attribute("discriminator", "column"))?;

        let mut cases = IndexMap::new();
        for (index, case) in node.children().iter().enumerate() {
            let value = case
                .attr("value")
                .ok_or_else(|| Error::missing_attribute(case.name(), "value"))?;
            let target = match case.non_empty_attr("resultMap") {
                Some(shape) => self.cx.scope.qualify_reference(shape),
                None => {
                    let segment = case.identifier_segment(index);
                    let case_path = format!("{path}_{segment}");
                    self.build(case, &case_path, &segment, fields, enclosing)?
                }
            };
            cases.insert(value.to_string(), target);
        }

        Ok(Discriminator {
            column: column.to_string(),
            java_type: self.cx.type_attr(node, "javaType")?,
            jdbc_type: BuildContext::jdbc_type(node)?,
            type_handler: self.cx.type_attr(node, "typeHandler")?,
            cases,
        })
    }

    /// Rejects a collection whose element type cannot be determined.
    fn validate_collection(&self, node: &Node, enclosing: Option<&TypeName>) -> Result<()> {
        if node.name() != "collection"
            || node.non_empty_attr("resultMap").is_some()
            || node.non_empty_attr("javaType").is_some()
        {
            return Ok(());
        }
        let property = node.non_empty_attr("property").unwrap_or_default();
        if enclosing.is_some_and(|ty| self.cx.metadata.has_setter(ty, property)) {
            Ok(())
        } else {
            Err(Error::ambiguous_collection(property))
        }
    }
}

/// Splits a `column` attribute into a plain column or composite bindings.
///
/// `{prop=col, prop2=col2}` (braces optional) binds several columns to the
/// properties of a nested statement's parameter.
fn parse_column(node: &Node) -> Result<(Option<String>, Vec<CompositeColumn>)> {
    let Some(column) = node.non_empty_attr("column") else {
        return Ok((None, Vec::new()));
    };
    if !column.contains('=') && !column.contains(',') {
        return Ok((Some(column.to_string()), Vec::new()));
    }

    let invalid = || Error::invalid_attribute(node.name(), "column", column, "{property=column, ...}");
    let mut composites = Vec::new();
    for pair in strip_braces(column).split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (property, target) = pair.split_once('=').ok_or_else(invalid)?;
        let (property, target) = (property.trim(), target.trim());
        if property.is_empty() || target.is_empty() {
            return Err(invalid());
        }
        composites.push(CompositeColumn {
            property: property.to_string(),
            column: target.to_string(),
        });
    }
    Ok((None, composites))
}

/// Parses `notNullColumn`, written as `a,b` or `{a,b}`.
fn parse_not_null_columns(value: Option<&str>) -> Vec<String> {
    value
        .map(|value| {
            strip_braces(value)
                .split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn strip_braces(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(value)
}
