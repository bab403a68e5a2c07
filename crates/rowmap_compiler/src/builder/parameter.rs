//! Parameter shape construction (`parameterMap` elements).

use rowmap_foundation::{Error, JdbcType, Node, ParameterMode, Result, TypeName};
use rowmap_registry::{ParameterMapping, ParameterShape};

use super::BuildContext;

/// Builds one [`ParameterShape`] per `parameterMap` element.
///
/// Parameter shapes never reference other shapes at build time, so they are
/// always ready to register.
#[derive(Clone, Copy, Debug)]
pub struct ParameterShapeBuilder<'a> {
    cx: BuildContext<'a>,
}

impl<'a> ParameterShapeBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub fn new(cx: BuildContext<'a>) -> Self {
        Self { cx }
    }

    /// Builds the shape declared by a `parameterMap` element.
    pub fn build(&self, node: &Node) -> Result<ParameterShape> {
        let local_id = node
            .non_empty_attr("id")
            .ok_or_else(|| Error::missing_attribute(node.name(), "id"))?;
        let id = self.cx.scope.qualify_definition(local_id)?;
        let type_name = self
            .cx
            .types
            .resolve_name(
                node.non_empty_attr("type")
                    .ok_or_else(|| Error::missing_attribute(node.name(), "type"))?,
            )
            .map_err(|e| e.in_activity(format!("parameterMap[{local_id}]")))?;

        let mappings = node
            .children_named("parameter")
            .map(|parameter| self.build_mapping(parameter, &type_name))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.in_activity(format!("parameterMap[{local_id}]")))?;

        Ok(ParameterShape {
            id,
            type_name: Some(type_name),
            mappings,
        })
    }

    fn build_mapping(&self, node: &Node, owner: &TypeName) -> Result<ParameterMapping> {
        let property = node
            .non_empty_attr("property")
            .ok_or_else(|| Error::missing_attribute(node.name(), "property"))?;
        let jdbc_type = BuildContext::jdbc_type(node)?;
        let mode = node
            .non_empty_attr("mode")
            .map(str::parse::<ParameterMode>)
            .transpose()?
            .unwrap_or_default();

        let java_type = match self.cx.type_attr(node, "javaType")? {
            Some(declared) => declared,
            None => self.infer_java_type(owner, property, jdbc_type),
        };

        Ok(ParameterMapping {
            property: property.to_string(),
            java_type: Some(java_type),
            jdbc_type,
            result_shape: node
                .non_empty_attr("resultMap")
                .map(|shape| self.cx.scope.qualify_reference(shape)),
            mode,
            numeric_scale: node.attr_i32("numericScale")?,
            type_handler: self.cx.type_attr(node, "typeHandler")?,
        })
    }

    /// Value type of a parameter that declares none.
    fn infer_java_type(
        &self,
        owner: &TypeName,
        property: &str,
        jdbc_type: Option<JdbcType>,
    ) -> TypeName {
        if jdbc_type == Some(JdbcType::Cursor) {
            return TypeName::new(TypeName::RESULT_SET);
        }
        if owner.is_map() {
            return TypeName::new(TypeName::OBJECT);
        }
        self.cx
            .metadata
            .getter_type(owner, property)
            .unwrap_or_else(|| TypeName::new(TypeName::OBJECT))
    }
}
