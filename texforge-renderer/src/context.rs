//! Render context: template defaults merged with user values.

use serde_json::Value;
use texforge_core::{nested, TemplateSchema, ValueMap};

use crate::error::RenderError;

/// Variables visible to a template during one render call.
///
/// Built as `defaults ⊕ user_values`: each top-level key of the user values
/// replaces the same key of the defaults wholesale. Nested mappings are not
/// merged, so a user value `course: {id: ...}` hides every default under
/// `course`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    values: ValueMap,
}

impl RenderContext {
    pub fn new(values: ValueMap) -> Self {
        RenderContext { values }
    }

    /// `defaults ⊕ user`.
    pub fn merged(defaults: ValueMap, user: ValueMap) -> Self {
        RenderContext {
            values: nested::shallow_merge(defaults, user),
        }
    }

    /// Defaults declared by `schema` (if any), overlaid with `user`.
    /// Repeated sections the user left out get default records, as many
    /// as the merged counter asks for.
    pub fn for_schema(schema: Option<&TemplateSchema>, user: ValueMap) -> Result<Self, RenderError> {
        let Some(schema) = schema else {
            return Ok(RenderContext::new(user));
        };
        let mut ctx = RenderContext::merged(schema.defaults()?, user);
        schema.fill_repeated(&mut ctx.values)?;
        Ok(ctx)
    }

    /// Set a single dotted key, creating intermediate mappings.
    pub fn insert_path(&mut self, key: &str, value: Value) -> Result<(), RenderError> {
        nested::assign(&mut self.values, key, value)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        nested::lookup(&self.values, key)
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn into_values(self) -> ValueMap {
        self.values
    }
}
