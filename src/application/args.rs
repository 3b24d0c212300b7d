//! Typed access to a validated argument object.

use std::path::Path;

use serde_json::Value;

use crate::application::registry::JsonObject;
use crate::domain::error::ToolError;

pub struct Args<'a> {
    operation: &'static str,
    map: &'a JsonObject,
}

impl<'a> Args<'a> {
    pub fn new(operation: &'static str, map: &'a JsonObject) -> Self {
        Self { operation, map }
    }

    fn present(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|value| !value.is_null())
    }

    pub fn str(&self, name: &'static str) -> Result<&'a str, ToolError> {
        match self.present(name) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ToolError::invalid(name, "expected a string")),
            None => Err(ToolError::MissingArgument {
                operation: self.operation,
                argument: name,
            }),
        }
    }

    pub fn opt_str(&self, name: &'static str) -> Result<Option<&'a str>, ToolError> {
        match self.present(name) {
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ToolError::invalid(name, "expected a string")),
            None => Ok(None),
        }
    }

    pub fn path(&self, name: &'static str) -> Result<&'a Path, ToolError> {
        self.str(name).map(Path::new)
    }

    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, ToolError> {
        match self.present(name) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ToolError::invalid(name, "expected a boolean")),
            None => Ok(default),
        }
    }

    pub fn object(&self, name: &'static str) -> Result<Option<&'a JsonObject>, ToolError> {
        match self.present(name) {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ToolError::invalid(name, "expected an object")),
            None => Ok(None),
        }
    }

    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.present(name)
    }
}
