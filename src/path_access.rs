//! Path based reading and writing on a `JsonNode` tree.
//!
//! Absent values never fail: scalar getters return `None` and the array/object
//! getters return an empty container, so lookups can be chained. Present values
//! of the wrong shape fail with `JsonError::TypeMismatch`.

use std::borrow::Cow;

use anyhow::{
    Result,
    bail,
};
use log::debug;

use crate::error::JsonError;
use crate::json_node::{JsonNode, JsonObjProp};
use crate::json_path::JsonPath;

/// Resolves `path` against `root`. A blank path addresses `root` itself.
pub fn resolve<'a>(root: &'a JsonNode, path: &str) -> Result<Option<&'a JsonNode>> {
    if path.trim().is_empty() {
        return Ok(Some(root));
    }

    let json_path = JsonPath::parse(path)?;
    Ok(json_path.resolve(root))
}

impl JsonNode {
    /// The node at `path`, without conversion.
    pub fn get_by_path(&self, path: &str) -> Result<Option<&JsonNode>> {
        resolve(self, path)
    }

    /// The node at `path`, treating null like absent.
    fn present_by_path(&self, path: &str) -> Result<Option<&JsonNode>> {
        Ok(resolve(self, path)?.filter(|node| !node.is_null()))
    }

    fn scalar_by_path<T>(&self, path: &str, convert: impl FnOnce(&JsonNode) -> Result<T>) -> Result<Option<T>> {
        match self.present_by_path(path)? {
            Some(node) => convert(node).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_array_by_path(&self, path: &str) -> Result<Cow<'_, [JsonNode]>> {
        match self.present_by_path(path)? {
            Some(node) => Ok(Cow::Borrowed(node.as_array()?)),
            None => Ok(Cow::Owned(Vec::new())),
        }
    }

    pub fn get_object_by_path(&self, path: &str) -> Result<Cow<'_, [JsonObjProp]>> {
        match self.present_by_path(path)? {
            Some(node) => Ok(Cow::Borrowed(node.as_object()?)),
            None => Ok(Cow::Owned(Vec::new())),
        }
    }

    pub fn get_string_by_path(&self, path: &str) -> Result<Option<String>> {
        self.scalar_by_path(path, JsonNode::as_string)
    }

    pub fn get_int_by_path(&self, path: &str) -> Result<Option<i32>> {
        self.scalar_by_path(path, JsonNode::as_i32)
    }

    pub fn get_long_by_path(&self, path: &str) -> Result<Option<i64>> {
        self.scalar_by_path(path, JsonNode::as_i64)
    }

    pub fn get_float_by_path(&self, path: &str) -> Result<Option<f32>> {
        self.scalar_by_path(path, JsonNode::as_f32)
    }

    pub fn get_double_by_path(&self, path: &str) -> Result<Option<f64>> {
        self.scalar_by_path(path, JsonNode::as_f64)
    }

    pub fn get_boolean_by_path(&self, path: &str) -> Result<Option<bool>> {
        self.scalar_by_path(path, JsonNode::as_bool)
    }

    /// Sets one property, creating missing parents.
    ///
    /// The path is split at its last `.` and the tail must be a plain key. When
    /// the head resolves, the key is assigned on that object (a blank head means
    /// this node). When it does not, the whole path is written the way
    /// [`JsonNode::put_by_path`] does, so missing objects and arrays are created.
    pub fn set_by_path(&mut self, path: &str, value: impl Into<JsonNode>) -> Result<()> {
        let trimmed = path.trim();
        let (prefix, last_key) = trimmed.rsplit_once('.').unwrap_or(("", trimmed));
        if last_key.is_empty() {
            bail!(JsonError::malformed_path(path, "empty key"));
        }
        if last_key.contains(['[', ']']) {
            bail!(JsonError::malformed_path(path, "last segment must be a plain key"));
        }

        let value = value.into();
        if prefix.is_empty() {
            self.set(last_key, value)?;
            return Ok(());
        }

        match JsonPath::parse(prefix)?.resolve_mut(self) {
            Some(parent) => {
                parent.set(last_key, value)?;
            }
            None => {
                debug!("set at '{}': parent missing, creating it", trimmed);
                JsonPath::parse(trimmed)?.put(self, value)?;
            }
        }

        Ok(())
    }

    /// Writes `value` at `path`, creating any missing objects and arrays on the way.
    pub fn put_by_path(&mut self, path: &str, value: impl Into<JsonNode>) -> Result<()> {
        let json_path = JsonPath::parse(path)?;
        debug!("put at '{}'", json_path);
        json_path.put(self, value.into())
    }
}
