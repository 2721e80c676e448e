use std::fmt;
use std::io::Read;

use anyhow::{
    Result,
    bail,
};
use log::{debug, trace};

use crate::error::JsonError;
use crate::json_node::{JsonNode, JsonObjProp};
use crate::peekable_codepoints::*;

/// Most elements a single write may append to an array, padding included.
pub const MAX_ARRAY_GROWTH: usize = 65_536;

/// One dot-separated segment: an identifier followed by zero or more indices.
///
/// An empty `path_name` applies the indices to the current node without
/// descending by key, e.g. the leading segment of `[0].name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPathPart {
    pub path_name: String,
    pub indices: Vec<usize>,
}

/// A single walking step, flattened from the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'a> {
    Key(&'a str),
    Index(usize),
}

impl JsonPathPart {
    fn read_index<R>(path_str: &str, peekable_cp: &mut PeekableCodePoints<R>) -> Result<usize>
        where R: Read
    {
        // opening '['
        peekable_cp.skip(1)?;

        let mut content = String::new();
        loop {
            match peekable_cp.next_char()? {
                Some(']') => break,
                None | Some('.') => bail!(JsonError::malformed_path(path_str, "unclosed '['")),
                Some(c) => content.push(c),
            }
        }

        if !content.is_empty() && content.chars().all(|c| c.is_ascii_digit()) {
            return match content.parse::<usize>() {
                Ok(index) => Ok(index),
                Err(_) => bail!(JsonError::malformed_path(path_str, format!("index {} is too large", content))),
            };
        }

        let is_negative = content.len() > 1
            && content.starts_with('-')
            && content[1..].chars().all(|c| c.is_ascii_digit());
        if is_negative {
            bail!(JsonError::malformed_path(path_str, format!("negative index {}", content)));
        }

        bail!(JsonError::malformed_path(path_str, format!("non-numeric index '{}'", content)))
    }

    /// Reads one segment up to (and including) the following '.', if any.
    pub fn read_part<R>(path_str: &str, peekable_cp: &mut PeekableCodePoints<R>) -> Result<Self>
        where R: Read
    {
        let mut path_name = String::new();
        loop {
            match peekable_cp.peek_char(0)? {
                None | Some('.') | Some('[') => break,
                Some(']') => bail!(JsonError::malformed_path(path_str, "unbalanced ']'")),
                Some(c) => {
                    path_name.push(c);
                    peekable_cp.skip(1)?;
                }
            }
        }

        let mut indices = Vec::new();
        loop {
            match peekable_cp.peek_char(0)? {
                Some('[') => indices.push(JsonPathPart::read_index(path_str, peekable_cp)?),
                Some('.') => {
                    peekable_cp.skip(1)?;
                    break;
                }
                None => break,
                Some(c) => bail!(JsonError::malformed_path(path_str, format!("unexpected '{}' after index", c))),
            }
        }

        if path_name.is_empty() && indices.is_empty() {
            bail!(JsonError::malformed_path(path_str, "empty segment"));
        }

        Ok(JsonPathPart { path_name, indices })
    }
}

impl fmt::Display for JsonPathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_name)?;
        for index in &self.indices {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

/// A parsed path. An empty part list addresses the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    pub parts: Vec<JsonPathPart>,
}

impl JsonPath {
    fn new(parts: Vec<JsonPathPart>) -> Self {
        JsonPath {
            parts
        }
    }

    pub fn parse(path_str: &str) -> Result<Self> {
        let trimmed = path_str.trim();
        let mut path_parts = Vec::new();
        if trimmed.is_empty() {
            return Ok(JsonPath::new(path_parts));
        }

        let mut peekable_cp = PeekableCodePoints::new(trimmed.as_bytes());
        loop {
            path_parts.push(JsonPathPart::read_part(path_str, &mut peekable_cp)?);
            if peekable_cp.peek_char(0)?.is_none() {
                break;
            }
        }

        // a trailing '.' leaves nothing to read after it
        if trimmed.ends_with('.') {
            bail!(JsonError::malformed_path(path_str, "empty segment"));
        }

        Ok(JsonPath::new(path_parts))
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = PathStep<'_>> {
        self.parts.iter().flat_map(|part| {
            let key = (!part.path_name.is_empty()).then(|| PathStep::Key(part.path_name.as_str()));
            key.into_iter().chain(part.indices.iter().map(|&i| PathStep::Index(i)))
        })
    }

    /// Walks `root` and returns the addressed node, or `None` at the first step
    /// that cannot be satisfied.
    pub fn resolve<'a>(&self, root: &'a JsonNode) -> Option<&'a JsonNode> {
        let mut current = root;
        for step in self.steps() {
            let next = match step {
                PathStep::Key(key) => current.get(key),
                PathStep::Index(index) => current.at(index),
            };
            current = match next {
                Some(node) => node,
                None => {
                    trace!("path '{}' stops at {:?} on {} node", self, step, current.type_name());
                    return None;
                }
            };
        }

        Some(current)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut JsonNode) -> Option<&'a mut JsonNode> {
        let mut current = root;
        for step in self.steps() {
            current = match step {
                PathStep::Key(key) => current.get_mut(key)?,
                PathStep::Index(index) => current.at_mut(index)?,
            };
        }

        Some(current)
    }

    /// Writes `value` at this path, creating missing containers on the way.
    ///
    /// A missing step becomes an object when it is reached by key and an array
    /// when it is reached by index. Arrays shorter than an index are padded with
    /// null, by at most `MAX_ARRAY_GROWTH` elements per write. Existing scalars
    /// in the way are never replaced; that is a type mismatch. Containers
    /// created before a failure stay in the tree.
    pub fn put(&self, root: &mut JsonNode, value: JsonNode) -> Result<()> {
        let mut current = root;
        for step in self.steps() {
            current = match step {
                PathStep::Key(key) => {
                    if current.is_null() {
                        debug!("path '{}': creating object for key '{}'", self, key);
                        *current = JsonNode::object();
                    }
                    match current {
                        JsonNode::Object(props) => {
                            let pos = match props.iter().position(|p| p.name == key) {
                                Some(pos) => pos,
                                None => {
                                    props.push(JsonObjProp::new(key, JsonNode::PlainNull));
                                    props.len() - 1
                                }
                            };
                            &mut props[pos].value
                        }
                        other => bail!(JsonError::type_mismatch("object", other.describe())),
                    }
                }
                PathStep::Index(index) => {
                    if current.is_null() {
                        debug!("path '{}': creating array for index {}", self, index);
                        *current = JsonNode::array();
                    }
                    match current {
                        JsonNode::Array(elements) => {
                            if elements.len() <= index {
                                let new_len = match index.checked_add(1) {
                                    Some(new_len) if new_len - elements.len() <= MAX_ARRAY_GROWTH => new_len,
                                    _ => bail!(JsonError::malformed_path(
                                        self.to_string(),
                                        format!("index {} is too far past the end of an array of length {}", index, elements.len()),
                                    )),
                                };
                                elements.resize(new_len, JsonNode::PlainNull);
                            }
                            &mut elements[index]
                        }
                        other => bail!(JsonError::type_mismatch("array", other.describe())),
                    }
                }
            };
        }

        *current = value;
        Ok(())
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
