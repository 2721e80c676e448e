use std::fmt;
use std::io::Read;

use anyhow::{
    Result,
    bail,
};
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{GenerateConfig, ParseConfig};
use crate::error::JsonError;
use crate::json_tag::*;

#[derive(Debug, Clone, PartialEq)]
pub struct JsonObjProp {
    pub name: String,
    pub value: JsonNode,
}

impl JsonObjProp {
    pub fn new(name: impl Into<String>, value: impl Into<JsonNode>) -> Self {
        JsonObjProp {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An in-memory JSON tree.
///
/// Numbers keep their literal text; conversion to a Rust number happens in the
/// `as_*` accessors, so nothing is lost between parsing and writing back.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    PlainNull,
    PlainString(String),
    PlainNumber(String),
    PlainBoolean(bool),
    Array(Vec<JsonNode>),
    Object(Vec<JsonObjProp>),
}

impl Default for JsonNode {
    fn default() -> Self {
        JsonNode::PlainNull
    }
}

/// Cursor over the positioned tags of one document.
struct NodeParser<'a> {
    json_tags: &'a [PositionedTag],
    i: usize,
    depth: usize,
    config: &'a ParseConfig,
}

impl<'a> NodeParser<'a> {
    fn error_at(&self, i: usize, message: impl Into<String>) -> anyhow::Error {
        let (line, column) = self.json_tags
            .get(i)
            .or_else(|| self.json_tags.last())
            .map(|(_, pos)| *pos)
            .unwrap_or((1, 1));
        JsonError::syntax(line, column, message).into()
    }

    fn peek(&self) -> Option<&'a JsonTag> {
        self.json_tags.get(self.i).map(|(tag, _)| tag)
    }

    fn next(&mut self) -> Result<&'a JsonTag> {
        match self.json_tags.get(self.i) {
            None => Err(self.error_at(self.i, "unexpected end of input")),
            Some((tag, _)) => {
                self.i += 1;
                Ok(tag)
            }
        }
    }

    fn expect(&mut self, expected: &JsonTag, what: &str) -> Result<()> {
        let i = self.i;
        let tag = self.next()?;
        if tag != expected {
            return Err(self.error_at(i, format!("expected {}, found {}", what, describe_tag(tag))));
        }

        Ok(())
    }

    /// Runs one container parse one level deeper, refusing to go past `max_depth`.
    fn nested(&mut self, i: usize, parse: fn(&mut Self) -> Result<JsonNode>) -> Result<JsonNode> {
        if self.depth >= self.config.max_depth {
            return Err(self.error_at(i, "nesting too deep"));
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn parse_node(&mut self) -> Result<JsonNode> {
        let i = self.i;
        match self.next()? {
            JsonTag::LeftCurly => self.nested(i, Self::parse_object),
            JsonTag::LeftSquare => self.nested(i, Self::parse_array),
            JsonTag::Str(s) => Ok(JsonNode::PlainString(s.clone())),
            JsonTag::Literal(literal) => self.parse_plain(i, literal),
            tag => Err(self.error_at(i, format!("expected a value, found {}", describe_tag(tag)))),
        }
    }

    fn parse_plain(&self, i: usize, plain_literal: &str) -> Result<JsonNode> {
        match plain_literal {
            "null" => Ok(JsonNode::PlainNull),
            "true" => Ok(JsonNode::PlainBoolean(true)),
            "false" => Ok(JsonNode::PlainBoolean(false)),
            s if is_json_number(s) => Ok(JsonNode::PlainNumber(self.normalize_number(s))),
            s => Err(self.error_at(i, format!("invalid literal '{}'", s))),
        }
    }

    fn normalize_number(&self, literal: &str) -> String {
        let is_integer = !literal.contains(['.', 'e', 'E']);
        if self.config.exact_numbers || is_integer {
            return literal.to_string();
        }

        match literal.parse::<f64>() {
            Ok(f) if f.is_finite() => format!("{:?}", f),
            _ => literal.to_string(),
        }
    }

    fn parse_array(&mut self) -> Result<JsonNode> {
        let mut elements = Vec::new();
        if self.peek() == Some(&JsonTag::RightSquare) {
            self.i += 1;
            return Ok(JsonNode::Array(elements));
        }

        loop {
            elements.push(self.parse_node()?);

            let i = self.i;
            match self.next()? {
                JsonTag::Comma => continue,
                JsonTag::RightSquare => break,
                tag => return Err(self.error_at(i, format!("expected ',' or ']', found {}", describe_tag(tag)))),
            }
        }

        Ok(JsonNode::Array(elements))
    }

    fn parse_object(&mut self) -> Result<JsonNode> {
        let mut props: Vec<JsonObjProp> = Vec::new();
        if self.peek() == Some(&JsonTag::RightCurly) {
            self.i += 1;
            return Ok(JsonNode::Object(props));
        }

        loop {
            let i = self.i;
            let name = match self.next()? {
                JsonTag::Str(name) => name.clone(),
                tag => return Err(self.error_at(i, format!("expected a property name, found {}", describe_tag(tag)))),
            };
            self.expect(&JsonTag::Colon, "':'")?;
            let value = self.parse_node()?;

            // last duplicate wins, first position is kept
            match props.iter_mut().find(|p| p.name == name) {
                Some(prop) => prop.value = value,
                None => props.push(JsonObjProp { name, value }),
            }

            let i = self.i;
            match self.next()? {
                JsonTag::Comma => continue,
                JsonTag::RightCurly => break,
                tag => return Err(self.error_at(i, format!("expected ',' or '}}', found {}", describe_tag(tag)))),
            }
        }

        if !self.config.preserve_field_order {
            props.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(JsonNode::Object(props))
    }
}

fn describe_tag(tag: &JsonTag) -> String {
    match tag {
        JsonTag::LeftCurly => String::from("'{'"),
        JsonTag::RightCurly => String::from("'}'"),
        JsonTag::LeftSquare => String::from("'['"),
        JsonTag::RightSquare => String::from("']'"),
        JsonTag::Colon => String::from("':'"),
        JsonTag::Comma => String::from("','"),
        JsonTag::Str(s) => format!("string \"{}\"", s),
        JsonTag::Literal(s) => format!("'{}'", s),
    }
}

static JSON_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap()
});

fn is_json_number(s: &str) -> bool {
    JSON_NUMBER.is_match(s)
}

fn parse_integral(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }

    // integral values written as floats, e.g. 7.0 or 1e3
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

impl JsonNode {
    pub fn parse_str(json: &str) -> Result<JsonNode> {
        JsonNode::parse_with_config(json, &ParseConfig::default())
    }

    pub fn parse_with_config(json: &str, config: &ParseConfig) -> Result<JsonNode> {
        JsonNode::parse_reader(json.as_bytes(), config)
    }

    pub fn parse_reader<R>(reader: R, config: &ParseConfig) -> Result<JsonNode>
        where R: Read
    {
        let json_tags = JsonTag::parse_with_positions(reader)?;
        JsonNode::from_tags(&json_tags, config)
    }

    /// Builds exactly one document from the given tags.
    pub fn from_tags(json_tags: &[PositionedTag], config: &ParseConfig) -> Result<JsonNode> {
        debug!("building json tree from {} tags with {:?}", json_tags.len(), config);

        let mut parser = NodeParser { json_tags, i: 0, depth: 0, config };
        let node = parser.parse_node()?;
        if parser.i < json_tags.len() {
            let (tag, _) = &json_tags[parser.i];
            return Err(parser.error_at(parser.i, format!("unexpected {} after document end", describe_tag(tag))));
        }

        Ok(node)
    }

    /// Parses text whose root must be an object.
    pub fn parse_object_str(json: &str) -> Result<JsonNode> {
        let node = JsonNode::parse_str(json)?;
        if !node.is_object() {
            bail!(JsonError::type_mismatch("object", node.describe()));
        }

        Ok(node)
    }

    /// Parses text whose root must be an array.
    pub fn parse_array_str(json: &str) -> Result<JsonNode> {
        let node = JsonNode::parse_str(json)?;
        if !node.is_array() {
            bail!(JsonError::type_mismatch("array", node.describe()));
        }

        Ok(node)
    }

    pub fn object() -> Self {
        JsonNode::Object(Vec::new())
    }

    pub fn array() -> Self {
        JsonNode::Array(Vec::new())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsonNode::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, JsonNode::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, JsonNode::PlainString(_) | JsonNode::PlainNumber(_) | JsonNode::PlainBoolean(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonNode::PlainNull)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            JsonNode::PlainNull => "null",
            JsonNode::PlainString(_) => "string",
            JsonNode::PlainNumber(_) => "number",
            JsonNode::PlainBoolean(_) => "boolean",
            JsonNode::Array(_) => "array",
            JsonNode::Object(_) => "object",
        }
    }

    /// Short description used in type mismatch errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            JsonNode::PlainString(s) => format!("string \"{}\"", s),
            JsonNode::PlainNumber(n) => format!("number {}", n),
            JsonNode::PlainBoolean(b) => format!("boolean {}", b),
            other => other.type_name().to_string(),
        }
    }

    /// Child of an object node; `None` for a missing key or a non-object node.
    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        match self {
            JsonNode::Object(props) => props.iter().find(|p| p.name == key).map(|p| &p.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonNode> {
        match self {
            JsonNode::Object(props) => props.iter_mut().find(|p| p.name == key).map(|p| &mut p.value),
            _ => None,
        }
    }

    /// Element of an array node; `None` when out of bounds or for a non-array node.
    pub fn at(&self, index: usize) -> Option<&JsonNode> {
        match self {
            JsonNode::Array(elements) => elements.get(index),
            _ => None,
        }
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut JsonNode> {
        match self {
            JsonNode::Array(elements) => elements.get_mut(index),
            _ => None,
        }
    }

    /// Number of elements or properties; 0 for scalars and null.
    pub fn len(&self) -> usize {
        match self {
            JsonNode::Array(elements) => elements.len(),
            JsonNode::Object(props) => props.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assigns `value` under `key`, keeping the position of an existing key.
    /// Returns the replaced value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonNode>) -> Result<Option<JsonNode>> {
        let key = key.into();
        let value = value.into();
        match self {
            JsonNode::Object(props) => match props.iter_mut().find(|p| p.name == key) {
                Some(prop) => Ok(Some(std::mem::replace(&mut prop.value, value))),
                None => {
                    props.push(JsonObjProp { name: key, value });
                    Ok(None)
                }
            },
            other => bail!(JsonError::type_mismatch("object", other.describe())),
        }
    }

    pub fn push(&mut self, value: impl Into<JsonNode>) -> Result<()> {
        match self {
            JsonNode::Array(elements) => {
                elements.push(value.into());
                Ok(())
            }
            other => bail!(JsonError::type_mismatch("array", other.describe())),
        }
    }

    pub fn as_object(&self) -> Result<&[JsonObjProp]> {
        match self {
            JsonNode::Object(props) => Ok(props),
            other => bail!(JsonError::type_mismatch("object", other.describe())),
        }
    }

    pub fn as_array(&self) -> Result<&[JsonNode]> {
        match self {
            JsonNode::Array(elements) => Ok(elements),
            other => bail!(JsonError::type_mismatch("array", other.describe())),
        }
    }

    pub fn into_map(self) -> Result<IndexMap<String, JsonNode>> {
        match self {
            JsonNode::Object(props) => Ok(props.into_iter().map(|p| (p.name, p.value)).collect()),
            other => bail!(JsonError::type_mismatch("object", other.describe())),
        }
    }

    pub fn into_vec(self) -> Result<Vec<JsonNode>> {
        match self {
            JsonNode::Array(elements) => Ok(elements),
            other => bail!(JsonError::type_mismatch("array", other.describe())),
        }
    }

    /// Text of a string, number or boolean node.
    pub fn as_string(&self) -> Result<String> {
        match self {
            JsonNode::PlainString(s) => Ok(s.clone()),
            JsonNode::PlainNumber(n) => Ok(n.clone()),
            JsonNode::PlainBoolean(b) => Ok(b.to_string()),
            other => bail!(JsonError::type_mismatch("string", other.describe())),
        }
    }

    /// Integer value of a number node or of a string holding an integer.
    pub fn as_i64(&self) -> Result<i64> {
        let parsed = match self {
            JsonNode::PlainNumber(text) | JsonNode::PlainString(text) => parse_integral(text),
            _ => None,
        };

        match parsed {
            Some(n) => Ok(n),
            None => bail!(JsonError::type_mismatch("integer", self.describe())),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        let n = self.as_i64()?;
        match i32::try_from(n) {
            Ok(n) => Ok(n),
            Err(_) => bail!(JsonError::type_mismatch("32-bit integer", self.describe())),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        let parsed = match self {
            JsonNode::PlainNumber(text) | JsonNode::PlainString(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(f) => Ok(f),
            None => bail!(JsonError::type_mismatch("floating point number", self.describe())),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        let parsed = match self {
            JsonNode::PlainNumber(text) | JsonNode::PlainString(text) => text.trim().parse::<f32>().ok(),
            _ => None,
        };

        match parsed {
            Some(f) => Ok(f),
            None => bail!(JsonError::type_mismatch("floating point number", self.describe())),
        }
    }

    /// Boolean value of a boolean node or of a string spelling `true`/`false` (any case).
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            JsonNode::PlainBoolean(b) => Ok(*b),
            JsonNode::PlainString(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            JsonNode::PlainString(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => bail!(JsonError::type_mismatch("boolean", other.describe())),
        }
    }

    pub fn to_json_string(&self, config: &GenerateConfig) -> String {
        let mut out = String::new();
        self.write_json(&mut out, config);
        out
    }

    fn write_json(&self, out: &mut String, config: &GenerateConfig) {
        let mut pending = vec![WriteItem::Value(self, 0)];
        while let Some(item) = pending.pop() {
            match item {
                WriteItem::Value(node, depth) => match node {
                    JsonNode::PlainNull => out.push_str("null"),
                    JsonNode::PlainString(s) => write_escaped(out, s),
                    JsonNode::PlainNumber(n) => out.push_str(n),
                    JsonNode::PlainBoolean(b) => out.push_str(if *b { "true" } else { "false" }),
                    JsonNode::Array(elements) if elements.is_empty() => out.push_str("[]"),
                    JsonNode::Object(props) if props.is_empty() => out.push_str("{}"),
                    JsonNode::Array(elements) => {
                        out.push('[');
                        pending.push(WriteItem::Close(']', depth));
                        for (i, element) in elements.iter().enumerate().rev() {
                            pending.push(WriteItem::Value(element, depth + 1));
                            pending.push(WriteItem::Lead(i > 0, depth + 1));
                        }
                    }
                    JsonNode::Object(props) => {
                        out.push('{');
                        pending.push(WriteItem::Close('}', depth));
                        for (i, prop) in props.iter().enumerate().rev() {
                            pending.push(WriteItem::Value(&prop.value, depth + 1));
                            pending.push(WriteItem::Name(&prop.name));
                            pending.push(WriteItem::Lead(i > 0, depth + 1));
                        }
                    }
                },
                WriteItem::Lead(comma, depth) => {
                    if comma {
                        out.push(',');
                    }
                    write_newline(out, config, depth);
                }
                WriteItem::Name(name) => {
                    write_escaped(out, name);
                    out.push(':');
                    if config.pretty {
                        out.push(' ');
                    }
                }
                WriteItem::Close(bracket, depth) => {
                    write_newline(out, config, depth);
                    out.push(bracket);
                }
            }
        }
    }
}

/// Pending serializer work, popped in output order.
enum WriteItem<'a> {
    Value(&'a JsonNode, usize),
    /// Separator and line break before a member, `true` when a comma is needed.
    Lead(bool, usize),
    Name(&'a str),
    Close(char, usize),
}

fn write_newline(out: &mut String, config: &GenerateConfig, depth: usize) {
    if config.pretty {
        out.push('\n');
        out.extend(std::iter::repeat(' ').take(config.indent * depth));
    }
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl fmt::Display for JsonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string(&GenerateConfig::default()))
    }
}

impl From<&str> for JsonNode {
    fn from(s: &str) -> Self {
        JsonNode::PlainString(s.to_string())
    }
}

impl From<String> for JsonNode {
    fn from(s: String) -> Self {
        JsonNode::PlainString(s)
    }
}

impl From<bool> for JsonNode {
    fn from(b: bool) -> Self {
        JsonNode::PlainBoolean(b)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for JsonNode {
                fn from(n: $t) -> Self {
                    JsonNode::PlainNumber(n.to_string())
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for JsonNode {
    fn from(f: f64) -> Self {
        if f.is_finite() {
            JsonNode::PlainNumber(format!("{:?}", f))
        } else {
            JsonNode::PlainNull
        }
    }
}

impl From<f32> for JsonNode {
    fn from(f: f32) -> Self {
        if f.is_finite() {
            JsonNode::PlainNumber(format!("{:?}", f))
        } else {
            JsonNode::PlainNull
        }
    }
}

impl From<Vec<JsonNode>> for JsonNode {
    fn from(elements: Vec<JsonNode>) -> Self {
        JsonNode::Array(elements)
    }
}

impl<T: Into<JsonNode>> From<Option<T>> for JsonNode {
    fn from(value: Option<T>) -> Self {
        value.map_or(JsonNode::PlainNull, Into::into)
    }
}

#[cfg(test)]
mod json_node_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn syntax_position(err: &anyhow::Error) -> Option<(usize, usize)> {
        match err.downcast_ref::<JsonError>() {
            Some(JsonError::Syntax { line, column, .. }) => Some((*line, *column)),
            _ => None,
        }
    }

    #[test]
    fn test_parse_nested() -> Result<()> {
        let node = JsonNode::parse_str(r#"{"simple": 123, "array": ["a", true, null], "object": {"prop": "{true]"}}"#)?;
        assert_eq!(
            node,
            JsonNode::Object(vec![
                JsonObjProp::new("simple", 123),
                JsonObjProp::new("array", vec![JsonNode::from("a"), JsonNode::from(true), JsonNode::PlainNull]),
                JsonObjProp::new("object", JsonNode::Object(vec![JsonObjProp::new("prop", "{true]")])),
            ])
        );
        Ok(())
    }

    #[test]
    fn test_parse_scalar_root() -> Result<()> {
        assert_eq!(JsonNode::parse_str(" \"x\" ")?, JsonNode::from("x"));
        assert_eq!(JsonNode::parse_str("-0.5e2")?, JsonNode::PlainNumber(String::from("-50.0")));
        Ok(())
    }

    #[test]
    fn test_exact_numbers_keep_literal() -> Result<()> {
        let config = ParseConfig::default().with_exact_numbers(true);
        let node = JsonNode::parse_with_config("[0.10000000000000000001, 1E3]", &config)?;
        assert_eq!(node.to_string(), "[0.10000000000000000001,1E3]");

        let node = JsonNode::parse_str("[0.10000000000000000001, 1E3]")?;
        assert_eq!(node.to_string(), "[0.1,1000.0]");
        Ok(())
    }

    #[test]
    fn test_field_order() -> Result<()> {
        let json = r#"{"b": 1, "a": 2, "c": 3}"#;
        assert_eq!(JsonNode::parse_str(json)?.to_string(), r#"{"b":1,"a":2,"c":3}"#);

        let config = ParseConfig::default().with_preserve_field_order(false);
        assert_eq!(JsonNode::parse_with_config(json, &config)?.to_string(), r#"{"a":2,"b":1,"c":3}"#);
        Ok(())
    }

    #[test]
    fn test_duplicate_key_last_wins() -> Result<()> {
        let node = JsonNode::parse_str(r#"{"a": 1, "b": 2, "a": 3}"#)?;
        assert_eq!(node.to_string(), r#"{"a":3,"b":2}"#);
        Ok(())
    }

    #[rstest]
    #[case("{\"a\": 1,}", (1, 9))]
    #[case("{\"a\" 1}", (1, 6))]
    #[case("[1, 2", (1, 5))]
    #[case("[01]", (1, 2))]
    #[case("{\"a\": tru}", (1, 7))]
    #[case("[1] [2]", (1, 5))]
    fn test_syntax_errors(#[case] json: &str, #[case] position: (usize, usize)) {
        let err = JsonNode::parse_str(json).unwrap_err();
        assert_eq!(syntax_position(&err), Some(position), "{}", err);
    }

    #[test]
    fn test_root_shape_checks() -> Result<()> {
        assert!(JsonNode::parse_object_str("{}")?.is_object());
        assert!(JsonNode::parse_array_str("[]")?.is_array());

        let err = JsonNode::parse_object_str("[1]").unwrap_err();
        assert_eq!(err.downcast_ref::<JsonError>(), Some(&JsonError::type_mismatch("object", "array")));
        Ok(())
    }

    #[rstest]
    #[case(JsonNode::from(7), 7)]
    #[case(JsonNode::from("7"), 7)]
    #[case(JsonNode::from(" -12 "), -12)]
    #[case(JsonNode::PlainNumber(String::from("3.0")), 3)]
    fn test_as_i64(#[case] node: JsonNode, #[case] expected: i64) -> Result<()> {
        assert_eq!(node.as_i64()?, expected);
        Ok(())
    }

    #[rstest]
    #[case(JsonNode::from("x"))]
    #[case(JsonNode::PlainNumber(String::from("7.5")))]
    #[case(JsonNode::from(true))]
    #[case(JsonNode::PlainNull)]
    #[case(JsonNode::array())]
    fn test_as_i64_mismatch(#[case] node: JsonNode) {
        let err = node.as_i64().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JsonError>(),
            Some(JsonError::TypeMismatch { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_as_i32_overflow() {
        let err = JsonNode::from(5_000_000_000i64).as_i32().unwrap_err();
        assert!(matches!(err.downcast_ref::<JsonError>(), Some(JsonError::TypeMismatch { .. })));
    }

    #[test]
    fn test_scalar_coercions() -> Result<()> {
        assert_eq!(JsonNode::from(1.5).as_f64()?, 1.5);
        assert_eq!(JsonNode::from("2.25").as_f32()?, 2.25f32);
        assert_eq!(JsonNode::from("TRUE").as_bool()?, true);
        assert_eq!(JsonNode::from(false).as_bool()?, false);
        assert_eq!(JsonNode::from(42).as_string()?, "42");
        assert_eq!(JsonNode::from(true).as_string()?, "true");

        let err = JsonNode::from("yes").as_bool().unwrap_err();
        assert_eq!(err.to_string(), r#"type mismatch: expected boolean, found string "yes""#);
        assert!(JsonNode::object().as_string().is_err());
        Ok(())
    }

    #[test]
    fn test_set_and_push() -> Result<()> {
        let mut node = JsonNode::parse_str(r#"{"a": 1, "b": 2}"#)?;
        assert_eq!(node.set("a", 10)?, Some(JsonNode::from(1)));
        assert_eq!(node.set("c", "x")?, None);
        assert_eq!(node.to_string(), r#"{"a":10,"b":2,"c":"x"}"#);

        let mut list = JsonNode::array();
        list.push(1)?;
        list.push(JsonNode::PlainNull)?;
        assert_eq!(list.len(), 2);
        assert!(list.set("k", 1).is_err());
        assert!(node.push(1).is_err());
        Ok(())
    }

    #[test]
    fn test_views() -> Result<()> {
        let node = JsonNode::parse_str(r#"{"z": [1, 2], "a": {}}"#)?;
        assert_eq!(node.get("z").map(JsonNode::len), Some(2));
        assert_eq!(node.get("z").and_then(|z| z.at(1)), Some(&JsonNode::from(2)));
        assert_eq!(node.get("z").and_then(|z| z.at(2)), None);
        assert_eq!(node.at(0), None);

        let map = node.clone().into_map()?;
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(map["z"].clone().into_vec()?, vec![JsonNode::from(1), JsonNode::from(2)]);
        assert!(node.as_array().is_err());
        Ok(())
    }

    #[test]
    fn test_pretty_output() -> Result<()> {
        let node = JsonNode::parse_str(r#"{"name": "a\"b", "list": [1, {}], "empty": []}"#)?;
        let expected = "{\n  \"name\": \"a\\\"b\",\n  \"list\": [\n    1,\n    {}\n  ],\n  \"empty\": []\n}";
        assert_eq!(node.to_json_string(&GenerateConfig::pretty()), expected);
        assert_eq!(JsonNode::parse_str(expected)?, node);
        Ok(())
    }

    #[test]
    fn test_option_and_float_conversions() {
        assert_eq!(JsonNode::from(None::<i32>), JsonNode::PlainNull);
        assert_eq!(JsonNode::from(Some("x")), JsonNode::from("x"));
        assert_eq!(JsonNode::from(f64::NAN), JsonNode::PlainNull);
        assert_eq!(JsonNode::from(2.0).to_string(), "2.0");
    }

    #[test]
    fn test_small_integer_and_f32_conversions() -> Result<()> {
        assert_eq!(JsonNode::from(7u8), JsonNode::PlainNumber(String::from("7")));
        assert_eq!(JsonNode::from(-3i8).to_string(), "-3");
        assert_eq!(JsonNode::from(300i16).as_i32()?, 300);
        assert_eq!(JsonNode::from(65535u16).to_string(), "65535");
        assert_eq!(JsonNode::from(0.1f32).to_string(), "0.1");
        assert_eq!(JsonNode::from(1.5f32).as_f32()?, 1.5);
        assert_eq!(JsonNode::from(f32::INFINITY), JsonNode::PlainNull);
        Ok(())
    }

    #[rstest]
    #[case("1")]
    #[case("-0")]
    #[case("10.25")]
    #[case("-1.5e+10")]
    #[case("2E-3")]
    fn test_number_literals(#[case] literal: &str) -> Result<()> {
        let node = JsonNode::parse_with_config(literal, &ParseConfig::default().with_exact_numbers(true))?;
        assert_eq!(node, JsonNode::PlainNumber(String::from(literal)));
        Ok(())
    }

    #[rstest]
    #[case("1.")]
    #[case(".5")]
    #[case("+1")]
    #[case("1e")]
    #[case("0x10")]
    #[case("1.5.2")]
    fn test_invalid_number_literals(#[case] literal: &str) {
        let err = JsonNode::parse_str(literal).unwrap_err();
        assert_eq!(syntax_position(&err), Some((1, 1)));
    }

    #[test]
    fn test_non_ascii_whitespace_is_not_a_separator() {
        let err = JsonNode::parse_str("[1,\u{a0}2]").unwrap_err();
        assert_eq!(syntax_position(&err), Some((1, 4)));
    }

    #[test]
    fn test_nesting_limit() -> Result<()> {
        let deep = "[".repeat(200_000);
        let err = JsonNode::parse_str(&deep).unwrap_err();
        assert_eq!(err.downcast_ref::<JsonError>(), Some(&JsonError::syntax(1, 129, "nesting too deep")));

        let shallow = ParseConfig::default().with_max_depth(2);
        assert_eq!(JsonNode::parse_with_config("[[1]]", &shallow)?.to_string(), "[[1]]");
        assert_eq!(JsonNode::parse_with_config(r#"{"a":[]}"#, &shallow)?.to_string(), r#"{"a":[]}"#);
        let err = JsonNode::parse_with_config("[[[1]]]", &shallow).unwrap_err();
        assert_eq!(err.downcast_ref::<JsonError>(), Some(&JsonError::syntax(1, 3, "nesting too deep")));
        Ok(())
    }

    #[test]
    fn test_deep_tree_serializes_and_reparses_with_raised_limit() -> Result<()> {
        let levels = 300;
        let mut node = JsonNode::from(1);
        for i in 0..levels {
            node = if i % 2 == 0 {
                JsonNode::from(vec![node])
            } else {
                let mut object = JsonNode::object();
                object.set("k", node)?;
                object
            };
        }

        let text = node.to_string();
        assert!(text.starts_with(r#"{"k":[{"k":["#));
        assert!(JsonNode::parse_str(&text).is_err());

        let reparsed = JsonNode::parse_with_config(&text, &ParseConfig::default().with_max_depth(levels))?;
        assert_eq!(reparsed, node);
        Ok(())
    }
}
