//! This library provides:
//! - JsonTag: A low-level JSON tag tokenizer which reads JSON tags from an instance which implements trait std::io::Read
//! - JsonNode: A plain JSON tree, parsed with an explicit `ParseConfig` and written back with a `GenerateConfig`
//! - JsonPath: Dotted/bracketed paths such as `a.b[0].c[2][1]` for reading and writing nested values
//! - build_path / json_path!: Assembling such paths from keys and indices
//!
//! Note: this is not JSONPath. There are no wildcards, filters, slices or recursive descent.
//!
//! ```
//! use pathjson::{JsonNode, json_path};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut root = JsonNode::parse_str(r#"{"a": {"b": [10, 20, {"c": 30}]}}"#)?;
//! assert_eq!(root.get_int_by_path(&json_path!("a", "b", 2, "c"))?, Some(30));
//! assert_eq!(root.get_int_by_path("a.b[5]")?, None);
//! assert!(root.get_array_by_path("a.b[5]")?.is_empty());
//!
//! root.put_by_path("x.y[1]", true)?;
//! assert_eq!(root.to_string(), r#"{"a":{"b":[10,20,{"c":30}]},"x":{"y":[null,true]}}"#);
//! # Ok(())
//! # }
//! ```

mod peekable_codepoints;
mod json_tag;
mod json_node;
mod json_path;
mod path_access;
mod path_builder;
mod config;
mod error;

pub use crate::json_tag::{JsonTag, PositionedTag};
pub use crate::json_node::{JsonNode, JsonObjProp};
pub use crate::json_path::{JsonPath, JsonPathPart, PathStep};
pub use crate::path_access::resolve;
pub use crate::path_builder::{PathSegment, build_path, strip_indices};
pub use crate::config::{GenerateConfig, ParseConfig};
pub use crate::error::JsonError;
