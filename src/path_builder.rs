//! Assembling path strings from segments, and removing indices from them.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static INDEX_NOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[0-9]+\]").unwrap());

/// One input to [`build_path`]: a key, an index, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Text(String),
    Number(i128),
    Missing,
}

impl PathSegment {
    fn render(&self) -> Option<Cow<'_, str>> {
        let text = match self {
            PathSegment::Text(s) => Cow::Borrowed(s.trim()),
            PathSegment::Number(n) => Cow::Owned(n.to_string()),
            PathSegment::Missing => return None,
        };

        (!text.is_empty()).then_some(text)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Text(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Text(s)
    }
}

impl From<&String> for PathSegment {
    fn from(s: &String) -> Self {
        PathSegment::Text(s.clone())
    }
}

macro_rules! segment_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PathSegment {
                fn from(n: $t) -> Self {
                    PathSegment::Number(n as i128)
                }
            }
        )*
    };
}

segment_from_number!(i32, i64, u32, u64, usize);

impl<T: Into<PathSegment>> From<Option<T>> for PathSegment {
    fn from(segment: Option<T>) -> Self {
        segment.map_or(PathSegment::Missing, Into::into)
    }
}

/// Joins segments into one path.
///
/// Segments are trimmed and blank or missing ones are skipped. A segment made of
/// digits only becomes an index `[n]` glued to what precedes it; anything else
/// is appended after a `.`. The result never starts with `.`.
///
/// ```
/// use pathjson::build_path;
///
/// assert_eq!(build_path(["a", "0", "b"]), "a[0].b");
/// ```
pub fn build_path<I>(segments: I) -> String
    where I: IntoIterator,
          I::Item: Into<PathSegment>
{
    let mut path = String::new();
    for segment in segments {
        let segment = segment.into();
        let text = match segment.render() {
            Some(text) => text,
            None => continue,
        };

        if INDEX_SEGMENT.is_match(&text) {
            path.push('[');
            path.push_str(&text);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&text);
        }
    }

    path
}

/// Removes every `[n]` from a path: `items[2].name` becomes `items.name`.
pub fn strip_indices(path: &str) -> String {
    INDEX_NOTATION.replace_all(path, "").into_owned()
}

/// Builds a path from mixed strings and integers.
///
/// ```
/// use pathjson::json_path;
///
/// let index = 2;
/// assert_eq!(json_path!("items", index, "name"), "items[2].name");
/// assert_eq!(json_path!(0, "id", None::<&str>), "[0].id");
/// ```
#[macro_export]
macro_rules! json_path {
    ($($segment:expr),* $(,)?) => {{
        let segments: ::std::vec::Vec<$crate::PathSegment> = vec![$($crate::PathSegment::from($segment)),*];
        $crate::build_path(segments)
    }};
}
