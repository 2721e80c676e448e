use std::io::{
    Read,
};
use anyhow::{
    Result,
};

use crate::error::JsonError;
use crate::peekable_codepoints::*;

/// Lexical unit of JSON text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum JsonTag {
    LeftCurly,
    RightCurly,
    LeftSquare,
    RightSquare,
    Colon,
    Comma,
    /// A quoted string with escapes already decoded.
    Str(String),
    /// A bare token: number, `true`, `false` or `null` (validated by the node parser).
    Literal(String),
}

/// Insignificant whitespace between tokens: space, tab, line feed, carriage return.
fn is_json_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// A tag and the 1-based line/column where it starts.
pub type PositionedTag = (JsonTag, (usize, usize));

impl JsonTag {
    fn syntax_error(pos: (usize, usize), message: impl Into<String>) -> anyhow::Error {
        JsonError::syntax(pos.0, pos.1, message).into()
    }

    fn read_hex4<R>(peekable_cp: &mut PeekableCodePoints<R>) -> Result<u32>
        where R: Read
    {
        let pos = peekable_cp.position();
        let hex = peekable_cp.pop(4)?;
        if hex.chars().count() != 4 {
            return Err(JsonTag::syntax_error(pos, "truncated \\u escape"));
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(JsonTag::syntax_error(pos, format!("invalid \\u escape '{}'", hex)));
        }

        u32::from_str_radix(&hex, 16)
            .map_err(|_| JsonTag::syntax_error(pos, format!("invalid \\u escape '{}'", hex)))
    }

    fn read_unicode_escape<R>(peekable_cp: &mut PeekableCodePoints<R>) -> Result<char>
        where R: Read
    {
        let pos = peekable_cp.position();
        let high = JsonTag::read_hex4(peekable_cp)?;
        let code =
            if (0xD800..0xDC00).contains(&high) {
                if peekable_cp.peek_char(0)? != Some('\\') || peekable_cp.peek_char(1)? != Some('u') {
                    return Err(JsonTag::syntax_error(pos, "unpaired surrogate in \\u escape"));
                }
                peekable_cp.skip(2)?;

                let low = JsonTag::read_hex4(peekable_cp)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(JsonTag::syntax_error(pos, "unpaired surrogate in \\u escape"));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                high
            };

        char::from_u32(code)
            .ok_or_else(|| JsonTag::syntax_error(pos, format!("invalid code point {:#x}", code)))
    }

    fn read_string<R>(peekable_cp: &mut PeekableCodePoints<R>) -> Result<String>
        where R: Read
    {
        let start = peekable_cp.position();
        // opening quote
        peekable_cp.skip(1)?;

        let mut s = String::new();
        loop {
            let pos = peekable_cp.position();
            match peekable_cp.next_char()? {
                None => return Err(JsonTag::syntax_error(start, "unterminated string")),
                Some('"') => break,
                Some('\\') => {
                    let escaped = match peekable_cp.next_char()? {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => JsonTag::read_unicode_escape(peekable_cp)?,
                        Some(c) => return Err(JsonTag::syntax_error(pos, format!("invalid escape '\\{}'", c))),
                        None => return Err(JsonTag::syntax_error(start, "unterminated string")),
                    };
                    s.push(escaped);
                }
                Some(c) if c.is_control() && (c as u32) < 0x20 => {
                    return Err(JsonTag::syntax_error(pos, "control character in string"));
                }
                Some(c) => s.push(c),
            }
        }

        Ok(s)
    }

    fn read_literal<R>(peekable_cp: &mut PeekableCodePoints<R>) -> Result<String>
        where R: Read
    {
        let mut end = 0;
        while let Some(c) = peekable_cp.peek_char(end)? {
            match c {
                c if is_json_whitespace(c) => break,
                '{' | '}' | '[' | ']' | ',' | ':' | '"' => break,
                _ => end += 1,
            }
        }

        peekable_cp.pop(end)
    }

    pub fn read_json_tag<R>(peekable_cp: &mut PeekableCodePoints<R>) -> Result<Option<PositionedTag>>
        where R: Read
    {
        loop {
            let pos = peekable_cp.position();
            let json_tag = match peekable_cp.peek_char(0)? {
                None => return Ok(None),
                Some(c) if is_json_whitespace(c) => {
                    peekable_cp.skip(1)?;
                    continue;
                }
                Some('{') => JsonTag::LeftCurly,
                Some('}') => JsonTag::RightCurly,
                Some('[') => JsonTag::LeftSquare,
                Some(']') => JsonTag::RightSquare,
                Some(',') => JsonTag::Comma,
                Some(':') => JsonTag::Colon,
                Some('"') => return Ok(Some((JsonTag::Str(JsonTag::read_string(peekable_cp)?), pos))),
                Some(_) => return Ok(Some((JsonTag::Literal(JsonTag::read_literal(peekable_cp)?), pos))),
            };

            peekable_cp.skip(1)?;
            return Ok(Some((json_tag, pos)));
        }
    }

    pub fn parse_with_positions<R>(reader: R) -> Result<Vec<PositionedTag>>
        where R: Read
    {
        let mut json_tag_list = Vec::new();
        let mut peekable_cp = PeekableCodePoints::new(reader);
        while let Some(json_tag) = JsonTag::read_json_tag(&mut peekable_cp)? {
            json_tag_list.push(json_tag);
        }

        Ok(json_tag_list)
    }

    pub fn parse<R>(reader: R) -> Result<Vec<JsonTag>>
        where R: Read
    {
        let json_tag_list = JsonTag::parse_with_positions(reader)?
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();

        Ok(json_tag_list)
    }
}

#[cfg(test)]
mod json_tag_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> JsonTag {
        JsonTag::Str(String::from(v))
    }

    fn lit(v: &str) -> JsonTag {
        JsonTag::Literal(String::from(v))
    }

    #[test]
    fn test_one_line() -> Result<()> {
        let json = r#"{"simple": 123, "array": ["a", "b", "c\""], "object": {"prop": "{true]"}}"#;
        let json_tag_list = JsonTag::parse(json.as_bytes())?;
        assert_eq!(
            json_tag_list,
            vec![
                // {
                JsonTag::LeftCurly,

                // "simple": 123
                s("simple"), JsonTag::Colon, lit("123"),

                // ,
                JsonTag::Comma,

                // "array": ["a", "b", "c\""]
                s("array"),
                JsonTag::Colon,
                JsonTag::LeftSquare,
                s("a"), JsonTag::Comma, s("b"), JsonTag::Comma, s("c\""),
                JsonTag::RightSquare,

                // ,
                JsonTag::Comma,

                // "object": {"prop": "{true]"}
                s("object"),
                JsonTag::Colon,
                JsonTag::LeftCurly,
                s("prop"), JsonTag::Colon, s("{true]"),
                JsonTag::RightCurly,

                // }
                JsonTag::RightCurly,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_multi_line_positions() -> Result<()> {
        let json = "{\n  \"flag\": true,\n  \"none\": null\n}";
        let json_tag_list = JsonTag::parse_with_positions(json.as_bytes())?;
        assert_eq!(
            json_tag_list,
            vec![
                (JsonTag::LeftCurly, (1, 1)),
                (s("flag"), (2, 3)),
                (JsonTag::Colon, (2, 9)),
                (lit("true"), (2, 11)),
                (JsonTag::Comma, (2, 15)),
                (s("none"), (3, 3)),
                (JsonTag::Colon, (3, 9)),
                (lit("null"), (3, 11)),
                (JsonTag::RightCurly, (4, 1)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_escapes() -> Result<()> {
        let json = r#"["tab\there", "\u00e9\ud83d\ude00", "a\/b\\"]"#;
        let json_tag_list = JsonTag::parse(json.as_bytes())?;
        assert_eq!(
            json_tag_list,
            vec![
                JsonTag::LeftSquare,
                s("tab\there"), JsonTag::Comma,
                s("é😀"), JsonTag::Comma,
                s("a/b\\"),
                JsonTag::RightSquare,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unterminated_string() {
        let err = JsonTag::parse("{\"obj".as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JsonError>(),
            Some(JsonError::Syntax { line: 1, column: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_escape() {
        let err = JsonTag::parse(r#""\q""#.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "syntax error at 1:2: invalid escape '\\q'");
    }

    #[test]
    fn test_unicode_escape_requires_hex_digits() {
        for json in [r#""\u+041""#, r#""\u-041""#, r#""\u 41A""#] {
            let err = JsonTag::parse(json.as_bytes()).unwrap_err();
            assert!(matches!(err.downcast_ref::<JsonError>(), Some(JsonError::Syntax { .. })), "{}", json);
            assert!(err.to_string().contains("invalid \\u escape"), "{}", err);
        }
    }

    #[test]
    fn test_only_ascii_whitespace_separates_tags() -> Result<()> {
        let json_tag_list = JsonTag::parse("[1,\u{a0}2,\u{2003}3]".as_bytes())?;
        assert_eq!(
            json_tag_list,
            vec![
                JsonTag::LeftSquare,
                lit("1"), JsonTag::Comma,
                lit("\u{a0}2"), JsonTag::Comma,
                lit("\u{2003}3"),
                JsonTag::RightSquare,
            ]
        );

        let json_tag_list = JsonTag::parse(" \t[\r\n1 ]".as_bytes())?;
        assert_eq!(json_tag_list, vec![JsonTag::LeftSquare, lit("1"), JsonTag::RightSquare]);
        Ok(())
    }
}
