//! Parser for Natural Docs tooltip payload files.
//!
//! The generator emits one JavaScript call per file:
//!
//! ```text
//! NDSummary.OnToolTipsLoaded("SQFClass:Group",{173:"<div ...>...</div>",212:"..."});
//! ```
//!
//! This module parses that call shape into a namespace plus an id → fragment
//! map, decoding JavaScript string escapes along the way. It is a payload
//! reader, not a JS engine: anything other than a single
//! `<receiver>.OnToolTipsLoaded("...", {...});` call is rejected.
//!
//! Fragment content is not interpreted. Escapes are decoded so the stored
//! string is the exact HTML the browser-side script would receive; the HTML
//! itself stays opaque.

use std::collections::btree_map::Entry;

use thiserror::Error;

use crate::registry::{TooltipSet, TopicId};

/// Method name the generator uses for tooltip registration calls.
const TOOLTIP_METHOD: &str = "OnToolTipsLoaded";

/// One parsed payload file: a namespace and its tooltip entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipPayload {
    /// Class/group identifier scoping the ids, e.g. `"SQFClass:Group"`.
    pub namespace: String,
    /// Tooltip fragments keyed by topic id.
    pub entries: TooltipSet,
}

/// Payload parsing errors. Offsets are byte positions in the source text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("not an {TOOLTIP_METHOD} call")]
    NotToolTipCall,

    #[error("unexpected end of payload at byte {0}")]
    UnexpectedEnd(usize),

    #[error("expected {expected} at byte {offset}")]
    Expected { expected: &'static str, offset: usize },

    #[error("invalid escape sequence at byte {0}")]
    BadEscape(usize),

    #[error("invalid unicode escape at byte {0}")]
    BadUnicode(usize),

    #[error("topic id out of range at byte {0}")]
    IdOutOfRange(usize),

    #[error("duplicate topic id {id} in namespace `{namespace}`")]
    DuplicateId { namespace: String, id: TopicId },

    #[error("trailing content after call at byte {0}")]
    TrailingContent(usize),
}

/// Parse one payload file into namespace + entries.
///
/// Accepts any receiver (`NDSummary`, `NDContentPage`, ...) as long as the
/// called method is `OnToolTipsLoaded` with the two-argument shape. The
/// trailing `;` is optional; anything after it is an error.
///
/// Duplicate ids within the call are rejected: the generator guarantees
/// uniqueness per namespace, so a duplicate means a corrupt file.
pub fn parse_payload(source: &str) -> Result<TooltipPayload, PayloadError> {
    let mut scanner = Scanner::new(source);

    scanner.skip_whitespace();
    scanner.expect_tooltip_call()?;

    scanner.expect(b'(', "`(`")?;
    scanner.skip_whitespace();
    let namespace = scanner.parse_string()?;
    scanner.skip_whitespace();
    scanner.expect(b',', "`,`")?;
    scanner.skip_whitespace();

    let entries = scanner.parse_entries(&namespace)?;

    scanner.skip_whitespace();
    scanner.expect(b')', "`)`")?;
    scanner.skip_whitespace();
    scanner.eat(b';');
    scanner.skip_whitespace();

    if !scanner.at_end() {
        return Err(PayloadError::TrailingContent(scanner.pos));
    }

    Ok(TooltipPayload { namespace, entries })
}

/// Byte-offset cursor over the payload text.
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume `byte` if it is next. Returns whether it was consumed.
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), PayloadError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(PayloadError::Expected { expected, offset: self.pos }),
            None => Err(PayloadError::UnexpectedEnd(self.pos)),
        }
    }

    /// Consume `<receiver>.OnToolTipsLoaded` up to (not including) the `(`.
    ///
    /// The receiver may be any dotted identifier chain; only the final
    /// segment is checked.
    fn expect_tooltip_call(&mut self) -> Result<(), PayloadError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.')
        {
            self.pos += 1;
        }

        let callee = &self.source[start..self.pos];
        let method = callee.rsplit('.').next().unwrap_or(callee);
        if callee.is_empty() || method != TOOLTIP_METHOD {
            return Err(PayloadError::NotToolTipCall);
        }
        Ok(())
    }

    /// Parse the `{id:"fragment",...}` object literal.
    fn parse_entries(&mut self, namespace: &str) -> Result<TooltipSet, PayloadError> {
        self.expect(b'{', "`{`")?;

        let mut entries = TooltipSet::new();
        self.skip_whitespace();
        if self.eat(b'}') {
            return Ok(entries);
        }

        loop {
            self.skip_whitespace();
            let id = self.parse_id()?;
            self.skip_whitespace();
            self.expect(b':', "`:`")?;
            self.skip_whitespace();
            let fragment = self.parse_string()?;

            match entries.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(fragment);
                }
                Entry::Occupied(_) => {
                    return Err(PayloadError::DuplicateId {
                        namespace: namespace.to_string(),
                        id,
                    });
                }
            }

            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            self.expect(b'}', "`,` or `}`")?;
            return Ok(entries);
        }
    }

    /// Parse a decimal topic id.
    fn parse_id(&mut self) -> Result<TopicId, PayloadError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(_) => Err(PayloadError::Expected { expected: "topic id", offset: start }),
                None => Err(PayloadError::UnexpectedEnd(start)),
            };
        }
        self.source[start..self.pos]
            .parse()
            .map_err(|_| PayloadError::IdOutOfRange(start))
    }

    /// Parse a quoted JS string literal, decoding escapes.
    ///
    /// Natural Docs emits double-quoted strings; single quotes are accepted
    /// too since both are legal at the call site.
    fn parse_string(&mut self) -> Result<String, PayloadError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(PayloadError::Expected { expected: "string", offset: self.pos }),
            None => return Err(PayloadError::UnexpectedEnd(self.pos)),
        };
        self.pos += 1;

        let mut out = String::new();
        loop {
            let rest = &self.source[self.pos..];
            let Some(ch) = rest.chars().next() else {
                return Err(PayloadError::UnexpectedEnd(self.pos));
            };

            if ch == quote as char {
                self.pos += 1;
                return Ok(out);
            }
            if ch == '\\' {
                self.pos += 1;
                out.push(self.parse_escape()?);
                continue;
            }

            out.push(ch);
            self.pos += ch.len_utf8();
        }
    }

    /// Decode one escape sequence, cursor positioned after the backslash.
    fn parse_escape(&mut self) -> Result<char, PayloadError> {
        let offset = self.pos - 1;
        let Some(marker) = self.peek() else {
            return Err(PayloadError::UnexpectedEnd(self.pos));
        };
        self.pos += 1;

        let decoded = match marker {
            b'"' => '"',
            b'\'' => '\'',
            b'\\' => '\\',
            b'/' => '/',
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'v' => '\u{000B}',
            b'0' => '\0',
            b'x' => {
                let code = self.parse_hex(2, offset)?;
                char::from_u32(code).ok_or(PayloadError::BadUnicode(offset))?
            }
            b'u' => return self.parse_unicode_escape(offset),
            _ => return Err(PayloadError::BadEscape(offset)),
        };
        Ok(decoded)
    }

    /// Decode `\uXXXX`, combining UTF-16 surrogate pairs.
    fn parse_unicode_escape(&mut self, offset: usize) -> Result<char, PayloadError> {
        let code = self.parse_hex(4, offset)?;

        // High surrogate: a second \uXXXX low surrogate must follow
        if (0xD800..=0xDBFF).contains(&code) {
            if !(self.eat(b'\\') && self.eat(b'u')) {
                return Err(PayloadError::BadUnicode(offset));
            }
            let low = self.parse_hex(4, offset)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(PayloadError::BadUnicode(offset));
            }
            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).ok_or(PayloadError::BadUnicode(offset));
        }

        char::from_u32(code).ok_or(PayloadError::BadUnicode(offset))
    }

    /// Read exactly `digits` hex digits as a code point value.
    fn parse_hex(&mut self, digits: usize, offset: usize) -> Result<u32, PayloadError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let Some(b) = self.peek() else {
                return Err(PayloadError::UnexpectedEnd(self.pos));
            };
            let digit = (b as char).to_digit(16).ok_or(PayloadError::BadUnicode(offset))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_payload() {
        let payload = parse_payload(
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Group",{173:"<div>a</div>",212:"<div>b</div>"});"#,
        )
        .unwrap();

        assert_eq!(payload.namespace, "SQFClass:Group");
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[&173], "<div>a</div>");
        assert_eq!(payload.entries[&212], "<div>b</div>");
    }

    #[test]
    fn test_parse_original_excerpt() {
        // Verbatim prefix of the generator's output, including \" and \'
        let source = concat!(
            r#"NDSummary.OnToolTipsLoaded("SQFClass:Group",{"#,
            r#"173:"<div class=\"NDToolTip TEnumeration LSQF\"><div class=\"TTSummary\">Must include: Group\\Group.hpp</div></div>","#,
            r#"212:"<div class=\"NDToolTip TFunction LSQF\"><div class=\"TTSummary\">Adds an existing Unit to this group. You don\'t need to call it manually.</div></div>"});"#,
        );
        let payload = parse_payload(source).unwrap();

        assert_eq!(payload.namespace, "SQFClass:Group");
        assert_eq!(
            payload.entries[&173],
            r#"<div class="NDToolTip TEnumeration LSQF"><div class="TTSummary">Must include: Group\Group.hpp</div></div>"#
        );
        assert!(payload.entries[&212].contains("don't need to call it manually"));
    }

    #[test]
    fn test_entity_escaped_html_passes_through() {
        let payload = parse_payload(
            r#"NDSummary.OnToolTipsLoaded("N",{1:"Creates an &lt;AIGroup&gt; &quot;&quot;"});"#,
        )
        .unwrap();
        assert_eq!(payload.entries[&1], r#"Creates an &lt;AIGroup&gt; &quot;&quot;"#);
    }

    #[test]
    fn test_empty_entries_object() {
        let payload = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{});"#).unwrap();
        assert_eq!(payload.namespace, "N");
        assert!(payload.entries.is_empty());
    }

    #[test]
    fn test_ndcontentpage_receiver_accepted() {
        let payload =
            parse_payload(r#"NDContentPage.OnToolTipsLoaded("N",{1:"x"});"#).unwrap();
        assert_eq!(payload.entries[&1], "x");
    }

    #[test]
    fn test_whitespace_and_missing_semicolon_tolerated() {
        let payload = parse_payload(
            "NDSummary.OnToolTipsLoaded( \"N\" , {\n  1 : \"x\" ,\n  2 : \"y\"\n} )\n",
        )
        .unwrap();
        assert_eq!(payload.entries.len(), 2);
    }

    #[test]
    fn test_wrong_method_rejected() {
        let err = parse_payload(r#"NDSummary.OnSummaryLoaded("N",{});"#).unwrap_err();
        assert_eq!(err, PayloadError::NotToolTipCall);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err =
            parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"a",1:"b"});"#).unwrap_err();
        assert_eq!(err, PayloadError::DuplicateId { namespace: "N".into(), id: 1 });
    }

    #[test]
    fn test_trailing_content_rejected() {
        let err = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{}); garbage"#).unwrap_err();
        assert!(matches!(err, PayloadError::TrailingContent(_)));
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"never closed})"#).unwrap_err();
        assert!(matches!(err, PayloadError::UnexpectedEnd(_)));
    }

    #[test]
    fn test_bad_escape() {
        let err = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"bad \q"});"#).unwrap_err();
        assert!(matches!(err, PayloadError::BadEscape(_)));
    }

    #[test]
    fn test_unicode_escapes() {
        // \uXXXX and \xHH are literal escape sequences in the payload text
        let payload = parse_payload(
            r#"NDSummary.OnToolTipsLoaded("N",{1:"\u4f60\u597d \x41 \n"});"#,
        )
        .unwrap();
        assert_eq!(payload.entries[&1], "你好 A \n");
    }

    #[test]
    fn test_surrogate_pair() {
        let payload =
            parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"\ud83d\ude00"});"#).unwrap();
        assert_eq!(payload.entries[&1], "😀");
    }

    #[test]
    fn test_lone_high_surrogate_rejected() {
        let err = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"\ud83d oops"});"#)
            .unwrap_err();
        assert!(matches!(err, PayloadError::BadUnicode(_)));
    }

    #[test]
    fn test_id_out_of_range() {
        let err =
            parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{99999999999:"x"});"#).unwrap_err();
        assert!(matches!(err, PayloadError::IdOutOfRange(_)));
    }

    #[test]
    fn test_non_numeric_key_rejected() {
        let err = parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{a:"x"});"#).unwrap_err();
        assert_eq!(err, PayloadError::Expected { expected: "topic id", offset: 32 });
    }

    #[test]
    fn test_multibyte_content_preserved() {
        let payload =
            parse_payload(r#"NDSummary.OnToolTipsLoaded("N",{1:"описание 描述"});"#).unwrap();
        assert_eq!(payload.entries[&1], "описание 描述");
    }

    #[test]
    fn test_single_quoted_strings_accepted() {
        let payload = parse_payload(r#"NDSummary.OnToolTipsLoaded('N',{1:'a "b"'});"#).unwrap();
        assert_eq!(payload.namespace, "N");
        assert_eq!(payload.entries[&1], r#"a "b""#);
    }
}
