//! Byte-level edits of a raw JSON document.
//!
//! An edit replaces a single span of the raw text and never touches the bytes
//! around it. Escapes, whitespace and number text of untouched keys survive.
//! serde_json does the scanning: each value or key is read with a stream
//! deserializer, whose byte offset marks where it ends. Only the punctuation
//! between values is handled here.
//!
//! Every function expects a document that already parsed as valid JSON.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Deserializer, Value};

use super::path::array_index;

type EditResult<T> = std::result::Result<T, String>;

/// Byte range `start..end` of the raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

/// Replace `span` of the raw document with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    pub fn apply(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len() + self.text.len());
        out.push_str(&raw[..self.span.start]);
        out.push_str(&self.text);
        out.push_str(&raw[self.span.end..]);
        out
    }
}

/// One object member or array element. For arrays `start` equals
/// `value.start` and `key` is `None`.
#[derive(Debug)]
struct Member {
    key: Option<String>,
    start: usize,
    value: Span,
}

/// Edit that replaces the value at `segments` with `text`.
pub(crate) fn replace_value(raw: &str, segments: &[String], text: String) -> EditResult<Edit> {
    let span = locate(raw, segments)?.ok_or_else(|| missing(segments))?;
    Ok(Edit { span, text })
}

/// Edit that deletes the member or element at `segments`, together with one
/// neighbouring comma.
pub(crate) fn remove_member(raw: &str, segments: &[String]) -> EditResult<Edit> {
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| "cannot delete the document root".to_string())?;
    let parent = locate(raw, parents)?
        .filter(|span| matches!(raw.as_bytes()[span.start], b'{' | b'['))
        .ok_or_else(|| missing(segments))?;
    let members = members(raw, parent)?;
    let idx = position(raw, parent, &members, last).ok_or_else(|| missing(segments))?;

    let span = if members.len() == 1 {
        // Only member: empty the container, keeping its brackets.
        Span {
            start: parent.start + 1,
            end: parent.end - 1,
        }
    } else if idx > 0 {
        Span {
            start: members[idx - 1].value.end,
            end: members[idx].value.end,
        }
    } else {
        Span {
            start: members[0].start,
            end: members[1].start,
        }
    };

    Ok(Edit {
        span,
        text: String::new(),
    })
}

/// Edit that inserts `text` at `segments`, which must not exist yet.
///
/// Missing intermediate keys become objects, and a `null` on the way is
/// replaced by one. Arrays only grow by appending at index == length.
pub(crate) fn insert_member(raw: &str, segments: &[String], text: &str) -> EditResult<Edit> {
    let mut current = root(raw)?;

    for (depth, segment) in segments.iter().enumerate() {
        match child(raw, current, segment)? {
            Some(member) => current = member.value,
            None => return attach(raw, current, &segments[depth..], text, &segments[..depth]),
        }
    }
    Err(format!("key \"{}\" already exists", segments.join(".")))
}

fn attach(
    raw: &str,
    container: Span,
    rest: &[String],
    text: &str,
    parents: &[String],
) -> EditResult<Edit> {
    let Some((first, tail)) = rest.split_first() else {
        return Err("empty key path".to_string());
    };
    let entry = match raw.as_bytes()[container.start] {
        b'{' => format!("{}:{}", quote(first), nest(tail, text)),
        b'[' => match array_index(first) {
            Some(idx) => {
                let len = members(raw, container)?.len();
                if idx != len {
                    return Err(format!("array index {} out of range (length {})", idx, len));
                }
                nest(tail, text)
            }
            None => return Err(format!("\"{}\" is not an array index", first)),
        },
        b'n' => {
            return Ok(Edit {
                span: container,
                text: nest(rest, text),
            });
        }
        other => {
            let place = if parents.is_empty() {
                "the document root".to_string()
            } else {
                format!("\"{}\"", parents.join("."))
            };
            return Err(format!(
                "cannot set key \"{}\" inside {} at {}",
                first,
                scalar_kind(other),
                place
            ));
        }
    };

    let (at, text) = match members(raw, container)?.last() {
        Some(last) => (last.value.end, format!(",{}", entry)),
        None => (container.start + 1, entry),
    };
    Ok(Edit {
        span: Span { start: at, end: at },
        text,
    })
}

/// Wrap `text` in one object per segment, innermost last.
fn nest(segments: &[String], text: &str) -> String {
    segments
        .iter()
        .rev()
        .fold(text.to_string(), |inner, segment| {
            format!("{{{}:{}}}", quote(segment), inner)
        })
}

fn quote(key: &str) -> String {
    Value::String(key.to_string()).to_string()
}

fn missing(segments: &[String]) -> String {
    format!("key \"{}\" not found", segments.join("."))
}

fn scalar_kind(first_byte: u8) -> &'static str {
    match first_byte {
        b'"' => "a string",
        b't' | b'f' => "a boolean",
        _ => "a number",
    }
}

/// Span of the value at `segments`, or `None` when it does not exist.
fn locate(raw: &str, segments: &[String]) -> EditResult<Option<Span>> {
    let mut current = root(raw)?;
    for segment in segments {
        match child(raw, current, segment)? {
            Some(member) => current = member.value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn root(raw: &str) -> EditResult<Span> {
    let start = skip_whitespace(raw, 0);
    let (_, end) = scan::<IgnoredAny>(raw, start)?;
    Ok(Span { start, end })
}

/// The member named by `segment` inside `parent`. Duplicate object keys
/// resolve to the last occurrence, as when parsing.
fn child(raw: &str, parent: Span, segment: &str) -> EditResult<Option<Member>> {
    if !matches!(raw.as_bytes()[parent.start], b'{' | b'[') {
        return Ok(None);
    }
    let mut members = members(raw, parent)?;
    Ok(position(raw, parent, &members, segment).map(|idx| members.swap_remove(idx)))
}

fn position(raw: &str, parent: Span, members: &[Member], segment: &str) -> Option<usize> {
    match raw.as_bytes()[parent.start] {
        b'{' => members
            .iter()
            .rposition(|m| m.key.as_deref() == Some(segment)),
        b'[' => array_index(segment).filter(|idx| *idx < members.len()),
        _ => None,
    }
}

/// Members of the object or array spanning `container`.
fn members(raw: &str, container: Span) -> EditResult<Vec<Member>> {
    let bytes = raw.as_bytes();
    let is_object = bytes[container.start] == b'{';
    let close = container.end - 1;
    let mut out = Vec::new();

    let mut pos = skip_whitespace(raw, container.start + 1);
    if pos == close {
        return Ok(out);
    }

    loop {
        let start = pos;
        let key = if is_object {
            let (key, after) = scan::<String>(raw, pos)?;
            pos = expect(raw, skip_whitespace(raw, after), b':')?;
            pos = skip_whitespace(raw, pos);
            Some(key)
        } else {
            None
        };

        let (_, end) = scan::<IgnoredAny>(raw, pos)?;
        out.push(Member {
            key,
            start,
            value: Span { start: pos, end },
        });

        pos = skip_whitespace(raw, end);
        if pos == close {
            return Ok(out);
        }
        pos = skip_whitespace(raw, expect(raw, pos, b',')?);
    }
}

/// Read one JSON value starting exactly at `start`; returns it and the
/// offset just past it.
fn scan<T: DeserializeOwned>(raw: &str, start: usize) -> EditResult<(T, usize)> {
    let mut stream = Deserializer::from_str(&raw[start..]).into_iter::<T>();
    match stream.next() {
        Some(Ok(value)) => Ok((value, start + stream.byte_offset())),
        Some(Err(e)) => Err(e.to_string()),
        None => Err(format!("unexpected end of document at byte {}", start)),
    }
}

fn expect(raw: &str, pos: usize, byte: u8) -> EditResult<usize> {
    if raw.as_bytes().get(pos) == Some(&byte) {
        Ok(pos + 1)
    } else {
        Err(format!("expected '{}' at byte {}", byte as char, pos))
    }
}

fn skip_whitespace(raw: &str, mut pos: usize) -> usize {
    let bytes = raw.as_bytes();
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}
