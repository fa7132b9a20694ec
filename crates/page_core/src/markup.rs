//! Lenient HTML fragment parser and serializer.
//!
//! Covers what server-rendered pages and icon snippets need: nested elements,
//! quoted and bare attributes, void and self-closing tags, comments, doctype,
//! raw-text `script`/`style` bodies and the common character references.
//! Stray closing tags are ignored and unclosed elements close at end of input,
//! the way browsers recover.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unterminated attribute value at byte {offset}")]
    UnterminatedAttribute { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn finish(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attrs: self.attrs,
            children: self.children,
        }
    }
}

struct StartTag {
    tag: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

pub fn parse_fragment(input: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut roots = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(MarkupError::UnterminatedComment { offset: pos })?;
            pos += end + 3;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or(MarkupError::UnterminatedTag { offset: pos })?;
            pos += end + 1;
            continue;
        }

        if rest.starts_with("</") {
            let end = rest
                .find('>')
                .ok_or(MarkupError::UnterminatedTag { offset: pos })?;
            let name = rest[2..end].trim().to_ascii_lowercase();
            close_element(&mut stack, &mut roots, &name);
            pos += end + 1;
            continue;
        }

        if starts_tag(rest) {
            let (start, consumed) = parse_start_tag(rest, pos)?;
            pos += consumed;

            if start.self_closing || is_void_element(&start.tag) {
                push_node(
                    &mut stack,
                    &mut roots,
                    MarkupNode::Element {
                        tag: start.tag,
                        attrs: start.attrs,
                        children: Vec::new(),
                    },
                );
            } else if is_raw_text_element(&start.tag) {
                let body = &input[pos..];
                let close = format!("</{}", start.tag);
                let end = body
                    .to_ascii_lowercase()
                    .find(&close)
                    .ok_or(MarkupError::UnterminatedTag { offset: pos })?;
                let after_close = body[end..]
                    .find('>')
                    .ok_or(MarkupError::UnterminatedTag { offset: pos + end })?;
                let children = if end == 0 {
                    Vec::new()
                } else {
                    vec![MarkupNode::Text(body[..end].to_string())]
                };
                push_node(
                    &mut stack,
                    &mut roots,
                    MarkupNode::Element {
                        tag: start.tag,
                        attrs: start.attrs,
                        children,
                    },
                );
                pos += end + after_close + 1;
            } else {
                stack.push(OpenElement {
                    tag: start.tag,
                    attrs: start.attrs,
                    children: Vec::new(),
                });
            }
            continue;
        }

        let first = rest.chars().next().map_or(1, char::len_utf8);
        let text_len = rest[first..]
            .find('<')
            .map_or(rest.len(), |idx| idx + first);
        push_node(
            &mut stack,
            &mut roots,
            MarkupNode::Text(decode_entities(&rest[..text_len])),
        );
        pos += text_len;
    }

    while let Some(open) = stack.pop() {
        let node = open.finish();
        push_node(&mut stack, &mut roots, node);
    }

    Ok(roots)
}

fn starts_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn close_element(stack: &mut Vec<OpenElement>, roots: &mut Vec<MarkupNode>, name: &str) {
    if !stack.iter().any(|open| open.tag == name) {
        return;
    }
    while let Some(open) = stack.pop() {
        let matched = open.tag == name;
        let node = open.finish();
        push_node(stack, roots, node);
        if matched {
            break;
        }
    }
}

fn parse_start_tag(rest: &str, offset: usize) -> Result<(StartTag, usize), MarkupError> {
    let bytes = rest.as_bytes();
    let len = bytes.len();
    let unterminated = MarkupError::UnterminatedTag { offset };

    let mut i = 1;
    while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'/' | b'>') {
        i += 1;
    }
    let tag = rest[1..i].to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            return Err(unterminated);
        }
        match bytes[i] {
            b'>' => {
                return Ok((
                    StartTag {
                        tag,
                        attrs,
                        self_closing: false,
                    },
                    i + 1,
                ))
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Ok((
                    StartTag {
                        tag,
                        attrs,
                        self_closing: true,
                    },
                    i + 2,
                ))
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = rest[name_start..i].to_ascii_lowercase();

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= len {
                return Err(unterminated);
            }
            match bytes[i] {
                quote @ (b'"' | b'\'') => {
                    let start = i + 1;
                    let end = rest[start..].find(quote as char).ok_or(
                        MarkupError::UnterminatedAttribute {
                            offset: offset + start,
                        },
                    )? + start;
                    i = end + 1;
                    decode_entities(&rest[start..end])
                }
                _ => {
                    let start = i;
                    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    decode_entities(&rest[start..i])
                }
            }
        } else {
            String::new()
        };

        if !name.is_empty() && !attrs.iter().any(|(existing, _)| *existing == name) {
            attrs.push((name, value));
        }
    }
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&candidate[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/markup_tests.rs"]
mod tests;
