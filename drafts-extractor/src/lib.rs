//! `DraftImage` extraction for `drafts-extractor`.
//!
//! `extract(path, source)` parses a JSX source file and returns one
//! [`DraftImageRecord`] per `<DraftImage …>` opening or self-closing tag, in
//! document order. Attribute values are read by name; only literal values
//! are understood, anything else reads as absent.

use tree_sitter::{Node, Parser, Tree};

use drafts_core::types::{DraftImageId, DraftImageRecord};
use thiserror::Error;

/// Tag name that marks an image awaiting creation or review.
pub const DRAFT_IMAGE_TAG: &str = "DraftImage";

const ID_ATTR: &str = "id";
const URL_ATTR: &str = "originalUrl";
const COMMENT_ATTR: &str = "comment";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Value of a JSX attribute as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// `name="text"` or `name={<literal>}`.
    Literal(String),
    /// `name={<anything else>}`.
    Expression,
}

impl AttributeValue {
    pub fn into_literal(self) -> Option<String> {
        match self {
            AttributeValue::Literal(value) => Some(value),
            AttributeValue::Expression => None,
        }
    }
}

/// Errors from extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to load JSX grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("failed to parse {path} at line {line}, column {column}")]
    Parse {
        path: String,
        line: usize,
        column: usize,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reusable JSX parser.
pub struct Extractor {
    parser: Parser,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())?;
        Ok(Self { parser })
    }

    /// Extract every `DraftImage` element from `source`.
    ///
    /// `path` is only used for the document name and error messages. Source
    /// that does not parse cleanly is an error; there is no partial result.
    pub fn extract(
        &mut self,
        path: &str,
        source: &str,
    ) -> Result<Vec<DraftImageRecord>, ExtractError> {
        let tree = self.parse(path, source)?;
        let document = document_name(path);
        let mut records = Vec::new();

        for tag in opening_tags(tree.root_node()) {
            if tag_name(tag, source) != Some(DRAFT_IMAGE_TAG) {
                continue;
            }
            let read = |name: &str| {
                attribute(tag, name, source).and_then(AttributeValue::into_literal)
            };
            records.push(DraftImageRecord::new(
                read(ID_ATTR).map(DraftImageId::from),
                read(URL_ATTR),
                read(COMMENT_ATTR),
                document,
            ));
        }

        tracing::debug!("{}: {} draft image(s)", path, records.len());
        Ok(records)
    }

    fn parse(&mut self, path: &str, source: &str) -> Result<Tree, ExtractError> {
        let parse_error = |line, column| ExtractError::Parse {
            path: path.to_string(),
            line,
            column,
        };
        let tree = self.parser.parse(source, None).ok_or_else(|| parse_error(1, 1))?;
        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(parse_error(at.row + 1, at.column + 1));
        }
        Ok(tree)
    }
}

/// Extract with a one-off [`Extractor`].
pub fn extract(path: &str, source: &str) -> Result<Vec<DraftImageRecord>, ExtractError> {
    Extractor::new()?.extract(path, source)
}

/// Final `/`-separated segment of `path`, verbatim.
pub fn document_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Tree walking
// ---------------------------------------------------------------------------

/// Opening and self-closing JSX tags under `root`, pre-order.
fn opening_tags(root: Node<'_>) -> Vec<Node<'_>> {
    let mut tags = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if matches!(node.kind(), "jsx_opening_element" | "jsx_self_closing_element") {
            tags.push(node);
        }
        if cursor.goto_first_child() || cursor.goto_next_sibling() {
            continue;
        }
        loop {
            if !cursor.goto_parent() {
                return tags;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn tag_name<'s>(tag: Node<'_>, source: &'s str) -> Option<&'s str> {
    tag.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
}

/// Value of the attribute called `name`, or `None` when the tag has no such
/// attribute or it is a bare flag (`<X disabled />`).
fn attribute(tag: Node<'_>, name: &str, source: &str) -> Option<AttributeValue> {
    let mut cursor = tag.walk();
    let attr = tag
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "jsx_attribute")
        .find(|n| {
            n.named_child(0)
                .and_then(|id| id.utf8_text(source.as_bytes()).ok())
                == Some(name)
        })?;
    let value = attr.named_child(1)?;
    Some(attribute_value(value, source))
}

fn attribute_value(value: Node<'_>, source: &str) -> AttributeValue {
    match value.kind() {
        "string" => AttributeValue::Literal(strip_quotes(text(value, source)).to_string()),
        "jsx_expression" => {
            let mut cursor = value.walk();
            let inner = value
                .named_children(&mut cursor)
                .find(|n| n.kind() != "comment");
            match inner {
                Some(expr) => literal_expression(expr, source),
                None => AttributeValue::Expression,
            }
        }
        _ => AttributeValue::Expression,
    }
}

fn literal_expression(expr: Node<'_>, source: &str) -> AttributeValue {
    match expr.kind() {
        "string" => AttributeValue::Literal(unescape(strip_quotes(text(expr, source)))),
        "number" => AttributeValue::Literal(number_value(text(expr, source))),
        "true" | "false" => AttributeValue::Literal(text(expr, source).to_string()),
        _ => AttributeValue::Expression,
    }
}

/// Render a numeric literal the way JavaScript would print its value, so
/// `{0x10}` reads as `16` and `{1_000}` as `1000`.
///
/// Values outside `1e-6..1e21` print in exponent form in JavaScript; those
/// keep their source text, as does anything that fails to parse.
fn number_value(raw: &str) -> String {
    let cleaned = raw.replace('_', "");
    let digits = cleaned.strip_suffix('n').unwrap_or(&cleaned);

    let radix = match digits.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u128::from_str_radix(&digits[2..], radix)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| raw.to_string());
    }
    if cleaned.ends_with('n') {
        return digits.to_string();
    }

    match digits.parse::<f64>() {
        Ok(v) if v == 0.0 || (1e-6..1e21).contains(&v) => v.to_string(),
        _ => raw.to_string(),
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Decode JavaScript string-literal escapes.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation.
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex, "\\x");
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex, "\\u");
            }
            other => out.push(other),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str, prefix: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
