//! Maps pointers back to positions in the source text.
//!
//! The parsed tree carries no spans, so positions are recovered by walking the
//! text by indentation: mapping keys at the child column, sequence items by
//! their `- ` markers. This covers YAML block style and pretty-printed JSON.
//! Anything else (flow collections, minified JSON) degrades to the deepest
//! ancestor that could be found.

use crate::pointer::JsonPointer;
use serde_json::Value;

/// A position in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number (1-indexed).
    pub line: usize,
    /// Byte offset of the located key or item.
    pub offset: usize,
    /// Length of the located key in bytes (0 for items and the root).
    pub length: usize,
}

impl SourcePosition {
    fn root() -> Self {
        Self {
            line: 1,
            offset: 0,
            length: 0,
        }
    }
}

struct Line<'s> {
    start: usize,
    indent: usize,
    dashed: bool,
    key_col: usize,
    key_text: &'s str,
    text: &'s str,
}

impl<'s> Line<'s> {
    fn parse(start: usize, raw: &'s str) -> Self {
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let text = raw[indent..].trim_end();
        let mut key_text = text;
        let mut key_col = indent;
        while let Some(rest) = key_text.strip_prefix("- ") {
            let trimmed = rest.trim_start_matches(' ');
            key_col += key_text.len() - trimmed.len();
            key_text = trimmed;
        }
        Self {
            start,
            indent,
            dashed: text == "-" || text.starts_with("- "),
            key_col,
            key_text,
            text,
        }
    }

    fn is_content(&self) -> bool {
        !self.text.is_empty() && !self.text.starts_with('#')
    }

    fn closes(&self) -> bool {
        self.text.starts_with('}') || self.text.starts_with(']')
    }
}

/// Cursor into the text: the line of the current node, the column of its
/// content, and whether that line itself may hold the node's first key.
struct Cursor {
    line: usize,
    col: usize,
    inline: bool,
}

/// Finds the source position of the node addressed by `pointer`.
///
/// Returns the deepest ancestor's position when the node cannot be located.
#[must_use]
pub fn locate(source: &str, root: &Value, pointer: &JsonPointer) -> SourcePosition {
    let lines = split_lines(source);
    let mut best = SourcePosition::root();
    let mut node = root;
    let mut cursor: Option<Cursor> = None;

    for token in pointer.tokens() {
        let found = match node {
            Value::Object(map) => {
                let Some(child) = map.get(token) else { break };
                node = child;
                find_key(&lines, cursor.as_ref(), token)
            }
            Value::Array(items) => {
                let Some((index, child)) = token
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).map(|c| (i, c)))
                else {
                    break;
                };
                node = child;
                cursor.as_ref().and_then(|c| find_item(&lines, c, index))
            }
            _ => None,
        };
        let Some((next, position)) = found else { break };
        best = position;
        cursor = Some(next);
    }

    best
}

fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut start = 0;
    source
        .split('\n')
        .map(|raw| {
            let line = Line::parse(start, raw.strip_suffix('\r').unwrap_or(raw));
            start += raw.len() + 1;
            line
        })
        .collect()
}

fn first_child(lines: &[Line<'_>], after: usize) -> Option<usize> {
    (after + 1..lines.len()).find(|&i| lines[i].is_content())
}

fn find_key(
    lines: &[Line<'_>],
    cursor: Option<&Cursor>,
    token: &str,
) -> Option<(Cursor, SourcePosition)> {
    let (start, child_col) = match cursor {
        None => {
            let first = (0..lines.len()).find(|&i| lines[i].is_content())?;
            // A top-level JSON object opens with `{` on its own line.
            if lines[first].text == "{" {
                let child = first_child(lines, first)?;
                (child, lines[child].indent)
            } else {
                (first, lines[first].key_col)
            }
        }
        Some(c) if c.inline => (c.line, c.col),
        Some(c) => {
            let child = first_child(lines, c.line)?;
            if lines[child].indent <= c.col {
                return None;
            }
            (child, lines[child].indent)
        }
    };

    for (i, line) in lines.iter().enumerate().skip(start) {
        if !line.is_content() {
            continue;
        }
        let on_item_line = i == start && line.key_col == child_col;
        if !on_item_line && line.indent < child_col {
            break;
        }
        let at_column = on_item_line || (line.indent == child_col && !line.dashed);
        if at_column && starts_with_key(line.key_text, token) {
            let quoted = usize::from(line.key_text.starts_with(['"', '\'']));
            let position = SourcePosition {
                line: i + 1,
                offset: line.start + line.key_col + quoted,
                length: token.len(),
            };
            let cursor = Cursor {
                line: i,
                col: line.key_col,
                inline: false,
            };
            return Some((cursor, position));
        }
    }
    None
}

fn find_item(
    lines: &[Line<'_>],
    cursor: &Cursor,
    index: usize,
) -> Option<(Cursor, SourcePosition)> {
    if cursor.inline {
        return None;
    }
    let first = first_child(lines, cursor.line)?;
    let head = &lines[first];
    if head.indent < cursor.col || (head.indent == cursor.col && !head.dashed) {
        return None;
    }
    let item_col = head.indent;
    let dashed = head.dashed;

    let mut seen = 0;
    for (i, line) in lines.iter().enumerate().skip(first) {
        if !line.is_content() {
            continue;
        }
        if line.indent < item_col || (line.indent == item_col && dashed && !line.dashed) {
            break;
        }
        if line.indent != item_col || line.closes() {
            continue;
        }
        if seen == index {
            let position = SourcePosition {
                line: i + 1,
                offset: line.start + line.indent,
                length: 0,
            };
            let cursor = if dashed {
                Cursor {
                    line: i,
                    col: line.key_col,
                    inline: true,
                }
            } else {
                Cursor {
                    line: i,
                    col: line.indent,
                    inline: false,
                }
            };
            return Some((cursor, position));
        }
        seen += 1;
    }
    None
}

fn starts_with_key(text: &str, token: &str) -> bool {
    let rest = ['"', '\'']
        .iter()
        .find_map(|q| {
            text.strip_prefix(*q)
                .and_then(|t| t.strip_prefix(token))
                .and_then(|t| t.strip_prefix(*q))
        })
        .or_else(|| text.strip_prefix(token));

    rest.map(str::trim_start)
        .and_then(|r| r.strip_prefix(':'))
        .is_some_and(|r| r.is_empty() || r.starts_with([' ', '\t']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::parse_tree;

    fn line_of(source: &str, pointer: &str) -> usize {
        let root = parse_tree(source).unwrap();
        locate(source, &root, &JsonPointer::parse(pointer).unwrap()).line
    }

    const YAML: &str = "\
openapi: 3.0.1
info:
  title: Pets
paths:
  /pets:
    get:
      security:
      - oauth2:
        - pets.read
      responses:
        '200':
          description: ok
        666:
          description: odd
  /things:
    post:
      responses:
        '201':
          description: created
";

    #[test]
    fn root_is_line_one() {
        assert_eq!(line_of(YAML, ""), 1);
    }

    #[test]
    fn locates_nested_yaml_keys() {
        assert_eq!(line_of(YAML, "/paths"), 4);
        assert_eq!(line_of(YAML, "/paths/~1pets/get"), 6);
        assert_eq!(line_of(YAML, "/paths/~1pets/get/responses/200"), 11);
        assert_eq!(line_of(YAML, "/paths/~1pets/get/responses/666"), 13);
        assert_eq!(line_of(YAML, "/paths/~1things/post/responses/201"), 18);
    }

    #[test]
    fn locates_sequence_items_at_parent_column() {
        assert_eq!(line_of(YAML, "/paths/~1pets/get/security"), 7);
        assert_eq!(line_of(YAML, "/paths/~1pets/get/security/0"), 8);
        assert_eq!(line_of(YAML, "/paths/~1pets/get/security/0/oauth2"), 8);
        assert_eq!(line_of(YAML, "/paths/~1pets/get/security/0/oauth2/0"), 9);
    }

    #[test]
    fn missing_node_falls_back_to_ancestor() {
        assert_eq!(line_of(YAML, "/paths/~1pets/delete"), 5);
    }

    #[test]
    fn locates_pretty_json() {
        let json = r#"{
  "swagger": "2.0",
  "paths": {
    "/things": {
      "get": {
        "security": [
          {
            "oauth2": ["a"]
          }
        ]
      }
    }
  }
}"#;
        assert_eq!(line_of(json, "/paths/~1things/get"), 5);
        assert_eq!(line_of(json, "/paths/~1things/get/security/0"), 7);
        assert_eq!(line_of(json, "/paths/~1things/get/security/0/oauth2"), 8);
    }

    #[test]
    fn offset_points_at_key() {
        let source = "paths:\n  /x:\n    get: {}\n";
        let root = parse_tree(source).unwrap();
        let pos = locate(source, &root, &JsonPointer::parse("/paths/~1x/get").unwrap());
        assert_eq!(&source[pos.offset..pos.offset + pos.length], "get");
    }
}
