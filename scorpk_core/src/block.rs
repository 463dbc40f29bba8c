//! Block scanner
//!
//! Captures the body of a brace-delimited construct by taking lines up to the
//! first closing delimiter written at the header's own indentation. Braces are
//! not counted: an inner construct is indented deeper, so its `}` is kept as
//! opaque body text and only scanned when the body is itself executed. The
//! captured body is dedented by its common indentation, which puts inner
//! headers and their delimiters back at a shared column for that later scan.

use crate::error::{Result, ScorpkError};

/// Plain closing delimiter
pub const CLOSE: &str = "}";

/// Closing delimiter of an if body that opens an else body on the same line
pub const CLOSE_ELSE: &str = "} else {";

/// Else header on the line after an if body's plain `}`
pub const ELSE: &str = "else {";

/// A captured block body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Body lines, dedented by their common indentation
    pub body: Vec<String>,
    /// Position just past the closing delimiter
    pub next: usize,
    /// The delimiter that closed the block
    pub closed_by: &'static str,
}

/// Leading whitespace of a line
pub fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Whether `line` is `text` written at exactly `indent`
pub fn is_at_indent(line: &str, indent: &str, text: &str) -> bool {
    line.trim_end()
        .strip_prefix(indent)
        .is_some_and(|rest| rest == text)
}

/// Whether `line` opens an else body for an if header written at `indent`
pub fn is_else_header(line: &str, indent: &str) -> bool {
    is_at_indent(line, indent, ELSE)
}

/// Scan from `start` (the line after `header`) up to a `}` at the header's indent
pub fn scan_block(lines: &[String], start: usize, header: &str) -> Result<Block> {
    scan_block_until(lines, start, header, &[CLOSE])
}

/// Scan from `start` up to the first of `delimiters` at the header's indent
///
/// Running off the end of input is an `IncompleteBlock`.
pub fn scan_block_until(
    lines: &[String],
    start: usize,
    header: &str,
    delimiters: &[&'static str],
) -> Result<Block> {
    let indent = indent_of(header);
    let mut body = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(start) {
        if let Some(delim) = delimiters.iter().find(|d| is_at_indent(line, indent, d)) {
            tracing::debug!("Captured {} body lines for `{}`", body.len(), header.trim());
            return Ok(Block {
                body: dedent(&body),
                next: i + 1,
                closed_by: *delim,
            });
        }
        body.push(line.clone());
    }
    Err(ScorpkError::IncompleteBlock(header.trim().to_string()))
}

/// Remove the indentation shared by every non-blank line
pub fn dedent(lines: &[String]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .reduce(|acc, ind| {
            let shared = acc
                .bytes()
                .zip(ind.bytes())
                .take_while(|(a, b)| a == b)
                .count();
            &acc[..shared]
        })
        .unwrap_or("");

    lines
        .iter()
        .map(|l| match l.strip_prefix(common) {
            Some(rest) => rest.to_string(),
            None => l.trim_start().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(String::from).collect()
    }

    #[test]
    fn test_scan_simple_body() {
        let src = lines("fn greet() {\n  print(\"hi\");\n}\ngreet();");
        let block = scan_block(&src, 1, &src[0]).unwrap();
        assert_eq!(block.body, vec!["print(\"hi\");".to_string()]);
        assert_eq!(block.next, 3);
        assert_eq!(block.closed_by, CLOSE);
    }

    #[test]
    fn test_indented_inner_close_is_opaque() {
        let src = lines("fn f() {\n    if x > 1 {\n        print(x);\n    }\n    print(\"after\");\n}");
        let block = scan_block(&src, 1, &src[0]).unwrap();
        assert_eq!(
            block.body,
            vec!["if x > 1 {", "    print(x);", "}", "print(\"after\");"]
        );
        assert_eq!(block.next, 6);
    }

    #[test]
    fn test_flat_nesting_stops_at_first_close() {
        let src = lines("fn f() {\nif x > 1 {\nprint(x);\n}\nprint(\"after\");\n}");
        let block = scan_block(&src, 1, &src[0]).unwrap();
        assert_eq!(block.body.len(), 2);
        assert_eq!(block.next, 4);
    }

    #[test]
    fn test_close_must_match_header_indent() {
        let src = lines("  fn f() {\n    print(1);\n}\n  }");
        let block = scan_block(&src, 1, &src[0]).unwrap();
        assert_eq!(block.next, 4);
        assert_eq!(block.body, vec!["    print(1);", "}"]);
    }

    #[test]
    fn test_trailing_whitespace_on_close() {
        let src = lines("fn f() {\nprint(1);\n}   ");
        assert_eq!(scan_block(&src, 1, &src[0]).unwrap().next, 3);
    }

    #[test]
    fn test_scan_else_delimiter() {
        let src = lines("if x > 1 {\nprint(1);\n} else {\nprint(2);\n}");
        let block = scan_block_until(&src, 1, &src[0], &[CLOSE, CLOSE_ELSE]).unwrap();
        assert_eq!(block.closed_by, CLOSE_ELSE);
        assert_eq!(block.next, 3);
    }

    #[test]
    fn test_else_header_needs_matching_indent() {
        assert!(is_else_header("else {  ", ""));
        assert!(is_else_header("  else {", "  "));
        assert!(!is_else_header("    else {", ""));
        assert!(!is_else_header("else", ""));
    }

    #[test]
    fn test_incomplete_block() {
        let src = lines("paralelo {\nprint(1);");
        let err = scan_block(&src, 1, &src[0]).unwrap_err();
        assert!(matches!(err, ScorpkError::IncompleteBlock(h) if h == "paralelo {"));
    }

    #[test]
    fn test_empty_body() {
        let src = lines("fn f() {\n}");
        let block = scan_block(&src, 1, &src[0]).unwrap();
        assert!(block.body.is_empty());
        assert_eq!(block.next, 2);
    }

    #[test]
    fn test_dedent_keeps_relative_indent() {
        let body = lines("    a\n\n      b\n    c");
        assert_eq!(dedent(&body), vec!["a", "", "  b", "c"]);
    }
}
