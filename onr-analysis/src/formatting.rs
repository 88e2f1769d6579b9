//! Indentation-stable document formatting.
//!
//! Pure text-to-text: compact lines are first exploded so that every `{`,
//! statement and `}` sits on its own logical line, then indentation is
//! recomputed from brace depth. Braces inside strings or after a `#`/`//`
//! comment never count. Formatting is idempotent and preserves the presence
//! or absence of the final newline.

/// Indentation configuration. `tab_size` is clamped to 1..=16 and falls back
/// to 2 when out of range; it is ignored when `insert_spaces` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
        }
    }
}

/// Formats a document with stable indentation rules.
pub fn format_document(text: &str, opts: FormatOptions) -> String {
    if text.is_empty() {
        return String::new();
    }

    let indent_unit = indent_unit_from_options(opts);
    let has_trailing_newline = text.ends_with('\n');
    let mut lines: Vec<&str> = text.split('\n').collect();
    if has_trailing_newline && lines.last() == Some(&"") {
        lines.pop();
    }

    let expanded = expand_compact_lines(&lines);
    let mut out = Vec::with_capacity(expanded.len());
    let mut indent: usize = 0;
    for raw in &expanded {
        let line = raw.trim_end_matches([' ', '\t', '\r']);
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() {
            out.push(String::new());
            continue;
        }

        let leading_closers = count_leading_closers(trimmed);
        let line_indent = indent.saturating_sub(leading_closers);
        out.push(format!("{}{}", indent_unit.repeat(line_indent), trimmed));

        let (opens, closes) = count_braces_outside_string_and_comment(trimmed);
        indent = (indent + opens).saturating_sub(closes);
    }

    // A whitespace-only final line must not grow into a trailing newline.
    if !has_trailing_newline {
        while out.last().map(|line| line.is_empty()).unwrap_or(false) {
            out.pop();
        }
    }

    let mut result = out.join("\n");
    if has_trailing_newline {
        result.push('\n');
    }
    result
}

fn expand_compact_lines(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        let parts = split_compact_line(line);
        if parts.is_empty() {
            out.push(line.trim().to_string());
            continue;
        }
        out.extend(parts);
    }
    out
}

/// Splits one source line at statement and block boundaries, leaving string
/// and comment contents untouched. A trailing same-line comment stays glued
/// to the part it follows.
fn split_compact_line(line: &str) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }

    let bytes = line.as_bytes();
    let mut parts = Vec::new();
    let mut seg_start = 0usize;
    let mut in_string = false;
    let mut i = 0usize;

    while i < bytes.len() {
        let ch = bytes[i];

        if in_string {
            if ch == b'\\' && i + 1 < bytes.len() {
                i += 2;
                continue;
            }
            if ch == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if ch == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        if ch == b'#' || (ch == b'/' && bytes.get(i + 1) == Some(&b'/')) {
            let comment = line[i..].trim();
            let base = line[seg_start..i].trim();
            if base.is_empty() {
                parts.push(comment.to_string());
            } else {
                parts.push(format!("{base} {comment}"));
            }
            return parts;
        }

        match ch {
            b'{' => {
                let base = line[seg_start..i].trim();
                if base.is_empty() {
                    parts.push("{".to_string());
                } else {
                    parts.push(format!("{base} {{"));
                }
                seg_start = i + 1;
                i += 1;
            }
            b';' => {
                let base = line[seg_start..i].trim();
                if !base.is_empty() {
                    let stmt = format!("{base};");
                    let comment = trailing_line_comment(line, i + 1);
                    if !comment.is_empty() {
                        parts.push(format!("{stmt} {comment}"));
                        return parts;
                    }
                    parts.push(stmt);
                }
                seg_start = i + 1;
                i += 1;
            }
            b'}' => {
                let base = line[seg_start..i].trim();
                if !base.is_empty() {
                    parts.push(base.to_string());
                }
                let comment = trailing_line_comment(line, i + 1);
                if !comment.is_empty() {
                    parts.push(format!("}} {comment}"));
                    return parts;
                }
                parts.push("}".to_string());
                seg_start = i + 1;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    let tail = line[seg_start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }
    parts
}

/// The comment starting at or after `from`, provided only whitespace precedes
/// it on the rest of the line.
fn trailing_line_comment(line: &str, from: usize) -> &str {
    let bytes = line.as_bytes();
    if from >= bytes.len() {
        return "";
    }
    let mut i = from;
    while i < bytes.len() {
        let ch = bytes[i];
        if ch == b' ' || ch == b'\t' || ch == b'\r' {
            i += 1;
            continue;
        }
        if ch == b'#' || (ch == b'/' && bytes.get(i + 1) == Some(&b'/')) {
            return line[i..].trim();
        }
        return "";
    }
    ""
}

fn indent_unit_from_options(opts: FormatOptions) -> String {
    if !opts.insert_spaces {
        return "\t".to_string();
    }
    let n = if opts.tab_size == 0 || opts.tab_size > 16 {
        2
    } else {
        opts.tab_size
    };
    " ".repeat(n as usize)
}

fn count_leading_closers(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b'}').count()
}

/// Counts `{` and `}` outside strings and comments on one line.
pub fn count_braces_outside_string_and_comment(line: &str) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut opens = 0;
    let mut closes = 0;
    let mut in_string = false;
    let mut i = 0usize;
    while i < bytes.len() {
        let ch = bytes[i];
        if in_string {
            if ch == b'\\' && i + 1 < bytes.len() {
                i += 2;
                continue;
            }
            if ch == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match ch {
            b'"' => in_string = true,
            b'#' => break,
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'{' => opens += 1,
            b'}' => closes += 1,
            _ => {}
        }
        i += 1;
    }
    (opens, closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str) -> String {
        format_document(text, FormatOptions::default())
    }

    #[test]
    fn reindents_nested_blocks_with_two_spaces() {
        let input = "provider \"x\" {\ndefaults {\nrequest {\nreq_map openai_chat_to_openai_responses;\n}\n}\n}\n";
        let want = "provider \"x\" {\n  defaults {\n    request {\n      req_map openai_chat_to_openai_responses;\n    }\n  }\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn formats_with_tabs() {
        let input = "provider \"x\" {\ndefaults {\nrequest {\nreq_map openai_chat_to_openai_responses;\n}\n}\n}\n";
        let want = "provider \"x\" {\n\tdefaults {\n\t\trequest {\n\t\t\treq_map openai_chat_to_openai_responses;\n\t\t}\n\t}\n}\n";
        let opts = FormatOptions {
            tab_size: 2,
            insert_spaces: false,
        };
        assert_eq!(format_document(input, opts), want);
    }

    #[test]
    fn explodes_compact_lines() {
        let input = "provider \"x\" { defaults { request { req_map m; } } }\n";
        let want = "provider \"x\" {\n  defaults {\n    request {\n      req_map m;\n    }\n  }\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn formatting_is_idempotent() {
        let inputs = [
            "provider \"x\" { defaults { request { req_map m; } } }\n",
            "provider \"x\" {\n\n  # note\n  defaults {}\n}\n",
            "a { b; } c; # done\n",
            "}{\n",
            "",
            ";\n",
        ];
        for input in inputs {
            let once = fmt(input);
            let twice = fmt(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn preserves_final_newline_presence() {
        assert!(fmt("a;\n").ends_with('\n'));
        assert!(!fmt("a;").ends_with('\n'));
        // A blank final line without a newline must not produce one.
        assert_eq!(fmt("a;\n  "), "a;");
        assert_eq!(fmt("   "), "");
    }

    #[test]
    fn braces_in_strings_do_not_indent() {
        let input = "provider \"x\" {\njson_set \"$.a\" \"{\";\njson_set \"$.b\" \"}\";\n}\n";
        let want = "provider \"x\" {\n  json_set \"$.a\" \"{\";\n  json_set \"$.b\" \"}\";\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn braces_in_comments_do_not_indent() {
        let input = "provider \"x\" {\n# closing } here\nreq_map m; // open { here\n}\n";
        let want = "provider \"x\" {\n  # closing } here\n  req_map m; // open { here\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn trailing_comments_stay_on_their_statement() {
        let input = "provider \"x\" { req_map m; # why\n}\n";
        let want = "provider \"x\" {\n  req_map m; # why\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn comment_after_closer_stays_attached() {
        let input = "provider \"x\" {\nreq_map m;\n} // end\n";
        let want = "provider \"x\" {\n  req_map m;\n} // end\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn blank_lines_are_kept_empty() {
        let input = "provider \"x\" {\n\n  req_map m;\n}\n";
        let want = "provider \"x\" {\n\n  req_map m;\n}\n";
        assert_eq!(fmt(input), want);
    }

    #[test]
    fn out_of_range_tab_size_falls_back_to_two() {
        for tab_size in [0, 17, 99] {
            let opts = FormatOptions {
                tab_size,
                insert_spaces: true,
            };
            assert_eq!(format_document("a {\nb;\n}\n", opts), "a {\n  b;\n}\n");
        }
    }

    #[test]
    fn unbalanced_closers_clamp_at_column_zero() {
        assert_eq!(fmt("}\n}\na;\n"), "}\n}\na;\n");
    }

    #[test]
    fn balanced_input_stays_balanced() {
        let input = "provider \"x\" { defaults { request { req_map m; } } }\n";
        let output = fmt(input);
        let sum: (usize, usize) = output.lines().fold((0, 0), |acc, line| {
            let (o, c) = count_braces_outside_string_and_comment(line);
            (acc.0 + o, acc.1 + c)
        });
        assert_eq!(sum.0, sum.1);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(fmt(""), "");
    }
}
