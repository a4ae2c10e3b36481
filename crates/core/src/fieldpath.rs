//! Field-path parsing and matching for validation-issue routing.
//!
//! Field paths use dot/bracket notation, e.g.
//! `leave_details.continuous_leave_periods[0].start_date`. A declared path
//! may carry an index wildcard -- `[*]`, or a bare `*` dot segment --
//! meaning "any single array index". Matching is exact in segment count
//! and per-segment value: `foo` matches only `foo`, never `foo[0]` or
//! `foo.bar` (prefix matches are intentionally excluded so a page only
//! claims issues for fields it actually collects).

/// One segment of a parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A named field, e.g. `work_pattern`.
    Key(String),
    /// A literal array index, e.g. `[3]` or the dot form `.3.`.
    Index(u64),
    /// An index wildcard: `[*]` or a bare `*` dot segment.
    AnyIndex,
}

/// Parse a dot/bracket path into segments.
///
/// `a.b[2].c` parses to `[Key(a), Key(b), Index(2), Key(c)]` and
/// `a[*].c` to `[Key(a), AnyIndex, Key(c)]`. Purely numeric dot segments
/// are treated as indices so `a.2.c` and `a[2].c` compare equal. Malformed
/// bracket contents fall back to literal key text, degrading to exact
/// string comparison.
pub fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !buf.is_empty() {
                    segments.push(dot_segment(std::mem::take(&mut buf)));
                }
            }
            '[' => {
                if !buf.is_empty() {
                    segments.push(dot_segment(std::mem::take(&mut buf)));
                }
                let mut inner = String::new();
                let mut closed = false;
                for c2 in chars.by_ref() {
                    if c2 == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c2);
                }
                if !closed {
                    // Unclosed bracket: keep the raw text as a literal key.
                    segments.push(Segment::Key(format!("[{}", inner)));
                } else if inner == "*" {
                    segments.push(Segment::AnyIndex);
                } else if let Ok(i) = inner.parse::<u64>() {
                    segments.push(Segment::Index(i));
                } else {
                    segments.push(Segment::Key(inner));
                }
            }
            _ => buf.push(c),
        }
    }
    if !buf.is_empty() {
        segments.push(dot_segment(buf));
    }
    segments
}

fn dot_segment(text: String) -> Segment {
    if text == "*" {
        Segment::AnyIndex
    } else if let Ok(i) = text.parse::<u64>() {
        Segment::Index(i)
    } else {
        Segment::Key(text)
    }
}

/// Whether an issue's field path is claimed by any of the declared paths.
///
/// Either side may carry the wildcard; in practice issue paths from the
/// API are concrete and declared page fields carry `[*]`.
pub fn is_field_relevant(issue_path: &str, declared_paths: &[String]) -> bool {
    let issue = parse_path(issue_path);
    declared_paths
        .iter()
        .any(|declared| segments_match(&issue, &parse_path(declared)))
}

/// Whether an issue's rule name is among the declared applicable rules.
pub fn is_rule_relevant(rule: &str, declared_rules: &[String]) -> bool {
    declared_rules.iter().any(|r| r == rule)
}

fn segments_match(a: &[Segment], b: &[Segment]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| segment_match(x, y))
}

fn segment_match(a: &Segment, b: &Segment) -> bool {
    match (a, b) {
        (Segment::AnyIndex, Segment::Index(_)) | (Segment::Index(_), Segment::AnyIndex) => true,
        _ => a == b,
    }
}
