//! Renders the curve as a Lua table literal and splices it between two marker lines.

use crate::domain::OutputRow;
use crate::error::{CurveError, Result};

pub const LEADING_MARKER: &str = "---AUTO_GENERATED LEADING ExperienceData";
pub const TAILING_MARKER: &str = "---AUTO_GENERATED TAILING ExperienceData";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub open: String,
    pub close: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: LEADING_MARKER.into(),
            close: TAILING_MARKER.into(),
        }
    }
}

/// Entries sit on their own lines between the braces; an empty table still
/// keeps the blank line between them.
pub fn render(rows: &[OutputRow]) -> String {
    let entries: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "    {{ battleXP = {}, totalXP = {} }},",
                r.reward_xp, r.threshold_xp
            )
        })
        .collect();
    format!("local experienceData = {{\n{}\n}}", entries.join("\n"))
}

/// Split keeping terminators, so re-joining the pieces is lossless.
fn lines_with_endings(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn strip_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn find_unique(lines: &[&str], marker: &str, what: &str) -> Result<usize> {
    let mut hits = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| strip_ending(l) == marker)
        .map(|(i, _)| i);
    let first = hits
        .next()
        .ok_or_else(|| CurveError::Splice(format!("{what} marker {marker:?} not found")))?;
    if let Some(again) = hits.next() {
        return Err(CurveError::Splice(format!(
            "{what} marker {marker:?} appears more than once (lines {} and {})",
            first + 1,
            again + 1
        )));
    }
    Ok(first)
}

/// Replace everything strictly between the marker lines with `rendered`.
///
/// Bytes outside the span, the marker lines included, are kept as-is. A CRLF
/// document gets `rendered` converted to CRLF.
pub fn splice(document: &str, rendered: &str, markers: &Markers) -> Result<String> {
    let lines = lines_with_endings(document);
    let open = find_unique(&lines, &markers.open, "opening")?;
    let close = find_unique(&lines, &markers.close, "closing")?;
    if close <= open {
        return Err(CurveError::Splice(format!(
            "closing marker (line {}) precedes opening marker (line {})",
            close + 1,
            open + 1
        )));
    }

    let eol = if lines[open].ends_with("\r\n") { "\r\n" } else { "\n" };
    let body = if eol == "\n" {
        rendered.to_string()
    } else {
        rendered.replace("\r\n", "\n").replace('\n', "\r\n")
    };

    let mut out = String::with_capacity(document.len() + body.len());
    for l in &lines[..=open] {
        out.push_str(l);
    }
    out.push_str(&body);
    out.push_str(eol);
    for l in &lines[close..] {
        out.push_str(l);
    }
    Ok(out)
}
