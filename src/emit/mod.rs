//! Python-literal rendering of a [`Report`].
//!
//! The Conan recipe imports the generated file as a Python module, so the
//! report is written as three Python literals:
//!
//! ```text
//! # Automatically generated by protodeps DO NOT EDIT
//! DEPENDENCIES = {
//!     "iam_v1_iam_policy_protos": ['api_annotations_protos', 'grpc::_grpc', ...],
//! }
//!
//! PROTO_COMPONENTS = {
//!     "api_annotations_protos",
//!     "iam_v1_iam_policy_protos"
//! }
//!
//! COMPONENTS = {
//!     "iam"
//! }
//! ```
//!
//! Dependency lists use Python `repr` notation (single quotes); keys and set
//! members are double-quoted. Every collection is sorted, so the output is
//! byte-identical across runs for the same input.

use crate::aggregate::Report;
use crate::constants::GENERATOR_NAME;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Write the report to `writer`.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write_report<W: Write>(report: &Report, mut writer: W) -> io::Result<()> {
    writer.write_all(render_report(report).as_bytes())?;
    writer.flush()
}

/// Render the report as the text of a Python module.
#[must_use]
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "# Automatically generated by {GENERATOR_NAME} DO NOT EDIT");
    out.push_str("DEPENDENCIES = {\n");
    for (component, deps) in &report.dependencies {
        let _ = writeln!(out, "    \"{component}\": {},", python_list(deps));
    }
    out.push_str("}\n");
    let _ = writeln!(out, "\nPROTO_COMPONENTS = {{\n    {}\n}}", set_body(&report.proto_components));
    let _ = writeln!(out, "\nCOMPONENTS = {{\n    {}\n}}", set_body(&report.components));
    out
}

/// Sorted list in `repr` notation, e.g. `['a', 'b']`.
fn python_list(items: &[String]) -> String {
    let mut sorted: Vec<&String> = items.iter().collect();
    sorted.sort();
    let rendered: Vec<String> = sorted.into_iter().map(|item| python_repr(item)).collect();
    format!("[{}]", rendered.join(", "))
}

/// Members as `"name"` joined by `,\n    `, sorted by their quoted form.
fn set_body(names: &BTreeSet<String>) -> String {
    let mut quoted: Vec<String> = names.iter().map(|name| format!("\"{name}\"")).collect();
    // The closing quote takes part in the ordering
    quoted.sort();
    quoted.join(",\n    ")
}

/// Python `repr` of a string.
///
/// Single quotes unless the text contains a single quote and no double quote.
fn python_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => {
                let code = u32::from(c);
                let _ = match code {
                    0..=0xff => write!(out, "\\x{code:02x}"),
                    0x100..=0xffff => write!(out, "\\u{code:04x}"),
                    _ => write!(out, "\\U{code:08x}"),
                };
            }
        }
    }
    out.push(quote);
    out
}

/// Approximates Python's `str.isprintable`.
///
/// Control, separator (except space), format and private-use characters are
/// not printable. Unassigned code points are treated as printable.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        u32::from(c),
        0xad | 0x600..=0x605
            | 0x61c
            | 0x6dd
            | 0x70f
            | 0x890..=0x891
            | 0x8e2
            | 0x180e
            | 0x200b..=0x200f
            | 0x202a..=0x202e
            | 0x2060..=0x2064
            | 0x2066..=0x206f
            | 0xe000..=0xf8ff
            | 0xfeff
            | 0xfff9..=0xfffb
            | 0x110bd
            | 0x110cd
            | 0x13430..=0x1343f
            | 0x1bca0..=0x1bca3
            | 0x1d173..=0x1d17a
            | 0xe0001
            | 0xe0020..=0xe007f
            | 0xf0000..=0xffffd
            | 0x100000..=0x10fffd
    )
}
