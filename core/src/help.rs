//! Plain-text help for a schema.

use std::fmt::Write;

use crate::option::{OptionKind, OptionSchema, ValueSpec};
use crate::schema::Schema;

const HELP_COLUMN: usize = 28;

/// Renders a usage line and one entry per option, in declaration order.
///
/// Branches and option groups list their nested schema indented under the
/// owning entry.
///
/// # Examples
///
/// ```
/// use argsplit_core::{OptionSchema, Schema, Shape, render_help};
///
/// let schema = Schema::new(vec![
///     OptionSchema::flag(["-v", "--verbose"]).with_help("Print more output"),
///     OptionSchema::required("jar", Shape::Path),
/// ])
/// .unwrap();
/// let help = render_help(&schema);
/// assert!(help.starts_with("Usage: [options] <jar>"));
/// assert!(help.contains("-v, --verbose"));
/// assert!(help.contains("Print more output"));
/// ```
pub fn render_help<T>(schema: &Schema<T>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {}", usage(schema.options()));
    out.push('\n');
    write_entries(&mut out, schema.options(), 2);
    out
}

fn usage(options: &[OptionSchema]) -> String {
    let mut parts = Vec::new();
    if options.iter().any(|o| !o.kind().is_positional()) {
        parts.push("[options]".to_string());
    }
    for option in options {
        match option.kind() {
            OptionKind::Required(_) => parts.push(format!("<{}>", option.primary_name())),
            OptionKind::Varargs(_) => parts.push(format!("[{}...]", option.primary_name())),
            OptionKind::Branch(_) => parts.push(format!("[{} ...]", option.primary_name())),
            _ => {}
        }
    }
    parts.join(" ")
}

fn write_entries(out: &mut String, options: &[OptionSchema], indent: usize) {
    for option in options {
        let label = format!("{}{}", option.names(), value_hint(option));
        let pad = " ".repeat(indent);
        match option.help() {
            Some(help) if label.len() + indent + 2 <= HELP_COLUMN => {
                let _ = writeln!(out, "{pad}{label:<width$}{help}", width = HELP_COLUMN - indent);
            }
            Some(help) => {
                let _ = writeln!(out, "{pad}{label}");
                let _ = writeln!(out, "{}{help}", " ".repeat(HELP_COLUMN));
            }
            None => {
                let _ = writeln!(out, "{pad}{label}");
            }
        }
        if let Some(nested) = option.kind().nested_schema() {
            write_entries(out, nested.options(), indent + 4);
        }
    }
}

fn value_hint(option: &OptionSchema) -> String {
    let repeat = |hint: String| -> String {
        vec![hint; option.cardinality()].join(" ")
    };
    match option.kind() {
        OptionKind::Flag => String::new(),
        OptionKind::Single(ValueSpec::Scalar(shape)) => {
            format!(" {}", repeat(format!("<{shape}>")))
        }
        OptionKind::Repeatable(ValueSpec::Scalar(shape)) => {
            format!(" {} (repeatable)", repeat(format!("<{shape}>")))
        }
        OptionKind::Single(ValueSpec::Group(_)) => format!(" {}", repeat("<value>".into())),
        OptionKind::Repeatable(ValueSpec::Group(_)) => {
            format!(" {} (repeatable)", repeat("<value>".into()))
        }
        OptionKind::Required(shape) => format!(" <{shape}> (required)"),
        OptionKind::Varargs(shape) => format!(" <{shape}>..."),
        OptionKind::Branch(_) => " ...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Shape;

    fn jar_schema() -> Schema {
        let topic = Schema::new(vec![
            OptionSchema::required("topic", Shape::String).with_help("Help topic"),
        ])
        .unwrap();
        Schema::new(vec![
            OptionSchema::flag(["-v", "--verbose"]).with_help("Print more output"),
            OptionSchema::repeatable("--define", Shape::String).with_cardinality(2),
            OptionSchema::required("jar", Shape::Path),
            OptionSchema::branch("help", topic),
        ])
        .unwrap()
    }

    #[test]
    fn test_usage_line() {
        let help = render_help(&jar_schema());
        let first = help.lines().next().unwrap();
        assert_eq!(first, "Usage: [options] <jar> [help ...]");
    }

    #[test]
    fn test_entries_include_hints() {
        let help = render_help(&jar_schema());
        assert!(help.contains("  --define <string> <string> (repeatable)"));
        assert!(help.contains("  jar <path> (required)"));
    }

    #[test]
    fn test_varargs_hint() {
        let schema = Schema::new(vec![OptionSchema::varargs("params", Shape::String)]).unwrap();
        let help = render_help(&schema);
        assert!(help.starts_with("Usage: [params...]\n"));
        assert!(help.contains("  params <string>..."));
    }

    #[test]
    fn test_nested_schema_is_indented() {
        let help = render_help(&jar_schema());
        let lines: Vec<&str> = help.lines().collect();
        let branch = lines.iter().position(|l| l.trim_start() == "help ...").unwrap();
        assert_eq!(lines[branch + 1], "      topic <string> (required)");
        assert_eq!(lines[branch + 2].trim(), "Help topic");
    }

    #[test]
    fn test_help_aligned_to_column() {
        let help = render_help(&jar_schema());
        let line = help.lines().find(|l| l.contains("--verbose")).unwrap();
        assert_eq!(line.find("Print more output"), Some(HELP_COLUMN));
    }
}
