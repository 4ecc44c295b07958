//! English messages.

use serde_json::Value;

use crate::issue::{Issue, IssueCode, IssueDetail, SizeOrigin};
use crate::locale::{LocaleTable, FALLBACK_MESSAGE};

/// The English locale. Covers every code that can appear on an issue.
pub fn en() -> LocaleTable {
    LocaleTable::new("en")
        .with_renderer(IssueCode::InvalidType, render)
        .with_renderer(IssueCode::InvalidUnion, render)
        .with_renderer(IssueCode::TooSmall, render)
        .with_renderer(IssueCode::TooBig, render)
        .with_renderer(IssueCode::NotMultipleOf, render)
        .with_renderer(IssueCode::InvalidFormat, render)
        .with_renderer(IssueCode::Custom, render)
        .with_renderer(IssueCode::InvalidValue, render)
        .with_renderer(IssueCode::UnrecognizedKeys, render)
}

fn render(issue: &Issue) -> String {
    match &issue.detail {
        IssueDetail::InvalidType { expected, received } => {
            format!("Invalid input: expected {expected}, received {received}")
        }
        IssueDetail::InvalidUnion { .. } => FALLBACK_MESSAGE.to_string(),
        IssueDetail::TooSmall {
            origin,
            minimum,
            inclusive,
            exact,
        } => {
            let bound = bound_text(*minimum, *exact, if *inclusive { ">=" } else { ">" });
            format!("Too small: {}", expectation(*origin, &bound))
        }
        IssueDetail::TooBig {
            origin,
            maximum,
            inclusive,
            exact,
        } => {
            let bound = bound_text(*maximum, *exact, if *inclusive { "<=" } else { "<" });
            format!("Too big: {}", expectation(*origin, &bound))
        }
        IssueDetail::NotMultipleOf { divisor } => {
            format!("Invalid number: must be a multiple of {}", number(*divisor))
        }
        IssueDetail::InvalidFormat { format, pattern } => {
            let pattern = pattern.as_deref().unwrap_or_default();
            match format.as_str() {
                "starts_with" => format!("Invalid string: must start with \"{pattern}\""),
                "ends_with" => format!("Invalid string: must end with \"{pattern}\""),
                "includes" => format!("Invalid string: must include \"{pattern}\""),
                "regex" => format!("Invalid string: must match pattern {pattern}"),
                "lowercase" => "Invalid string: must be lowercase".to_string(),
                "uppercase" => "Invalid string: must be uppercase".to_string(),
                "mime" => format!("Invalid MIME type: expected one of {pattern}"),
                other => format!("Invalid {other}"),
            }
        }
        IssueDetail::Custom { .. } => FALLBACK_MESSAGE.to_string(),
        IssueDetail::InvalidValue { values } => match values.as_slice() {
            [single] => format!("Invalid input: expected {}", literal(single)),
            many => {
                let options: Vec<String> = many.iter().map(literal).collect();
                format!("Invalid option: expected one of {}", options.join("|"))
            }
        },
        IssueDetail::UnrecognizedKeys { keys } => {
            let quoted: Vec<String> = keys.iter().map(|k| format!("\"{k}\"")).collect();
            let noun = if keys.len() == 1 { "key" } else { "keys" };
            format!("Unrecognized {noun}: {}", quoted.join(", "))
        }
    }
}

fn expectation(origin: SizeOrigin, bound: &str) -> String {
    match origin.unit() {
        Some(unit) => {
            let subject = match origin {
                SizeOrigin::String => "string",
                SizeOrigin::Array => "array",
                SizeOrigin::Record => "record",
                SizeOrigin::Number => "number",
            };
            format!("expected {subject} to have {bound} {unit}")
        }
        None => format!("expected number to be {bound}"),
    }
}

fn bound_text(limit: f64, exact: bool, op: &str) -> String {
    if exact {
        format!("exactly {}", number(limit))
    } else {
        format!("{op}{}", number(limit))
    }
}

/// Integral values print without a trailing `.0`.
fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn literal(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::ValueType;
    use crate::path::IssuePath;
    use serde_json::json;

    fn issue(detail: IssueDetail) -> Issue {
        Issue::new(IssuePath::root(), detail)
    }

    #[test]
    fn test_covers_every_issue_code() {
        let table = en();
        for code in IssueCode::all_codes() {
            if *code == IssueCode::InvalidConfiguration {
                continue;
            }
            assert!(table.covers(*code), "en locale misses {code}");
        }
    }

    #[test]
    fn test_invalid_type_names_both_sides() {
        let msg = en().render(&issue(IssueDetail::InvalidType {
            expected: ValueType::String,
            received: ValueType::Missing,
        }));
        assert_eq!(msg, "Invalid input: expected string, received missing");
    }

    #[test]
    fn test_too_small_string() {
        let msg = en().render(&issue(IssueDetail::TooSmall {
            origin: SizeOrigin::String,
            minimum: 5.0,
            inclusive: true,
            exact: false,
        }));
        assert_eq!(msg, "Too small: expected string to have >=5 characters");
    }

    #[test]
    fn test_too_big_number_exclusive() {
        let msg = en().render(&issue(IssueDetail::TooBig {
            origin: SizeOrigin::Number,
            maximum: 2.5,
            inclusive: false,
            exact: false,
        }));
        assert_eq!(msg, "Too big: expected number to be <2.5");
    }

    #[test]
    fn test_exact_array_length() {
        let msg = en().render(&issue(IssueDetail::TooBig {
            origin: SizeOrigin::Array,
            maximum: 3.0,
            inclusive: true,
            exact: true,
        }));
        assert_eq!(msg, "Too big: expected array to have exactly 3 items");
    }

    #[test]
    fn test_invalid_value_lists_options() {
        let msg = en().render(&issue(IssueDetail::InvalidValue {
            values: vec![json!("a"), json!("b")],
        }));
        assert_eq!(msg, "Invalid option: expected one of \"a\"|\"b\"");
    }

    #[test]
    fn test_starts_with_quotes_prefix() {
        let msg = en().render(&issue(IssueDetail::InvalidFormat {
            format: "starts_with".into(),
            pattern: Some("https://".into()),
        }));
        assert_eq!(msg, "Invalid string: must start with \"https://\"");
    }

    #[test]
    fn test_named_format_falls_through() {
        let msg = en().render(&issue(IssueDetail::InvalidFormat {
            format: "email".into(),
            pattern: None,
        }));
        assert_eq!(msg, "Invalid email");
    }
}
