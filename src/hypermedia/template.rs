//! URI Template expansion (RFC 6570, levels 1-4) for `href-template` links.
//!
//! Expansion happens in two steps:
//!
//! 1. [`encode_vars`] flattens caller variables into template-ready scalars,
//!    applying the API's query conventions (booleans as `"true"`/`"false"`,
//!    `{"AND": [...]}` joined with `,`, `{"OR": [...]}` joined with `;`).
//! 2. [`expand`] substitutes them into the template.
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::hypermedia::template::{encode_vars, expand};
//! use serde_json::json;
//!
//! let vars = encode_vars(&json!({"profile": {"AND": ["story", "audio"]}, "limit": 10}));
//! let url = expand("https://api.pmp.io/docs{?profile,limit}", &vars);
//! assert_eq!(url, "https://api.pmp.io/docs?profile=story%2Caudio&limit=10");
//! ```

use serde_json::{Map, Value};

/// Separator for `AND` filter lists.
pub const PMP_AND: &str = ",";

/// Separator for `OR` filter lists.
pub const PMP_OR: &str = ";";

const RESERVED: &str = ":/?#[]@!$&'()*+,;=";

/// Converts caller variables into the scalar form the API expects.
///
/// Booleans become `"true"`/`"false"`. Objects with a non-empty `AND` list are
/// joined with [`PMP_AND`], otherwise a non-empty `OR` list is joined with
/// [`PMP_OR`]; any other object or array becomes `""`. Scalars pass through.
/// Non-object input yields no variables.
#[must_use]
pub fn encode_vars(vars: &Value) -> Map<String, Value> {
    let Some(vars) = vars.as_object() else {
        return Map::new();
    };

    vars.iter()
        .map(|(name, value)| {
            let encoded = match value {
                Value::Bool(b) => Value::String(b.to_string()),
                Value::Object(filter) => Value::String(encode_filter(filter)),
                Value::Array(_) => Value::String(String::new()),
                scalar => scalar.clone(),
            };
            (name.clone(), encoded)
        })
        .collect()
}

fn encode_filter(filter: &Map<String, Value>) -> String {
    let joined = |key: &str, sep: &str| {
        filter.get(key).and_then(|terms| match terms {
            Value::Array(terms) if !terms.is_empty() => Some(
                terms
                    .iter()
                    .map(scalar_string)
                    .collect::<Vec<_>>()
                    .join(sep),
            ),
            Value::String(term) if !term.is_empty() => Some(term.clone()),
            _ => None,
        })
    };

    joined("AND", PMP_AND)
        .or_else(|| joined("OR", PMP_OR))
        .unwrap_or_default()
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Expression operator behaviour, per RFC 6570 appendix A.
struct Operator {
    first: &'static str,
    sep: &'static str,
    named: bool,
    ifemp: &'static str,
    allow_reserved: bool,
}

impl Operator {
    const fn for_char(c: Option<char>) -> Self {
        let (first, sep, named, ifemp, allow_reserved) = match c {
            Some('+') => ("", ",", false, "", true),
            Some('#') => ("#", ",", false, "", true),
            Some('.') => (".", ".", false, "", false),
            Some('/') => ("/", "/", false, "", false),
            Some(';') => (";", ";", true, "", false),
            Some('?') => ("?", "&", true, "=", false),
            Some('&') => ("&", "&", true, "=", false),
            _ => ("", ",", false, "", false),
        };
        Self {
            first,
            sep,
            named,
            ifemp,
            allow_reserved,
        }
    }
}

/// Expands a URI template with already-encoded variables.
///
/// Variables that are missing, `null`, or empty lists are undefined and
/// contribute nothing to the result. An unterminated expression is copied
/// through literally.
#[must_use]
pub fn expand(template: &str, vars: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        expand_expression(&rest[open + 1..open + close], vars, &mut out);
        rest = &rest[open + close + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_expression(expression: &str, vars: &Map<String, Value>, out: &mut String) {
    let op_char = expression
        .chars()
        .next()
        .filter(|c| "+#./;?&".contains(*c));
    let op = Operator::for_char(op_char);
    let varlist = op_char.map_or(expression, |c| &expression[c.len_utf8()..]);

    let mut first = true;
    for varspec in varlist.split(',') {
        let (name, explode, prefix) = parse_varspec(varspec);
        let Some(value) = vars.get(name) else {
            continue;
        };

        let items: Vec<String> = match value {
            Value::Null => continue,
            Value::Array(items) if items.is_empty() => continue,
            Value::Array(items) => items.iter().map(scalar_string).collect(),
            scalar => {
                let s = scalar_string(scalar);
                let s = match prefix {
                    Some(n) => s.chars().take(n).collect(),
                    None => s,
                };
                out.push_str(if first { op.first } else { op.sep });
                first = false;
                if op.named {
                    out.push_str(name);
                    out.push_str(if s.is_empty() { op.ifemp } else { "=" });
                }
                out.push_str(&encode(&s, op.allow_reserved));
                continue;
            }
        };

        out.push_str(if first { op.first } else { op.sep });
        first = false;

        if explode {
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    let encoded = encode(item, op.allow_reserved);
                    if op.named {
                        let eq = if item.is_empty() { op.ifemp } else { "=" };
                        format!("{name}{eq}{encoded}")
                    } else {
                        encoded
                    }
                })
                .collect();
            out.push_str(&parts.join(op.sep));
        } else {
            if op.named {
                out.push_str(name);
                out.push('=');
            }
            let parts: Vec<String> = items
                .iter()
                .map(|item| encode(item, op.allow_reserved))
                .collect();
            out.push_str(&parts.join(","));
        }
    }
}

fn parse_varspec(varspec: &str) -> (&str, bool, Option<usize>) {
    let varspec = varspec.trim();
    if let Some(name) = varspec.strip_suffix('*') {
        return (name, true, None);
    }
    if let Some((name, len)) = varspec.split_once(':') {
        return (name, false, len.parse().ok());
    }
    (varspec, false, None)
}

fn encode(value: &str, allow_reserved: bool) -> String {
    if !allow_reserved {
        return urlencoding::encode(value).into_owned();
    }

    let mut out = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut buf = [0u8; 4];
    for (i, c) in value.char_indices() {
        let is_pct_triplet = c == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if is_pct_triplet || RESERVED.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}
