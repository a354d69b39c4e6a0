//! Format attribute lists for display (dump text, one line per attribute).

use crate::value::{Attribute, Tag, Value};

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Single value as text. Collections are summarized; use [`attrs_to_dump`]
/// for their members.
pub fn format_value(tag: Tag, v: &Value) -> String {
    match v {
        Value::Void => tag.to_string(),
        Value::Integer(x) => format!("{}", x),
        Value::Boolean(x) => format!("{}", x),
        Value::String(s) => s.clone(),
        Value::DateTime(t) => t.to_rfc3339(),
        Value::Resolution(r) => format!("{}x{}{}", r.xres, r.yres, r.units),
        Value::Range(r) => format!("{}-{}", r.lower, r.upper),
        Value::TextWithLang(t) => format!("{} [{}]", t.text, t.lang),
        Value::Binary(b) => format!("hex({})", hex_string(b)),
        Value::Collection(m) => format!("{{{} members}}", m.len()),
    }
}

/// Multi-line dump of an attribute list; nested collections are indented.
pub fn attrs_to_dump(attrs: &[Attribute], indent: usize) -> String {
    let mut lines = Vec::with_capacity(attrs.len());
    for attr in attrs {
        push_attr(&mut lines, attr, indent);
    }
    lines.join("\n")
}

fn push_attr(lines: &mut Vec<String>, attr: &Attribute, indent: usize) {
    let pad = "  ".repeat(indent);
    let tag = attr.values.first().map(|(t, _)| *t).unwrap_or_default();

    let has_collections = attr
        .values
        .iter()
        .any(|(_, v)| matches!(v, Value::Collection(_)));
    if !has_collections {
        let vals: Vec<String> = attr.values.iter().map(|(t, v)| format_value(*t, v)).collect();
        lines.push(format!("{}{} ({}): {}", pad, attr.name, tag, vals.join(", ")));
        return;
    }

    lines.push(format!("{}{} ({}):", pad, attr.name, tag));
    for (i, (t, v)) in attr.values.iter().enumerate() {
        match v {
            Value::Collection(members) => {
                lines.push(format!("{}  [{}] {{", pad, i));
                for m in members {
                    push_attr(lines, m, indent + 2);
                }
                lines.push(format!("{}  }}", pad));
            }
            _ => lines.push(format!("{}  [{}] {}", pad, i, format_value(*t, v))),
        }
    }
}

/// First line of the dump (summary for one attribute).
pub fn attr_summary_line(attr: &Attribute) -> String {
    let mut lines = Vec::new();
    push_attr(&mut lines, attr, 0);
    lines.into_iter().next().unwrap_or_default()
}
