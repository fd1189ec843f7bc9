//! Text forms of field values and element names.

use crate::value::Value;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write;

/// Serialize a value the way schema-typed XML expects it.
///
/// `Null` has no text form and yields an empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::I16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::F32(n) => float_text(f64::from(*n), || n.to_string()),
        Value::F64(n) => float_text(*n, || n.to_string()),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => STANDARD.encode(b),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        Value::DateTimeTz(dt) => dt.to_rfc3339(),
        Value::Uuid(u) => u.hyphenated().to_string(),
        Value::Json(j) => j.to_string(),
    }
}

fn float_text(n: f64, finite: impl FnOnce() -> String) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "INF".to_string()
    } else if n == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        finite()
    }
}

/// Encode a string as an XML local name.
///
/// Characters that may not appear in a name (or not at its start) become
/// `_xHHHH_`; an underscore that would read as the start of such an escape is
/// itself escaped. The empty string encodes as `_`.
pub fn encode_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    for (i, &ch) in chars.iter().enumerate() {
        let legal = if i == 0 {
            is_name_start(ch)
        } else {
            is_name_char(ch)
        };
        let looks_escaped = ch == '_' && chars.get(i + 1) == Some(&'x');
        if legal && !looks_escaped {
            out.push(ch);
        } else {
            escape(&mut out, ch);
        }
    }
    out
}

/// Reverse [`encode_name`]. Malformed escapes are kept verbatim.
pub fn decode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 2..];
        let decoded = tail.find('_').and_then(|end| {
            let hex = &tail[..end];
            if hex.len() != 4 && hex.len() != 8 {
                return None;
            }
            let code = u32::from_str_radix(hex, 16).ok()?;
            char::from_u32(code).map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str("_x");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape(out: &mut String, ch: char) {
    let code = u32::from(ch);
    let _ = if code > 0xFFFF {
        write!(out, "_x{code:08X}_")
    } else {
        write!(out, "_x{code:04X}_")
    };
}

fn is_name_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_numeric() || ch == '-' || ch == '.'
}
