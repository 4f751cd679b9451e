use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::exceptions::{exc_err_fmt, exc_fmt, ExcKind, RunResult};

/// Runtime kind of an initialized value.
///
/// The string forms (`int`, `bool`, `string`, `nil`) are what `TYPE` stores
/// and what `type` arguments carry in the XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Int,
    Bool,
    String,
    Nil,
}

/// Primary value type for interpreted programs.
///
/// Exactly one variant is inhabited at a time. `Uninit` is the state of a
/// slot after `DEFVAR` and before the first write; every consumer except
/// `TYPE` rejects it with `MissingValue`.
///
/// `Str` holds decoded text: `\ddd` escapes are expanded when the literal is
/// parsed, so every string operation sees Unicode code points.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Uninit,
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    /// Runtime kind, `None` for an uninitialized slot.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Uninit => None,
            Self::Nil => Some(ValueKind::Nil),
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Str(_) => Some(ValueKind::String),
        }
    }

    /// Kind name for error messages.
    pub(crate) fn kind_str(&self) -> &'static str {
        self.kind().map_or("uninitialized", <&'static str>::from)
    }

    /// Constructs a value from the textual literal form the XML uses.
    ///
    /// Integers are decimal, `0x` hex, or `0o` octal with an optional sign;
    /// booleans are exactly `true` or `false`; strings are decoded with
    /// [`decode_escapes`]; `nil` literals must spell `nil`. Anything else is
    /// an `XmlStructure` error.
    pub(crate) fn parse_literal(kind: ValueKind, text: &str) -> RunResult<Self> {
        match kind {
            ValueKind::Int => parse_int(text).map(Self::Int),
            ValueKind::Bool => match text {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => exc_err_fmt!(ExcKind::XmlStructure; "invalid bool literal {text:?}"),
            },
            ValueKind::String => decode_escapes(text).map(Self::Str),
            ValueKind::Nil => match text {
                "nil" => Ok(Self::Nil),
                _ => exc_err_fmt!(ExcKind::XmlStructure; "invalid nil literal {text:?}"),
            },
        }
    }

    /// Source-literal rendering (`int@5`, `string@hi`), used by state dumps.
    pub(crate) fn literal_form(&self) -> String {
        match self {
            Self::Uninit => "uninitialized".to_owned(),
            Self::Nil => "nil@nil".to_owned(),
            Self::Bool(_) => format!("bool@{self}"),
            Self::Int(_) => format!("int@{self}"),
            Self::Str(_) => format!("string@{self}"),
        }
    }
}

/// The `WRITE` rendering: integers in decimal, booleans as `true`/`false`,
/// strings verbatim, nil as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninit | Self::Nil => Ok(()),
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

/// Parses an integer literal: optional sign, then decimal digits or a
/// `0x`/`0o` prefixed body.
pub(crate) fn parse_int(text: &str) -> RunResult<i64> {
    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        parse_radix(hex, 16)
    } else if let Some(oct) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
        parse_radix(oct, 8)
    } else if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        body.parse::<i128>().ok()
    } else {
        None
    };
    magnitude
        .and_then(|m| i64::try_from(sign * m).ok())
        .ok_or_else(|| exc_fmt!(ExcKind::XmlStructure; "invalid int literal {text:?}"))
}

/// `from_str_radix` would accept an embedded sign; the sign was already
/// consumed, so reject it here.
fn parse_radix(digits: &str, radix: u32) -> Option<i128> {
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    i128::from_str_radix(digits, radix).ok()
}

/// Replaces every `\ddd` triplet with the corresponding code point. Any
/// backslash not followed by exactly three decimal digits is invalid.
pub(crate) fn decode_escapes(text: &str) -> RunResult<String> {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        let mut code = 0u32;
        for _ in 0..3 {
            match chars.next().and_then(|digit| digit.to_digit(10)) {
                Some(digit) => code = code * 10 + digit,
                None => {
                    return exc_err_fmt!(ExcKind::XmlStructure;
                        "invalid escape sequence in string literal {text:?}")
                }
            }
        }
        // three decimal digits cap at 999, always a valid scalar value
        decoded.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_literal_radixes() {
        assert_eq!(parse_int("42").unwrap(), 42);
        assert_eq!(parse_int("-42").unwrap(), -42);
        assert_eq!(parse_int("+7").unwrap(), 7);
        assert_eq!(parse_int("0x2A").unwrap(), 42);
        assert_eq!(parse_int("-0x2a").unwrap(), -42);
        assert_eq!(parse_int("0o52").unwrap(), 42);
        assert_eq!(parse_int("-0o52").unwrap(), -42);
        assert_eq!(parse_int("9223372036854775807").unwrap(), i64::MAX);
        assert_eq!(parse_int("-9223372036854775808").unwrap(), i64::MIN);
    }

    #[test]
    fn int_literal_rejects_garbage() {
        for text in ["", "-", "+", "abc", "1.5", "0b101", "1 2", "--4", "+-4", "0x", "0x-5", "9223372036854775808"] {
            let err = parse_int(text).unwrap_err();
            assert_eq!(err.kind(), ExcKind::XmlStructure, "{text:?}");
        }
    }

    #[test]
    fn string_escapes_decode_to_code_points() {
        assert_eq!(decode_escapes("Hello\\032World").unwrap(), "Hello World");
        assert_eq!(decode_escapes("\\010").unwrap(), "\n");
        assert_eq!(decode_escapes("\\092").unwrap(), "\\");
        assert_eq!(decode_escapes("žluťoučký").unwrap(), "žluťoučký");
        assert_eq!(decode_escapes("").unwrap(), "");
    }

    #[test]
    fn string_escapes_reject_short_triplets() {
        for text in ["\\", "\\1", "\\12", "\\x41", "a\\0b9"] {
            let err = decode_escapes(text).unwrap_err();
            assert_eq!(err.kind(), ExcKind::XmlStructure, "{text:?}");
        }
    }

    #[test]
    fn bool_and_nil_literals_are_exact() {
        assert_eq!(Value::parse_literal(ValueKind::Bool, "true").unwrap(), Value::Bool(true));
        assert_eq!(Value::parse_literal(ValueKind::Bool, "false").unwrap(), Value::Bool(false));
        assert!(Value::parse_literal(ValueKind::Bool, "True").is_err());
        assert_eq!(Value::parse_literal(ValueKind::Nil, "nil").unwrap(), Value::Nil);
        assert!(Value::parse_literal(ValueKind::Nil, "null").is_err());
    }

    #[test]
    fn write_rendering() {
        assert_eq!(Value::Int(-5).to_string(), "-5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("hi".to_owned()).to_string(), "hi");
        assert_eq!(Value::Nil.to_string(), "");
    }

    #[test]
    fn kind_probe() {
        assert_eq!(Value::Int(0).kind(), Some(ValueKind::Int));
        assert_eq!(Value::Uninit.kind(), None);
        assert_eq!(ValueKind::String.to_string(), "string");
    }
}
