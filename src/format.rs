//! printf-style template formatting
//!
//! Naming templates are written with printf conversions, e.g.
//! `%(showname)s - [%(seasonno)02dx%(episode)s]` or `e%02d`. This module
//! implements the subset needed for filenames: named (`%(key)`) and
//! positional placeholders, the `-`, `0`, `+`, space and `#` flags, field
//! width, precision, and the `s`, `d`, `i`, `x`, `X` and `o` conversions.

use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while expanding a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Template ended in the middle of a conversion specifier
    #[error("Incomplete format specifier at end of template: {0:?}")]
    Incomplete(String),

    /// Conversion character is not supported
    #[error("Unsupported conversion '%{conversion}' in template: {template:?}")]
    UnsupportedConversion { conversion: char, template: String },

    /// `%(key)` refers to a key that has no value
    #[error("Unknown placeholder '{0}'")]
    UnknownPlaceholder(String),

    /// `%(key)` used with positional arguments
    #[error("Named placeholder '{0}' requires named arguments")]
    MappingRequired(String),

    /// Positional conversion used with named arguments
    #[error("Positional conversion used with named arguments in template: {0:?}")]
    PositionalWithMapping(String),

    /// More positional conversions than arguments
    #[error("Not enough arguments for template: {0:?}")]
    NotEnoughArguments(String),

    /// Fewer positional conversions than arguments
    #[error("Not all arguments converted by template: {0:?}")]
    TooManyArguments(String),

    /// Numeric conversion applied to a string value
    #[error("Conversion '%{conversion}' requires a number, got {value:?}")]
    NumberRequired { conversion: char, value: String },
}

/// A value that can be substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatValue {
    Int(i64),
    Str(String),
    /// Expands to the empty string under every conversion
    Missing,
}

impl From<u32> for FormatValue {
    fn from(value: u32) -> Self {
        FormatValue::Int(i64::from(value))
    }
}

impl From<&str> for FormatValue {
    fn from(value: &str) -> Self {
        FormatValue::Str(value.to_string())
    }
}

impl From<String> for FormatValue {
    fn from(value: String) -> Self {
        FormatValue::Str(value)
    }
}

impl<T: Into<FormatValue>> From<Option<T>> for FormatValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FormatValue::Missing)
    }
}

/// Arguments for a template expansion
#[derive(Debug, Clone)]
pub enum FormatArgs {
    Positional(Vec<FormatValue>),
    Named(HashMap<String, FormatValue>),
}

impl FormatArgs {
    /// Builds a named argument map
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FormatValue>,
    {
        FormatArgs::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parsed conversion specifier
#[derive(Debug, Default)]
struct Spec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Expands `template` with the given arguments
///
/// # Examples
///
/// ```
/// use tvnamer::format::{FormatArgs, FormatValue, printf};
///
/// let args = FormatArgs::Positional(vec![FormatValue::Int(7)]);
/// assert_eq!(printf("e%02d", &args).unwrap(), "e07");
/// ```
pub fn printf(template: &str, args: &FormatArgs) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_positional = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        // Mapping key
        let mut key = None;
        if chars.peek() == Some(&'(') {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some(')') => break,
                    Some(ch) => name.push(ch),
                    None => return Err(FormatError::Incomplete(template.to_string())),
                }
            }
            key = Some(name);
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' => spec.plus_sign = true,
                ' ' => spec.space_sign = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            chars.next();
        }

        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        let conversion = chars
            .next()
            .ok_or_else(|| FormatError::Incomplete(template.to_string()))?;

        if conversion == '%' && key.is_none() {
            out.push('%');
            continue;
        }
        if !matches!(conversion, 's' | 'd' | 'i' | 'x' | 'X' | 'o') {
            return Err(FormatError::UnsupportedConversion {
                conversion,
                template: template.to_string(),
            });
        }

        let value = match (key, args) {
            (Some(name), FormatArgs::Named(map)) => map
                .get(&name)
                .ok_or(FormatError::UnknownPlaceholder(name))?,
            (Some(name), FormatArgs::Positional(_)) => {
                return Err(FormatError::MappingRequired(name));
            }
            (None, FormatArgs::Named(_)) => {
                return Err(FormatError::PositionalWithMapping(template.to_string()));
            }
            (None, FormatArgs::Positional(values)) => {
                let value = values
                    .get(next_positional)
                    .ok_or_else(|| FormatError::NotEnoughArguments(template.to_string()))?;
                next_positional += 1;
                value
            }
        };

        out.push_str(&convert(value, conversion, &spec)?);
    }

    if let FormatArgs::Positional(values) = args {
        if next_positional < values.len() {
            return Err(FormatError::TooManyArguments(template.to_string()));
        }
    }

    Ok(out)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&d) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        digits.push(d);
        chars.next();
    }
    digits.parse().ok()
}

fn convert(value: &FormatValue, conversion: char, spec: &Spec) -> Result<String, FormatError> {
    match value {
        FormatValue::Missing => Ok(String::new()),
        FormatValue::Str(s) if conversion == 's' => {
            let text: String = match spec.precision {
                Some(max) => s.chars().take(max).collect(),
                None => s.clone(),
            };
            Ok(pad(text, spec))
        }
        FormatValue::Str(s) => Err(FormatError::NumberRequired {
            conversion,
            value: s.clone(),
        }),
        FormatValue::Int(n) if conversion == 's' => Ok(pad(n.to_string(), spec)),
        FormatValue::Int(n) => Ok(format_integer(*n, conversion, spec)),
    }
}

fn format_integer(n: i64, conversion: char, spec: &Spec) -> String {
    let magnitude = n.unsigned_abs();
    let mut digits = match conversion {
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        'o' => format!("{magnitude:o}"),
        _ => magnitude.to_string(),
    };

    if let Some(min_digits) = spec.precision {
        if digits.len() < min_digits {
            digits = format!("{}{digits}", "0".repeat(min_digits - digits.len()));
        }
    }

    let mut prefix = String::new();
    if n < 0 {
        prefix.push('-');
    } else if spec.plus_sign {
        prefix.push('+');
    } else if spec.space_sign {
        prefix.push(' ');
    }
    if spec.alternate {
        match conversion {
            'x' => prefix.push_str("0x"),
            'X' => prefix.push_str("0X"),
            'o' => prefix.push_str("0o"),
            _ => {}
        }
    }

    // Zero padding goes between the sign and the digits
    if spec.zero_pad && !spec.left_align && spec.precision.is_none() {
        if let Some(width) = spec.width {
            let used = prefix.len() + digits.len();
            if used < width {
                digits = format!("{}{digits}", "0".repeat(width - used));
            }
        }
        return format!("{prefix}{digits}");
    }

    pad(format!("{prefix}{digits}"), spec)
}

fn pad(text: String, spec: &Spec) -> String {
    let Some(width) = spec.width else {
        return text;
    };
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let fill = " ".repeat(width - len);
    if spec.left_align {
        format!("{text}{fill}")
    } else {
        format!("{fill}{text}")
    }
}
