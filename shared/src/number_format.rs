// Locale-aware handling of numbers that were already formatted for display.
// A quantity typed into a report cell comes back as text like "1.234,56";
// this module turns it into an f64 again, given the separators in use.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    None,
    Comma,
    Period,
    Space,
    Apostrophe,
}

impl Separator {
    pub fn glyph(self) -> Option<char> {
        match self {
            Separator::None => None,
            Separator::Comma => Some(','),
            Separator::Period => Some('.'),
            Separator::Space => Some(' '),
            Separator::Apostrophe => Some('\''),
        }
    }

    // Host UIs render space grouping with no-break spaces as often as with
    // a plain one, so all three count as the same separator.
    fn matches(self, c: char) -> bool {
        match self {
            Separator::Space => matches!(c, ' ' | '\u{00a0}' | '\u{202f}'),
            other => other.glyph() == Some(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatSpecError {
    #[error("decimal separator must be a comma or a period, got {0:?}")]
    InvalidDecimal(Separator),
    #[error("thousands and decimal separators are both {0:?}")]
    SameGlyph(Separator),
}

/// Failure to recover a number from display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Failed to parse number: input is empty")]
    Empty,
    #[error("Failed to parse number '{input}': not a numeric literal")]
    InvalidLiteral { input: String },
    #[error("Failed to parse number '{input}': value is not finite")]
    NotFinite { input: String },
}

/// How numbers are grouped and split when shown to a user.
///
/// The thousands separator never uses the same glyph as the decimal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NumberFormatSpec {
    thousands: Separator,
    decimal: Separator,
}

impl NumberFormatSpec {
    pub fn new(thousands: Separator, decimal: Separator) -> Result<Self, FormatSpecError> {
        if !matches!(decimal, Separator::Comma | Separator::Period) {
            return Err(FormatSpecError::InvalidDecimal(decimal));
        }
        if thousands == decimal {
            return Err(FormatSpecError::SameGlyph(thousands));
        }
        Ok(Self { thousands, decimal })
    }

    pub fn thousands(&self) -> Separator {
        self.thousands
    }

    pub fn decimal(&self) -> Separator {
        self.decimal
    }

    pub fn parse(&self, text: &str) -> Result<f64, ParseError> {
        parse(text, self)
    }

    pub fn format(&self, value: f64, decimals: usize) -> String {
        format(value, decimals, self)
    }
}

impl Default for NumberFormatSpec {
    fn default() -> Self {
        Self {
            thousands: Separator::Comma,
            decimal: Separator::Period,
        }
    }
}

/// Guesses the separators from a format descriptor such as `"#,###.##"`.
///
/// A space groups with spaces; otherwise a comma groups and a period splits
/// decimals. When both `,` and `.` occur, the later one is the decimal
/// separator. This is a heuristic and never fails.
pub fn infer_format(descriptor: &str) -> NumberFormatSpec {
    let has_space = descriptor.chars().any(|c| Separator::Space.matches(c));
    let has_apostrophe = descriptor.contains('\'');
    let grouped_elsewhere = has_space || has_apostrophe;

    let decimal = match (descriptor.rfind(','), descriptor.rfind('.')) {
        (Some(comma), Some(period)) if comma > period => Separator::Comma,
        (Some(_), Some(_)) => Separator::Period,
        // "# ##0,00" splits on the comma, "#,###" groups with it
        (Some(_), None) if grouped_elsewhere => Separator::Comma,
        (Some(_), None) => Separator::Period,
        // "#.###" groups with periods
        (None, Some(_)) if !grouped_elsewhere => Separator::Comma,
        _ => Separator::Period,
    };

    let thousands = if has_space {
        Separator::Space
    } else if has_apostrophe {
        Separator::Apostrophe
    } else if decimal == Separator::Comma {
        Separator::Period
    } else {
        Separator::Comma
    };

    NumberFormatSpec { thousands, decimal }
}

/// Recovers a number from text rendered under `spec`.
///
/// Grouping separators are dropped, the decimal separator becomes `.`, and
/// what is left must be a plain decimal literal. No rounding happens here.
pub fn parse(text: &str, spec: &NumberFormatSpec) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut normalized: String = trimmed
        .chars()
        .filter(|c| !spec.thousands.matches(*c))
        .collect();
    if let Some(decimal) = spec.decimal.glyph() {
        if decimal != '.' {
            normalized = normalized.replace(decimal, ".");
        }
    }

    // f64::from_str also takes "inf" and "NaN", which are not quantities
    if !is_decimal_literal(&normalized) {
        return Err(ParseError::InvalidLiteral {
            input: trimmed.to_string(),
        });
    }

    let value: f64 = normalized.parse().map_err(|_| ParseError::InvalidLiteral {
        input: trimmed.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParseError::NotFinite {
            input: trimmed.to_string(),
        });
    }
    Ok(value)
}

/// Renders `value` with `decimals` fractional digits, grouped per `spec`.
pub fn format(value: f64, decimals: usize, spec: &NumberFormatSpec) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    // No "-0.00"
    if value < 0.0 && rendered.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }

    match spec.thousands.glyph() {
        Some(sep) => {
            let len = int_part.len();
            for (i, digit) in int_part.chars().enumerate() {
                if i > 0 && (len - i) % 3 == 0 {
                    out.push(sep);
                }
                out.push(digit);
            }
        }
        None => out.push_str(int_part),
    }

    if let Some(frac_part) = frac_part {
        out.push(spec.decimal.glyph().unwrap_or('.'));
        out.push_str(frac_part);
    }
    out
}

// [+-]? digits? ( . digits? )? ( [eE] [+-]? digits )?, with at least one
// mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
