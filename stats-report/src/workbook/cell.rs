//! Displayed text of a worksheet cell

use calamine::Data;

/// Significant digits shown by the General number format
const GENERAL_DIGITS: i32 = 11;
/// Magnitudes from here on switch to scientific notation
const SCIENTIFIC_FROM: f64 = 1e11;
/// Non-zero magnitudes below this switch to scientific notation
const SCIENTIFIC_BELOW: f64 = 1e-9;

/// Render a cell the way a spreadsheet shows it
///
/// Numbers follow the General format: at most 11 significant digits with
/// trailing zeros trimmed, and scientific notation (`1.23457E+11`) for very
/// large or very small magnitudes. Booleans read `TRUE`/`FALSE`, dates render
/// as ISO dates. Formulas are never evaluated; their cached value is what
/// calamine hands us.
pub fn display_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) if (*i as f64).abs() >= SCIENTIFIC_FROM => scientific(*i as f64),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => general_number(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if dt.is_datetime() => {
                if value.time() == chrono::NaiveTime::MIN {
                    value.format("%Y-%m-%d").to_string()
                } else {
                    value.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            _ => dt.to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn general_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= SCIENTIFIC_FROM || magnitude < SCIENTIFIC_BELOW {
        return scientific(value);
    }

    let exponent = magnitude.log10().floor() as i32;
    let decimals = (GENERAL_DIGITS - 1 - exponent).max(0) as usize;
    let text = trim_fraction(format!("{:.*}", decimals, value));

    // 99999999999.9 rounds up past the switch point
    match text.parse::<f64>() {
        Ok(rounded) if rounded.abs() >= SCIENTIFIC_FROM => scientific(value),
        _ => text,
    }
}

/// Six significant digits and a signed two-digit exponent
fn scientific(value: f64) -> String {
    let text = format!("{:.5e}", value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{}E{}{:02}",
        trim_fraction(mantissa.to_string()),
        sign,
        exponent.abs()
    )
}

fn trim_fraction(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// A cell is blank when its displayed text is empty or only whitespace
pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => display_text(cell).trim().is_empty(),
    }
}
