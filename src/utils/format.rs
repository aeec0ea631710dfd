//! Display formatting for dashboard values.
//!
//! Currency uses the Indian numbering units the frontend renders:
//! B (1e9), Cr (1e7), Lac (1e5) and K (1e3).

const BILLION: f64 = 1e9;
const CRORE: f64 = 1e7;
const LAKH: f64 = 1e5;
const THOUSAND: f64 = 1e3;

/// Format a rupee amount with the largest fitting unit and two decimals.
///
/// Non-finite input renders as `"0"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let (scaled, suffix) = if abs >= BILLION {
        (abs / BILLION, " B")
    } else if abs >= CRORE {
        (abs / CRORE, " Cr")
    } else if abs >= LAKH {
        (abs / LAKH, " Lac")
    } else if abs >= THOUSAND {
        (abs / THOUSAND, " K")
    } else {
        (abs, "")
    };

    format!("{}₹{:.2}{}", sign, scaled, suffix)
}

/// Format a textual amount. Anything that does not parse as a number renders as `"0"`.
pub fn format_currency_str(value: &str) -> String {
    match value.trim().replace(',', "").parse::<f64>() {
        Ok(v) => format_currency(v),
        Err(_) => "0".to_string(),
    }
}

/// `12.346` -> `"12.35%"`
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{:.2}%", value)
}

/// Return-on-ad-spend style multiplier, `3.2` -> `"3.20x"`
pub fn format_multiplier(value: f64) -> String {
    if !value.is_finite() {
        return "0x".to_string();
    }
    format!("{:.2}x", value)
}

/// Signed percentage change; `None` (no comparable base) renders as `"-"`.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c.is_finite() => format!("{:+.1}%", c),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_units() {
        assert_eq!(format_currency(1_500_000_000.0), "₹1.50 B");
        assert_eq!(format_currency(15_000_000.0), "₹1.50 Cr");
        assert_eq!(format_currency(150_000.0), "₹1.50 Lac");
        assert_eq!(format_currency(1_500.0), "₹1.50 K");
        assert_eq!(format_currency(500.0), "₹500.00");
    }

    #[test]
    fn test_currency_unit_boundaries() {
        assert_eq!(format_currency(1_000.0), "₹1.00 K");
        assert_eq!(format_currency(999.99), "₹999.99");
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(-1_500.0), "-₹1.50 K");
    }

    #[test]
    fn test_non_numeric_input_renders_zero() {
        assert_eq!(format_currency(f64::NAN), "0");
        assert_eq!(format_currency_str("abc"), "0");
        assert_eq!(format_currency_str(""), "0");
        assert_eq!(format_currency_str("12abc"), "0");
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(format_currency_str(" 1,500 "), "₹1.50 K");
        assert_eq!(format_currency_str("15000000"), "₹1.50 Cr");
        assert_eq!(format_currency_str("-1,50,000.00"), "-₹1.50 Lac");
    }

    #[test]
    fn test_percent_and_change() {
        assert_eq!(format_percent(12.346), "12.35%");
        assert_eq!(format_multiplier(3.2), "3.20x");
        assert_eq!(format_change(Some(12.34)), "+12.3%");
        assert_eq!(format_change(Some(-5.0)), "-5.0%");
        assert_eq!(format_change(None), "-");
    }
}
