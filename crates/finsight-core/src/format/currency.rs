//! Currency formatting
//!
//! All money in the app is INR, formatted with zero decimal places and
//! Indian digit grouping (last three digits, then groups of two):
//! 1234567 renders as ₹12,34,567.

/// Format an amount as an INR string
///
/// `None` and non-finite values format as the zero string rather than
/// erroring - missing data is common in chart/table cells.
pub fn format_inr(value: Option<f64>) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let rounded = value.abs().round() as u64;
    let grouped = group_indian(rounded);
    if value < 0.0 && rounded > 0 {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

/// Apply Indian digit grouping to a non-negative integer
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = Vec::new();
    let head_bytes = head.as_bytes();
    let mut end = head_bytes.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(head[start..end].to_string());
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts_ungrouped() {
        assert_eq!(format_inr(Some(0.0)), "₹0");
        assert_eq!(format_inr(Some(999.0)), "₹999");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(Some(1500.0)), "₹1,500");
        assert_eq!(format_inr(Some(150000.0)), "₹1,50,000");
        assert_eq!(format_inr(Some(12345678.0)), "₹1,23,45,678");
    }

    #[test]
    fn test_rounds_to_zero_decimals() {
        assert_eq!(format_inr(Some(1499.5)), "₹1,500");
        assert_eq!(format_inr(Some(1499.4)), "₹1,499");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_inr(Some(-22000.0)), "-₹22,000");
        // Rounds to zero: no negative zero
        assert_eq!(format_inr(Some(-0.2)), "₹0");
    }

    #[test]
    fn test_missing_value_formats_as_zero() {
        assert_eq!(format_inr(None), "₹0");
        assert_eq!(format_inr(Some(f64::NAN)), "₹0");
    }
}
