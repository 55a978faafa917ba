use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For INR, 1 unit = 100 paise, so ₹50.00 = 5000 cents.
pub type Cents = i64;

/// GST rates are stored in basis points so rate arithmetic stays integral.
/// 1800 basis points = 18.00%, 250 = 2.50%.
pub type RateBps = i64;

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseMoneyError> {
    parse_scaled(input, 2)
}

/// Parse a GST percentage string into basis points.
/// Example: "18" -> 1800, "2.5" -> 250, "0.25" -> 25
pub fn parse_rate_bps(input: &str) -> Result<RateBps, ParseMoneyError> {
    let bps = parse_scaled(input, 2)?;
    if !(0..=10_000).contains(&bps) {
        return Err(ParseMoneyError::RateOutOfRange);
    }
    Ok(bps)
}

/// Format basis points as a percentage string.
/// Example: 1800 -> "18%", 250 -> "2.5%"
pub fn format_rate(bps: RateBps) -> String {
    if bps % 100 == 0 {
        format!("{}%", bps / 100)
    } else if bps % 10 == 0 {
        format!("{}.{}%", bps / 100, (bps % 100) / 10)
    } else {
        format!("{}.{:02}%", bps / 100, bps % 100)
    }
}

/// GST amount on a base amount, truncated to whole cents.
pub fn gst_cents(base_cents: Cents, rate_bps: RateBps) -> Cents {
    base_cents * rate_bps / 10_000
}

/// Split a GST amount into equal CGST and SGST halves.
/// An odd cent goes to the SGST half so the split conserves the total.
pub fn split_cgst_sgst(gst: Cents) -> (Cents, Cents) {
    let cgst = gst / 2;
    (cgst, gst - cgst)
}

/// Parse a decimal string into an integer scaled by 10^scale digits.
fn parse_scaled(input: &str, scale: usize) -> Result<i64, ParseMoneyError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');
    let factor = 10i64.pow(scale as u32);

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            // No decimal point, treat as whole units
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseMoneyError::InvalidFormat)?;
            let scaled = units * factor;
            Ok(if negative { -scaled } else { scaled })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseMoneyError::InvalidFormat)?
            };

            // Handle decimal part - pad or truncate to `scale` digits
            let decimal_str = parts[1];
            let fraction: i64 = if decimal_str.is_empty() {
                0
            } else if decimal_str.len() <= scale {
                let parsed: i64 = decimal_str
                    .parse()
                    .map_err(|_| ParseMoneyError::InvalidFormat)?;
                parsed * 10i64.pow((scale - decimal_str.len()) as u32)
            } else {
                decimal_str[..scale]
                    .parse()
                    .map_err(|_| ParseMoneyError::InvalidFormat)?
            };

            let scaled = units * factor + fraction;
            Ok(if negative { -scaled } else { scaled })
        }
        _ => Err(ParseMoneyError::InvalidFormat),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    InvalidFormat,
    RateOutOfRange,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoneyError::InvalidFormat => write!(f, "invalid money format"),
            ParseMoneyError::RateOutOfRange => write!(f, "rate must be between 0 and 100"),
        }
    }
}

impl std::error::Error for ParseMoneyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
    }

    #[test]
    fn test_parse_rate_bps() {
        assert_eq!(parse_rate_bps("18"), Ok(1800));
        assert_eq!(parse_rate_bps("2.5"), Ok(250));
        assert_eq!(parse_rate_bps("0.25"), Ok(25));
        assert_eq!(parse_rate_bps("0"), Ok(0));
        assert_eq!(parse_rate_bps("100"), Ok(10000));
        assert_eq!(parse_rate_bps("101"), Err(ParseMoneyError::RateOutOfRange));
        assert_eq!(parse_rate_bps("-1"), Err(ParseMoneyError::RateOutOfRange));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1800), "18%");
        assert_eq!(format_rate(250), "2.5%");
        assert_eq!(format_rate(25), "0.25%");
    }

    #[test]
    fn test_gst_cents() {
        assert_eq!(gst_cents(100_000, 1800), 18_000); // 1000.00 @ 18% = 180.00
        assert_eq!(gst_cents(100_000, 250), 2_500);
        assert_eq!(gst_cents(0, 1800), 0);
    }

    #[test]
    fn test_split_cgst_sgst_conserves_total() {
        assert_eq!(split_cgst_sgst(18_000), (9_000, 9_000));
        assert_eq!(split_cgst_sgst(101), (50, 51));
        let (cgst, sgst) = split_cgst_sgst(333);
        assert_eq!(cgst + sgst, 333);
    }
}
