//! Transport clock formatting.

/// Format a position in seconds as `m:ss`, the way the transport bar shows it.
///
/// Fractions are truncated. Negative, `NaN` and infinite inputs render as
/// `0:00` so an unknown duration never prints garbage.
#[must_use]
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.9), "0:09");
        assert_eq!(format_clock(75.0), "1:15");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn unknown_or_negative_renders_zero() {
        assert_eq!(format_clock(f64::NAN), "0:00");
        assert_eq!(format_clock(f64::INFINITY), "0:00");
        assert_eq!(format_clock(-4.0), "0:00");
    }
}
