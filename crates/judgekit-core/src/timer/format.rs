//! Clock text formatting.

/// Signed round clock: `MM:SS`, minutes padded to at least two digits,
/// a single leading `-` in overtime (`-00:05`, `-125:00`).
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// Turn clock used in the table-judge history: `M:SS`, minutes unpadded.
pub fn format_turn_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_clock() {
        assert_eq!(format_clock(1800), "30:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(4500), "75:00");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn negative_clock_has_single_leading_sign() {
        assert_eq!(format_clock(-5), "-00:05");
        assert_eq!(format_clock(-61), "-01:01");
        assert_eq!(format_clock(-7500), "-125:00");
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert!(format_clock(i64::MIN).starts_with('-'));
    }

    #[test]
    fn turn_clock() {
        assert_eq!(format_turn_clock(0), "0:00");
        assert_eq!(format_turn_clock(5), "0:05");
        assert_eq!(format_turn_clock(65), "1:05");
        assert_eq!(format_turn_clock(754), "12:34");
    }
}
