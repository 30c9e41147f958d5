/// `MM:SS`, growing to `H:MM:SS` past an hour
pub fn format_clock(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Whole minutes, rounding any started minute up
pub fn minutes_ceil(secs: u32) -> u32 {
    secs.div_ceil(60)
}

/// "1 minute" / "12 minutes"
pub fn pluralize(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(180), "03:00");
        assert_eq!(format_clock(3_725), "1:02:05");
    }

    #[test]
    fn test_minutes_ceil() {
        assert_eq!(minutes_ceil(0), 0);
        assert_eq!(minutes_ceil(1), 1);
        assert_eq!(minutes_ceil(60), 1);
        assert_eq!(minutes_ceil(61), 2);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "round"), "1 round");
        assert_eq!(pluralize(3, "round"), "3 rounds");
    }
}
