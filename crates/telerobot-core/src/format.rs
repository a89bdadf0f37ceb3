//! Human-readable formatting for the uptime and memory replies.

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

const KILOBYTE: u64 = 1_024;
const MEGABYTE: u64 = 1_048_576;

/// Formats an age in seconds as `DD:HH:MM:SS`.
pub fn format_uptime(age_seconds: u64) -> String {
    let days = age_seconds / SECONDS_PER_DAY;
    let hours = (age_seconds / SECONDS_PER_HOUR) % 24;
    let minutes = (age_seconds / SECONDS_PER_MINUTE) % 60;
    let seconds = age_seconds % SECONDS_PER_MINUTE;
    format!("{days:02}:{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats a byte count as bytes, kilobytes, or megabytes by magnitude.
///
/// Scaled values are rounded to two decimals with trailing zeros trimmed,
/// so 2048 renders as `2 kilobytes` and 1536 as `1.5 kilobytes`.
pub fn format_byte_size(bytes: u64) -> String {
    if bytes < KILOBYTE {
        format!("{bytes} bytes")
    } else if bytes < MEGABYTE {
        format!("{} kilobytes", scale(bytes, KILOBYTE))
    } else {
        format!("{} megabytes", scale(bytes, MEGABYTE))
    }
}

fn scale(bytes: u64, unit: u64) -> String {
    let scaled = bytes as f64 / unit as f64;
    let mut text = format!("{scaled:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{format_byte_size, format_uptime};

    #[test]
    fn unit_format_uptime_decomposes_day_boundary() {
        // 1 day, 1 hour, 1 minute, 1 second.
        assert_eq!(format_uptime(90_061), "01:01:01:01");
    }

    #[test]
    fn unit_format_uptime_zero_and_rollover() {
        assert_eq!(format_uptime(0), "00:00:00:00");
        assert_eq!(format_uptime(59), "00:00:00:59");
        assert_eq!(format_uptime(60), "00:00:01:00");
        // 49 hours becomes 2 days 1 hour, not 49 hours.
        assert_eq!(format_uptime(49 * 3_600), "02:01:00:00");
    }

    #[test]
    fn unit_format_byte_size_magnitude_thresholds() {
        assert_eq!(format_byte_size(512), "512 bytes");
        assert_eq!(format_byte_size(1_023), "1023 bytes");
        assert_eq!(format_byte_size(2_048), "2 kilobytes");
        assert_eq!(format_byte_size(2_097_152), "2 megabytes");
    }

    #[test]
    fn unit_format_byte_size_trims_trailing_zeros() {
        assert_eq!(format_byte_size(1_536), "1.5 kilobytes");
        assert_eq!(format_byte_size(1_049_000), "1 megabytes");
        assert_eq!(format_byte_size(2_621_440), "2.5 megabytes");
    }
}
