const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count using the largest binary unit that keeps the value below 1024
///
/// Never fails: negative or NaN input is rendered as `"<bytes> B"`.
pub fn human_readable_size(bytes: f64) -> String {
    if bytes == 0.0 {
        return "0 B".to_string();
    }
    if bytes.is_nan() || bytes < 0.0 {
        return format!("{} B", bytes);
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, SIZE_UNITS[unit])
}
