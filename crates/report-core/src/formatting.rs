/// Bytes in one mebibyte, the unit of every index size in the report.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Round to 2 decimal places.
///
/// # Examples
///
/// ```
/// use report_core::formatting::round2;
///
/// assert_eq!(round2(12.3456), 12.35);
/// assert_eq!(round2(0.0), 0.0);
/// assert_eq!(round2(-1.234), -1.23);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a byte count to MB (base-2), unrounded.
///
/// # Examples
///
/// ```
/// use report_core::formatting::bytes_to_mb;
///
/// assert_eq!(bytes_to_mb(2_097_152.0), 2.0);
/// assert_eq!(bytes_to_mb(0.0), 0.0);
/// ```
pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / BYTES_PER_MB
}

/// Calculate `(part / whole) * 100`, rounded to 2 decimals.
///
/// Returns `0.0` when `whole` is zero. The result is not clamped, so a `part`
/// larger than `whole` yields more than 100.
///
/// # Examples
///
/// ```
/// use report_core::formatting::percentage;
///
/// assert_eq!(percentage(250.0, 500.0), 50.0);
/// assert_eq!(percentage(1200.0, 1000.0), 120.0);
/// assert_eq!(percentage(10.0, 0.0), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round2(part / whole * 100.0)
    } else {
        0.0
    }
}

/// Format a byte count with a binary unit suffix.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.2} {}", value, unit)
}

/// Format a percentage with 2 decimals, e.g. `"42.50%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
