//! Human-readable formatting

const KILOBYTE: f64 = 1024.0;

/// Render a byte count the way the UI shows it: `312 bytes`, `1.5 KB`,
/// `2.34 MB`. Trailing zero decimals are trimmed.
pub fn format_size(size: u64) -> String {
    if size < 1024 {
        return format!("{size} bytes");
    }

    let mut value = size as f64 / KILOBYTE;
    let mut unit = "KB";
    for next in ["MB", "GB", "TB", "PB"] {
        if value > KILOBYTE {
            value /= KILOBYTE;
            unit = next;
        } else {
            break;
        }
    }

    format!("{} {}", trim_decimals(value), unit)
}

fn trim_decimals(value: f64) -> String {
    format!("{value:.2}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
