//! Human-readable byte sizes.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Parse sizes like `512`, `64KB`, `256MB`, `2GB` (binary units, case-insensitive).
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim().to_ascii_uppercase();
    let (number, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, GB)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, MB)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, KB)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    number.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

/// Format a byte count with the largest fitting binary unit.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a byte count losslessly in the largest unit dividing it evenly,
/// in the form [`parse_size`] reads back.
pub fn format_size_exact(bytes: u64) -> String {
    match bytes {
        0 => "0".to_string(),
        b if b % GB == 0 => format!("{}GB", b / GB),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => b.to_string(),
    }
}
