//! Number and size formatting for status lines

/// Format a count with `,` grouping, e.g. `1,500`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format elapsed milliseconds with two decimals
pub fn format_elapsed_ms(ms: f64) -> String {
    format!("{:.2}ms", ms)
}

/// Human readable file size: `Bytes`, `KB`, `MB` or `GB` with up to two decimals
pub fn format_bytes(bytes: u64) -> String {
    const SIZES: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut i = 0;
    while i + 1 < SIZES.len() && bytes >= 1u64 << (10 * (i + 1)) {
        i += 1;
    }
    let value = (bytes as f64 / (1u64 << (10 * i)) as f64 * 100.0).round() / 100.0;

    format!("{} {}", value, SIZES[i])
}
