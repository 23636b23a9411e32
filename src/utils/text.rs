use unicode_width::UnicodeWidthStr;

/// Canonical form used for cache keys and upstream requests.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Left-align `text` in a cell of `width` terminal columns.
pub fn pad_display(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    let mut padded = String::with_capacity(text.len() + width - current);
    padded.push_str(text);
    padded.extend(std::iter::repeat(' ').take(width - current));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol("  aapl "), "AAPL");
        assert_eq!(normalize_symbol("binance:btcusdt"), "BINANCE:BTCUSDT");
    }

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad_display("AB", 4), "AB  ");
        assert_eq!(pad_display("ABCDE", 3), "ABCDE");
    }
}
