// Helper functions for UTF-16 string operations
pub fn utf8_to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

pub fn utf16_to_utf8(v: &[u16]) -> String {
    String::from_utf16_lossy(v)
}

/// WhiteSpace and LineTerminator code points accepted around numeric strings.
pub fn is_js_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{0085}')
}

/// Canonical array-index form of a property name ("0", "1", ... but not "01" or "-0").
pub fn canonical_index(name: &str) -> Option<u32> {
    let index = name.parse::<u32>().ok()?;
    if index.to_string() == name { Some(index) } else { None }
}
