// Default gateway extraction from network configuration output
// Pure text parsing; never runs a process itself.

/// First non-empty default gateway in `ipconfig` or `ip route` output
///
/// Handles both `Default Gateway . . . . : 192.168.1.1` (Windows, label
/// matched case-insensitively) and `default via 192.168.1.1 dev eth0` (Linux).
pub fn parse_default_gateway(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim();
        if trimmed.to_ascii_lowercase().contains("default gateway") {
            return trimmed
                .split_once(':')
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string);
        }

        let mut words = trimmed.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("default"), Some("via"), Some(address)) => Some(address.to_string()),
            _ => None,
        }
    })
}
