//! Utility functions for the h5vlheap CLI

use anyhow::{Context, Result, bail};
use humansize::{DECIMAL, format_size as humansize_format};

/// Parses a byte offset or size given in decimal or `0x`-prefixed hex.
pub fn parse_u64(s: &str) -> Result<u64> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    value.with_context(|| format!("invalid number '{}'", s))
}

/// Parses a comma-separated list such as `4,4` or `0, 2`.
pub fn parse_list(s: &str) -> Result<Vec<u64>> {
    if s.trim().is_empty() {
        bail!("empty list");
    }
    s.split(',').map(parse_u64).collect()
}

/// Formats a byte count for display.
pub fn format_size(bytes: u64) -> String {
    humansize_format(bytes, DECIMAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("2048").unwrap(), 2048);
        assert_eq!(parse_u64("0x800").unwrap(), 2048);
        assert_eq!(parse_u64(" 0X10 ").unwrap(), 16);
        assert!(parse_u64("-1").is_err());
        assert!(parse_u64("0xzz").is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("4,4").unwrap(), vec![4, 4]);
        assert_eq!(parse_list("0, 2 ,0x3").unwrap(), vec![0, 2, 3]);
        assert!(parse_list("").is_err());
        assert!(parse_list("1,,2").is_err());
    }
}
