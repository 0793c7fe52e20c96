//! Utility functions for scsi-tape

use crate::error::{Result, ScsiTapeError};

/// Format a byte count in human-readable form (B, KB, MB, GB, TB)
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if size == 0 {
        return "0 B".to_string();
    }

    let mut size_f = size as f64;
    let mut unit_index = 0;

    while size_f >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size_f /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size_f, UNITS[unit_index])
    }
}

/// Parse hex bytes such as `"70 00 05"`, `"0x70,0x00"` or `"700005"`.
///
/// Tokens are separated by whitespace or commas; a token longer than two
/// digits is read as a run of bytes.
pub fn parse_hex_bytes<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    for token in tokens
        .iter()
        .flat_map(|t| t.as_ref().split(|c: char| c.is_whitespace() || c == ','))
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        let decoded = if digits.len() % 2 == 1 {
            hex::decode(format!("0{}", digits))
        } else {
            hex::decode(digits)
        }
        .map_err(|e| ScsiTapeError::parse(format!("invalid hex value '{}': {}", token, e)))?;

        bytes.extend(decoded);
    }

    Ok(bytes)
}
