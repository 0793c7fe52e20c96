//! Sense Command Handler
//!
//! Handles the `sense` subcommand: decode raw sense bytes given as hex on
//! the command line, or on stdin when no arguments are given.

use scsi_tape::display;
use scsi_tape::error::Result;
use scsi_tape::scsi::Sense;
use scsi_tape::utils::parse_hex_bytes;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::Options;

pub fn decode_hex<S: AsRef<str>>(tokens: &[S]) -> Result<Sense> {
    let bytes = parse_hex_bytes(tokens)?;
    debug!("Decoding {} sense bytes", bytes.len());
    Ok(Sense::from_buf(&bytes))
}

pub async fn execute(bytes: Vec<String>, options: Options) -> Result<()> {
    let tokens = if bytes.is_empty() {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await?;
        vec![input]
    } else {
        bytes
    };

    let sense = decode_hex(&tokens)?;
    if sense.is_malformed() {
        warn!("Sense data is malformed or truncated");
    }

    println!("{}", display::render_sense(&sense, options.json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scsi_tape::scsi::{SenseFormat, SenseKey};

    #[test]
    fn decodes_fixed_sense_from_hex() {
        let sense = decode_hex(&[
            "70 00 03 00 00 00 00 0a 00 00 00 00 11 00 00 00 00 00",
        ])
        .unwrap();
        assert_eq!(sense.format, SenseFormat::Fixed);
        assert_eq!(sense.key, SenseKey::MediumError);
        assert_eq!(sense.description(), Some("unrecovered read error"));
    }

    #[test]
    fn garbage_is_flagged_not_rejected() {
        let sense = decode_hex(&["01 02"]).unwrap();
        assert!(sense.is_malformed());
    }

    #[test]
    fn bad_hex_is_a_parse_error() {
        assert!(decode_hex(&["70 0g"]).is_err());
    }
}
