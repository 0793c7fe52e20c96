//! Presentation helpers
//!
//! Text and JSON rendering of command statuses, sense data, positions and
//! data buffers for the CLI.

use serde::Serialize;
use std::fmt::Write as _;

use crate::error::{Result, ScsiTapeError};
use crate::scsi::{BlockLimits, DensityDescriptor, DeviceStatus, Sense, TapePosition};
use crate::utils::format_size;

const BYTES_PER_LINE: usize = 16;

/// Classic hex dump: offset, hex bytes in two groups of eight, ASCII column
pub fn hex_dump(content: &[u8]) -> String {
    let mut out = String::new();

    for (i, chunk) in content.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}  ", i * BYTES_PER_LINE);

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            let _ = write!(out, "{:02x} ", byte);
        }

        // Padding for incomplete lines
        for j in chunk.len()..BYTES_PER_LINE {
            if j == 8 {
                out.push(' ');
            }
            out.push_str("   ");
        }

        out.push_str(" |");
        for byte in chunk {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            out.push(ch);
        }
        for _ in chunk.len()..BYTES_PER_LINE {
            out.push(' ');
        }
        out.push_str("|\n");
    }

    out
}

/// Render a serializable value as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ScsiTapeError::system(format!("JSON serialization error: {}", e)))
}

pub fn render_status(status: &DeviceStatus, json: bool) -> Result<String> {
    if json {
        to_json(status)
    } else {
        Ok(status.to_string())
    }
}

pub fn print_status(label: &str, status: &DeviceStatus, json: bool) -> Result<()> {
    let text = render_status(status, json)?;
    if json {
        println!("{}", text);
    } else {
        println!("== {} ==", label);
        println!("{}", text);
        println!();
    }
    Ok(())
}

/// Debug and field view of decoded sense data
pub fn render_sense(sense: &Sense, json: bool) -> Result<String> {
    if json {
        return to_json(sense);
    }
    Ok(format!(
        "== Debug Print ==\n{:#?}\n\n== Sense Print ==\n{}",
        sense, sense
    ))
}

pub fn render_position(position: &TapePosition, json: bool) -> Result<String> {
    if json {
        return to_json(position);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Tape Position:");
    let _ = writeln!(out, "  Partition: {}", position.partition);
    let _ = writeln!(out, "  Block: {}", position.block_number);
    if let Some(file_number) = position.file_number {
        let _ = writeln!(out, "  File: {}", file_number);
    }
    if let Some(set_number) = position.set_number {
        let _ = writeln!(out, "  Set: {}", set_number);
    }
    if let Some(last) = position.last_block_number {
        let _ = writeln!(out, "  Last block written: {}", last);
    }
    if let Some(objects) = position.objects_in_buffer {
        let _ = writeln!(out, "  Objects in buffer: {}", objects);
    }
    if let Some(bytes) = position.bytes_in_buffer {
        let _ = writeln!(out, "  Bytes in buffer: {}", format_size(u64::from(bytes)));
    }
    let _ = write!(
        out,
        "  BOP: {}  EOP: {}",
        position.beginning_of_partition, position.end_of_partition
    );
    Ok(out)
}

pub fn render_block_limits(limits: &BlockLimits, json: bool) -> Result<String> {
    if json {
        return to_json(limits);
    }

    Ok(match limits {
        BlockLimits::Range {
            granularity,
            maximum_block_length,
            minimum_block_length,
        } => format!(
            "Block Limits:\n  Granularity: 2^{}\n  Maximum block length: {} ({})\n  Minimum block length: {}",
            granularity,
            maximum_block_length,
            format_size(u64::from(*maximum_block_length)),
            minimum_block_length
        ),
        BlockLimits::MaximumLogicalObjectIdentifier(mloi) => {
            format!("Maximum logical object identifier: {}", mloi)
        }
    })
}

pub fn render_densities(densities: &[DensityDescriptor], json: bool) -> Result<String> {
    if json {
        return to_json(&densities);
    }

    let mut out = String::from("Supported Densities:");
    if densities.is_empty() {
        out.push_str("\n  (none reported)");
    }
    for density in densities {
        let _ = write!(
            out,
            "\n  0x{:02X} {} ({}): {} tracks, {} bits/mm, {}{}{}",
            density.primary_density_code,
            density.density_name,
            density.description,
            density.tracks,
            density.bits_per_mm,
            format_size(u64::from(density.capacity) * 1_000_000),
            if density.write_ok { "" } else { ", read only" },
            if density.default { ", default" } else { "" },
        );
    }
    Ok(out)
}
