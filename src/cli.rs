use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::scsi::commands::{AllowOverwrite, FormatMedium};
use crate::scsi::SpaceType;

#[derive(Parser, Debug)]
#[command(name = "scsitape")]
#[command(about = "Issue SCSI commands to tape devices and decode their status")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Device configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print statuses as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewind, then read the first 80 bytes twice
    Demo {
        /// Tape device path (e.g. /dev/nst0 or \\.\TAPE0)
        #[arg(value_name = "DEVICE")]
        device: String,
    },

    /// Rewind to the beginning of the partition
    Rewind {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Return before the rewind has finished
        #[arg(long)]
        immed: bool,
    },

    /// Read one block (variable mode) or a run of fixed blocks
    Read {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Bytes in variable mode, blocks in fixed mode
        #[arg(short, long, default_value = "80")]
        length: u32,

        /// Fixed block length; enables fixed-block mode
        #[arg(short, long)]
        block_size: Option<u32>,

        /// Suppress incorrect length indicator
        #[arg(long)]
        sili: bool,

        /// Write the data read to this file instead of a hex dump
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the contents of a file as one block or a run of fixed blocks
    Write {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// File holding the data to write
        #[arg(short, long)]
        input: PathBuf,

        /// Fixed block length; enables fixed-block mode
        #[arg(short, long)]
        block_size: Option<u32>,
    },

    /// Write filemarks at the current position
    WriteFilemarks {
        #[arg(value_name = "DEVICE")]
        device: String,

        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        #[arg(long)]
        immed: bool,
    },

    /// Space over blocks or filemarks, or to end of data
    Space {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// What to space over
        #[arg(short, long, value_enum, default_value = "blocks")]
        unit: SpaceUnit,

        /// Signed count; negative moves toward the beginning
        #[arg(short = 'n', long, default_value = "1", allow_hyphen_values = true)]
        count: i32,
    },

    /// Locate to a logical object identifier
    Locate {
        #[arg(value_name = "DEVICE")]
        device: String,

        #[arg(value_name = "BLOCK")]
        block: u32,

        /// Change to this partition first
        #[arg(short, long)]
        partition: Option<u8>,

        #[arg(long)]
        immed: bool,
    },

    /// Report the current position
    Position {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Use the long form response
        #[arg(long)]
        long: bool,
    },

    /// Test unit ready and report block limits
    Status {
        #[arg(value_name = "DEVICE")]
        device: String,
    },

    /// Load or unload the medium
    Load {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Unload instead of load
        #[arg(short, long)]
        unload: bool,

        #[arg(long)]
        immed: bool,
    },

    /// Erase from the current position, or from a given position
    Erase {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Erase to the end of the partition
        #[arg(long)]
        long: bool,

        #[arg(long)]
        immed: bool,

        /// Erase method (0-3)
        #[arg(short, long, default_value = "0")]
        method: u8,

        /// Partition to erase from; selects ERASE(16)
        #[arg(short, long)]
        partition: Option<u8>,

        /// Logical object identifier to erase from; selects ERASE(16)
        #[arg(short, long)]
        object: Option<u64>,
    },

    /// Format the medium, optionally partitioning it
    FormatMedium {
        #[arg(value_name = "DEVICE")]
        device: String,

        #[arg(short, long, value_enum, default_value = "default")]
        format: FormatKind,

        /// Verify the medium after formatting
        #[arg(long)]
        verify: bool,

        #[arg(long)]
        immed: bool,

        /// File holding format parameters to send with the command
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Control overwriting of data before end of data
    AllowOverwrite {
        #[arg(value_name = "DEVICE")]
        device: String,

        #[arg(short, long, value_enum, default_value = "current-position")]
        mode: OverwriteMode,

        #[arg(short, long, default_value = "0")]
        partition: u8,

        #[arg(short, long, default_value = "0")]
        object: u64,
    },

    /// List the densities the drive supports
    Density {
        #[arg(value_name = "DEVICE")]
        device: String,

        /// Only densities the mounted medium supports
        #[arg(long)]
        media: bool,
    },

    /// Decode raw sense bytes given as hex (from arguments or stdin)
    Sense {
        /// Hex bytes, e.g. "70 00 00 00 00 00 00 0a"
        #[arg(value_name = "HEX")]
        bytes: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceUnit {
    Blocks,
    Filemarks,
    SequentialFilemarks,
    EndOfData,
}

impl From<SpaceUnit> for SpaceType {
    fn from(unit: SpaceUnit) -> Self {
        match unit {
            SpaceUnit::Blocks => SpaceType::Blocks,
            SpaceUnit::Filemarks => SpaceType::FileMarks,
            SpaceUnit::SequentialFilemarks => SpaceType::SequentialFileMarks,
            SpaceUnit::EndOfData => SpaceType::EndOfData,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    Default,
    Partition,
    DefaultThenPartition,
}

impl From<FormatKind> for u8 {
    fn from(kind: FormatKind) -> Self {
        match kind {
            FormatKind::Default => FormatMedium::DEFAULT,
            FormatKind::Partition => FormatMedium::PARTITION_VOLUME,
            FormatKind::DefaultThenPartition => FormatMedium::DEFAULT_THEN_PARTITION,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteMode {
    Disabled,
    CurrentPosition,
    Format,
}

impl From<OverwriteMode> for u8 {
    fn from(mode: OverwriteMode) -> Self {
        match mode {
            OverwriteMode::Disabled => AllowOverwrite::DISABLED,
            OverwriteMode::CurrentPosition => AllowOverwrite::CURRENT_POSITION,
            OverwriteMode::Format => AllowOverwrite::FORMAT,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scsitape", "rewind", "/dev/nst0", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Rewind { ref device, immed: false } if device == "/dev/nst0"
        ));
    }

    #[test]
    fn space_accepts_negative_count() {
        let cli = Cli::try_parse_from([
            "scsitape", "space", "/dev/nst0", "--unit", "filemarks", "-n", "-2",
        ])
        .unwrap();
        match cli.command {
            Commands::Space { unit, count, .. } => {
                assert_eq!(SpaceType::from(unit), SpaceType::FileMarks);
                assert_eq!(count, -2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn read_defaults_to_80_bytes() {
        let cli = Cli::try_parse_from(["scsitape", "read", "/dev/nst0"]).unwrap();
        match cli.command {
            Commands::Read {
                length, block_size, ..
            } => {
                assert_eq!(length, 80);
                assert_eq!(block_size, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn device_is_required() {
        assert!(Cli::try_parse_from(["scsitape", "status"]).is_err());
    }

    #[test]
    fn write_requires_input_file() {
        assert!(Cli::try_parse_from(["scsitape", "write", "/dev/nst0"]).is_err());

        let cli = Cli::try_parse_from([
            "scsitape", "write", "/dev/nst0", "-i", "block.bin", "-b", "512",
        ])
        .unwrap();
        match cli.command {
            Commands::Write {
                input, block_size, ..
            } => {
                assert_eq!(input, PathBuf::from("block.bin"));
                assert_eq!(block_size, Some(512));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn erase_and_format_options() {
        let cli = Cli::try_parse_from([
            "scsitape", "erase", "/dev/nst0", "--long", "-p", "1", "-o", "64",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Erase {
                long: true,
                partition: Some(1),
                object: Some(64),
                ..
            }
        ));

        let cli = Cli::try_parse_from([
            "scsitape", "format-medium", "/dev/nst0", "--format", "default-then-partition",
        ])
        .unwrap();
        match cli.command {
            Commands::FormatMedium { format, input, .. } => {
                assert_eq!(u8::from(format), FormatMedium::DEFAULT_THEN_PARTITION);
                assert!(input.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn allow_overwrite_defaults_to_current_position() {
        let cli = Cli::try_parse_from(["scsitape", "allow-overwrite", "/dev/nst0"]).unwrap();
        match cli.command {
            Commands::AllowOverwrite { mode, object, .. } => {
                assert_eq!(u8::from(mode), AllowOverwrite::CURRENT_POSITION);
                assert_eq!(object, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
