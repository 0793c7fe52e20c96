mod commands;

use scsi_tape::cli::{Cli, Commands};
use scsi_tape::config::DeviceConfig;
use scsi_tape::error::Result;
use scsi_tape::logger;
use scsi_tape::scsi::commands::{AllowOverwrite, FormatMedium};
use tracing::{debug, error, info};

use crate::commands::media::EraseRequest;
use crate::commands::read::ReadRequest;
use crate::commands::Options;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse_args();

    // Initialize logging system
    logger::init(args.verbose, args.json)?;

    debug!("scsitape starting");

    match run(args).await {
        Ok(_) => {
            info!("Operation completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Operation failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let config = match &args.config {
        Some(path) => DeviceConfig::load(path)?,
        None => DeviceConfig::default(),
    };
    let options = Options {
        config,
        json: args.json,
    };

    match args.command {
        Commands::Demo { device } => commands::demo::execute(device, options).await,

        Commands::Rewind { device, immed } => {
            commands::position::rewind(device, immed, options).await
        }

        Commands::Read {
            device,
            length,
            block_size,
            sili,
            output,
        } => {
            let request = ReadRequest {
                length,
                block_size,
                sili,
            };
            commands::read::execute(device, request, output, options).await
        }

        Commands::Write {
            device,
            input,
            block_size,
        } => commands::write::write(device, input, block_size, options).await,

        Commands::WriteFilemarks {
            device,
            count,
            immed,
        } => commands::write::filemarks(device, count, immed, options).await,

        Commands::Space {
            device,
            unit,
            count,
        } => commands::position::space(device, unit.into(), count, options).await,

        Commands::Locate {
            device,
            block,
            partition,
            immed,
        } => commands::position::locate(device, block, partition, immed, options).await,

        Commands::Position { device, long } => {
            commands::position::position(device, long, options).await
        }

        Commands::Status { device } => commands::media::status(device, options).await,

        Commands::Load {
            device,
            unload,
            immed,
        } => commands::media::load(device, unload, immed, options).await,

        Commands::Erase {
            device,
            long,
            immed,
            method,
            partition,
            object,
        } => {
            let request = EraseRequest {
                long,
                immed,
                method,
                partition,
                object,
            };
            commands::media::erase(device, request, options).await
        }

        Commands::FormatMedium {
            device,
            format,
            verify,
            immed,
            input,
        } => {
            let cmd = FormatMedium {
                verify,
                immed,
                ..FormatMedium::new(format.into())
            };
            commands::media::format(device, cmd, input, options).await
        }

        Commands::AllowOverwrite {
            device,
            mode,
            partition,
            object,
        } => {
            let cmd = AllowOverwrite {
                allow_overwrite: mode.into(),
                partition,
                logical_object_identifier: object,
            };
            commands::media::allow_overwrite(device, cmd, options).await
        }

        Commands::Density { device, media } => {
            commands::media::density(device, media, options).await
        }

        Commands::Sense { bytes } => commands::sense::execute(bytes, options).await,
    }
}
