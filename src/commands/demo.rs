//! Demo Command Handler
//!
//! Rewinds the tape and reads the first block twice into an 80 byte buffer,
//! printing each status and the buffer contents.

use scsi_tape::display;
use scsi_tape::error::Result;
use scsi_tape::scsi::commands::{Read6, Rewind};
use scsi_tape::scsi::{Device, DeviceStatus, Transport};
use serde::Serialize;
use tracing::info;

use super::{report, with_device, Options};

pub const DEMO_READ_LEN: u32 = 80;

#[derive(Debug, Serialize)]
pub struct DemoRead {
    pub status: DeviceStatus,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub rewind: DeviceStatus,
    pub reads: Vec<DemoRead>,
}

/// The core does not reposition between the two reads.
pub fn run<T: Transport>(device: &mut Device<T>) -> Result<DemoReport> {
    let rewind = device.issue_cmd(&Rewind::new())?;

    let read_cmd = Read6::variable(DEMO_READ_LEN);
    let mut reads = Vec::with_capacity(2);
    for _ in 0..2 {
        let mut buf = [0u8; DEMO_READ_LEN as usize];
        let status = device.issue_cmd_with_output(&read_cmd, &mut buf)?;
        reads.push(DemoRead {
            status,
            data: buf.to_vec(),
        });
    }

    Ok(DemoReport { rewind, reads })
}

pub async fn execute(device: String, options: Options) -> Result<()> {
    info!("Running demo sequence on {}", device);

    let demo = with_device(device, &options, |handle| run(handle)).await?;

    if options.json {
        println!("{}", display::to_json(&demo)?);
        return Ok(());
    }

    report("REWIND", &demo.rewind, &options)?;
    for (i, read) in demo.reads.iter().enumerate() {
        report(&format!("READ(6) #{}", i + 1), &read.status, &options)?;
        println!("Buffer:");
        print!("{}", display::hex_dump(&read.data));
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_blocking;
    use scsi_tape::scsi::sense::SenseKey;
    use scsi_tape::scsi::transport::stub::{FixedSense, StubReply, StubTransport};
    use scsi_tape::scsi::Outcome;

    #[tokio::test]
    async fn demo_rewinds_then_reads_twice() {
        let transport = StubTransport::with_replies([
            StubReply::good(),
            StubReply::good().with_data(vec![0x5A; 80]),
            StubReply::check_condition(
                FixedSense::new(SenseKey::NoSense, 0x00, 0x01)
                    .filemark()
                    .information(80)
                    .to_bytes(),
            ),
        ]);
        let log = transport.log();

        let demo = run_blocking(move || {
            let mut device = Device::with_transport(transport);
            run(&mut device)
        })
        .await
        .unwrap();

        assert!(demo.rewind.is_success());
        assert_eq!(demo.reads[0].data, vec![0x5A; 80]);
        assert_eq!(demo.reads[1].status.outcome(), Outcome::DeviceError);
        assert_eq!(demo.reads[1].status.information(), Some(80));
        assert_eq!(demo.reads[1].data, vec![0; 80]);

        let cdbs: Vec<Vec<u8>> = log.calls().into_iter().map(|c| c.cdb).collect();
        assert_eq!(
            cdbs,
            vec![
                vec![0x01, 0, 0, 0, 0, 0],
                vec![0x08, 0, 0, 0, 0x50, 0],
                vec![0x08, 0, 0, 0, 0x50, 0],
            ]
        );
        assert!(log.is_closed());
    }

    #[test]
    fn demo_report_serializes_data_as_hex() {
        let mut device = Device::with_transport(StubTransport::with_replies([
            StubReply::good(),
            StubReply::good().with_data(vec![0xAB, 0xCD]),
        ]));
        let demo = run(&mut device).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&display::to_json(&demo).unwrap()).unwrap();
        let data = json["reads"][0]["data"].as_str().unwrap();
        assert!(data.starts_with("abcd00"));
        assert_eq!(data.len(), 160);
    }
}
