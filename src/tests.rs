#[cfg(test)]
mod scenario_tests {
    use crate::error::{ScsiTapeError, TransportError};
    use crate::scsi::commands::{Read16, Read6, Rewind, Space16, Space6, Write6};
    use crate::scsi::sense::SenseKey;
    use crate::scsi::transport::stub::{FixedSense, StubReply, StubTransport};
    use crate::scsi::{decode, CommandDetail, CommandKind, DataBuffer, Device, Outcome, SpaceType};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_rewind_success() {
        let transport = StubTransport::with_replies([StubReply::good()]);
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let status = device.issue_cmd(&Rewind { immed: false }).unwrap();

        assert_eq!(status.outcome(), Outcome::Success);
        assert!(status.sense().is_none());
        assert_eq!(status.kind(), CommandKind::Rewind);
        assert_eq!(log.calls()[0].cdb, vec![0x01, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read6_short_read_reports_residue() {
        let sense = FixedSense::new(SenseKey::NoSense, 0x00, 0x00)
            .incorrect_length()
            .information(80)
            .to_bytes();
        let transport = StubTransport::with_replies([StubReply::check_condition(sense)]);
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 80];
        let status = device
            .issue_cmd_with_output(&Read6::variable(80), &mut buf)
            .unwrap();

        assert_eq!(status.outcome(), Outcome::DeviceError);
        assert_eq!(status.sense().unwrap().key, SenseKey::NoSense);
        assert_eq!(status.sense().unwrap().key.to_string(), "no sense");
        assert_eq!(status.information(), Some(80));
        assert_eq!(status.residual(), 80);
        assert_eq!(buf, [0u8; 80]);
    }

    #[test]
    fn test_read6_without_valid_information_reports_none() {
        let sense = FixedSense::new(SenseKey::NoSense, 0x00, 0x00)
            .incorrect_length()
            .to_bytes();
        let transport = StubTransport::with_replies([StubReply::check_condition(sense)]);
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 80];
        let status = device
            .issue_cmd_with_output(&Read6::variable(80), &mut buf)
            .unwrap();

        assert!(!status.sense().unwrap().valid);
        assert_eq!(status.information(), None);
    }

    #[test]
    fn test_read6_fills_buffer_on_success() {
        let data: Vec<u8> = (0..80u8).collect();
        let transport = StubTransport::with_replies([StubReply::good().with_data(data.clone())]);
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 80];
        let status = device
            .issue_cmd_with_output(&Read6::variable(80), &mut buf)
            .unwrap();

        assert!(status.is_success());
        assert_eq!(status.residual(), 0);
        assert_eq!(buf.to_vec(), data);
    }

    #[test]
    fn test_partial_read_keeps_tail_of_buffer() {
        let data: Vec<u8> = (1..=40u8).collect();
        let transport = StubTransport::with_replies([StubReply::good().with_data(data.clone())]);
        let mut device = Device::with_transport(transport);

        let mut buf = [0xFFu8; 80];
        let status = device
            .issue_cmd_with_output(&Read6::variable(80), &mut buf)
            .unwrap();

        assert_eq!(status.residual(), 40);
        assert_eq!(&buf[..40], data.as_slice());
        assert!(buf[40..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_capacity_violation_never_reaches_transport() {
        let transport = StubTransport::new();
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 40];
        let err = device
            .issue_cmd_with_output(&Read6::variable(80), &mut buf)
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));

        let err = device
            .issue_cmd_with_input(&Write6::fixed(2, 512), &[0u8; 1000])
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));

        assert_eq!(log.call_count(), 0);
        assert!(device.is_open());
    }

    #[test]
    fn test_invalid_field_never_reaches_transport() {
        let transport = StubTransport::new();
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let err = device
            .issue_cmd(&Space6::new(SpaceType::Blocks, 1 << 23))
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));
        assert_eq!(log.call_count(), 0);
    }

    #[test]
    fn test_sixteen_byte_commands_through_device() {
        let transport = StubTransport::with_replies([
            StubReply::good().with_data(vec![0x42; 32]),
            StubReply::good(),
        ]);
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        let mut buf = [0u8; 32];
        let status = device
            .issue_cmd_with_output(&Read16::variable(0, 1000, 32), &mut buf)
            .unwrap();
        assert!(status.is_success());
        assert_eq!(status.kind(), CommandKind::Read16);
        assert_eq!(buf, [0x42; 32]);

        let space = Space16::new(SpaceType::Blocks, -3).starting_at(1, 77);
        let err = device.issue_cmd(&space).unwrap_err();
        assert!(matches!(err, ScsiTapeError::InvalidArgument(_)));

        let status = device
            .issue_cmd_with_input(&space, &space.parameter_list())
            .unwrap();
        assert!(status.is_success());

        let calls = log.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].cdb.len(), 16);
        assert_eq!(calls[0].cdb[0], 0x88);
        assert_eq!(calls[1].cdb[0], 0x91);
        assert_eq!(calls[1].written.len(), 16);
        assert_eq!(calls[1].written[15], 77);
    }

    #[test]
    fn test_close_is_idempotent() {
        let transport = StubTransport::new();
        let log = transport.log();
        let mut device = Device::with_transport(transport);

        device.close();
        assert!(log.is_closed());
        device.close();
        assert!(!device.is_open());

        let err = device.issue_cmd(&Rewind::new()).unwrap_err();
        assert!(matches!(err, ScsiTapeError::ClosedHandle));

        let mut buf = [0u8; 80];
        let err = device
            .issue(&Read6::variable(80), DataBuffer::FromDevice(&mut buf))
            .unwrap_err();
        assert!(matches!(err, ScsiTapeError::ClosedHandle));
        assert_eq!(log.call_count(), 0);
    }

    #[test]
    fn test_drop_releases_transport() {
        let transport = StubTransport::new();
        let log = transport.log();
        {
            let mut device = Device::with_transport(transport);
            device.issue_cmd(&Rewind::new()).unwrap();
            assert!(!log.is_closed());
        }
        assert!(log.is_closed());
    }

    #[test]
    fn test_transport_timeout_is_an_error() {
        let transport = StubTransport::with_replies([StubReply::failure(TransportError::Timeout)]);
        let mut device = Device::with_transport(transport);

        let err = device.issue_cmd(&Rewind::new()).unwrap_err();
        match err {
            ScsiTapeError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {:?}", other),
        }

        // The handle stays usable after a transport failure
        assert!(device.issue_cmd(&Rewind::new()).unwrap().is_success());
    }

    #[test]
    fn test_space_reports_signed_residue() {
        let sense = FixedSense::new(SenseKey::NoSense, 0x00, 0x01)
            .filemark()
            .information(-2)
            .to_bytes();
        let transport = StubTransport::with_replies([StubReply::check_condition(sense)]);
        let mut device = Device::with_transport(transport);

        let status = device
            .issue_cmd(&Space6::new(SpaceType::Blocks, -5))
            .unwrap();

        match status.detail() {
            CommandDetail::Space(detail) => {
                assert!(detail.filemark);
                assert_eq!(detail.information, Some(-2));
            }
            other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn test_shared_handle_across_threads() {
        let transport = StubTransport::new();
        let log = transport.log();
        let device = Arc::new(Mutex::new(Device::with_transport(transport)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    for _ in 0..5 {
                        let mut buf = [0u8; 16];
                        let status = device
                            .lock()
                            .issue_cmd_with_output(&Read6::variable(16), &mut buf)
                            .unwrap();
                        assert!(status.is_success());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.call_count(), 20);
        device.lock().close();
        assert!(log.is_closed());
    }

    #[test]
    fn test_decode_never_panics() {
        let mut seed = 0x2545_F491u32;
        for len in 0..64 {
            for _ in 0..32 {
                let raw: Vec<u8> = (0..len)
                    .map(|_| {
                        seed ^= seed << 13;
                        seed ^= seed >> 17;
                        seed ^= seed << 5;
                        seed as u8
                    })
                    .collect();
                let status = decode(&raw, CommandKind::Read6);
                if raw.is_empty() {
                    assert_eq!(status.outcome(), Outcome::Malformed);
                } else {
                    assert_eq!(status.raw_status(), Some(raw[0]));
                }
                let _ = status.to_string();
            }
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use crate::cli::{Cli, Commands};
    use crate::config::DeviceConfig;
    use crate::scsi::Device;
    use crate::ScsiTapeError;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["scsitape", "demo", "/dev/nst0"]).unwrap();
        assert!(matches!(cli.command, Commands::Demo { .. }));
        assert!(!cli.json);
    }

    #[test]
    fn test_sense_command_parsing() {
        let cli = Cli::try_parse_from(["scsitape", "sense", "70", "00", "05"]).unwrap();
        match cli.command {
            Commands::Sense { bytes } => assert_eq!(bytes, vec!["70", "00", "05"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-tape");

        let err = Device::open(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, ScsiTapeError::Open { .. }));
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = DeviceConfig {
            short_timeout_secs: 0,
            ..DeviceConfig::default()
        };
        let err = Device::open_with_config("/dev/nst0", config).unwrap_err();
        assert!(matches!(err, ScsiTapeError::Config(_)));
    }
}
