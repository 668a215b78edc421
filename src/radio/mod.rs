//! # Radio Module
//!
//! Hands encoded packets to the radio hardware.
//!
//! This module handles:
//! - The `Radio` seam the beacon transmits through
//! - Opening a serial-attached radio or TNC, trying candidate device paths
//! - Retrying initialisation a bounded number of times

pub mod link;

use async_trait::async_trait;
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{BeaconError, Result};
use link::{SerialLink, TokioSerialLink};

/// Write timeout used until configured otherwise
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Device paths tried after the configured one (in order of preference)
pub const FALLBACK_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters (most TNCs)
    "/dev/ttyACM0", // USB CDC devices (LoRa trackers)
];

/// Packet transmitter
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Radio: Send {
    /// Transmit one encoded packet
    ///
    /// # Errors
    ///
    /// Returns `Radio` error on transport failure
    async fn transmit(&mut self, payload: &[u8]) -> Result<()>;
}

/// Radio or TNC attached over a serial port
pub struct SerialRadio<L = TokioSerialLink> {
    link: L,
    device_path: String,
    write_timeout: Duration,
}

impl<L> std::fmt::Debug for SerialRadio<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialRadio")
            .field("device_path", &self.device_path)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

/// Configured path first, then the fallbacks that differ from it
pub fn candidate_paths(configured: &str) -> Vec<&str> {
    let mut paths = vec![configured];
    paths.extend(FALLBACK_DEVICE_PATHS.iter().copied().filter(|p| *p != configured));
    paths
}

impl SerialRadio<TokioSerialLink> {
    /// Open the first serial device in `paths` that succeeds
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` listing every path tried
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(stream) => {
                    info!("Opened radio at {} ({} baud)", path, baud_rate);
                    return Ok(Self::with_link(TokioSerialLink::new(stream), path));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(BeaconError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open with up to `attempts` tries, waiting `interval` between them
    ///
    /// # Errors
    ///
    /// Returns the last open error once all attempts are used up
    pub async fn open_with_retry(
        paths: &[&str],
        baud_rate: u32,
        attempts: u32,
        interval: Duration,
    ) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut attempt = 1;

        loop {
            match Self::open_with_paths(paths, baud_rate) {
                Ok(radio) => return Ok(radio),
                Err(e) if attempt < attempts => {
                    warn!(
                        "Radio initialisation failed (attempt {}/{}): {}",
                        attempt, attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Open a specific serial port, 8N1 without flow control
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| BeaconError::Serial(format!("Failed to open {}: {}", path, e)))
    }
}

impl<L: SerialLink> SerialRadio<L> {
    pub fn with_link(link: L, device_path: &str) -> Self {
        Self {
            link,
            device_path: device_path.to_string(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Give up on a write after `timeout`
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Path of the opened serial device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl<L: SerialLink> Radio for SerialRadio<L> {
    async fn transmit(&mut self, payload: &[u8]) -> Result<()> {
        match tokio::time::timeout(self.write_timeout, self.link.write_frame(payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(BeaconError::Radio(format!(
                    "Failed to transmit on {}: {}",
                    self.device_path, e
                )));
            }
            Err(_) => {
                return Err(BeaconError::Radio(format!(
                    "Timed out after {:?} transmitting on {}",
                    self.write_timeout, self.device_path
                )));
            }
        }

        debug!("Transmitted packet ({} bytes)", payload.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link::mocks::MockSerialLink;

    #[test]
    fn test_candidate_paths_configured_first() {
        assert_eq!(
            candidate_paths("/dev/ttyS1"),
            vec!["/dev/ttyS1", "/dev/ttyUSB0", "/dev/ttyACM0"]
        );
    }

    #[test]
    fn test_candidate_paths_no_duplicates() {
        assert_eq!(candidate_paths("/dev/ttyACM0"), vec!["/dev/ttyACM0", "/dev/ttyUSB0"]);
    }

    #[tokio::test]
    async fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];

        match SerialRadio::open_with_paths(invalid_paths, 9600) {
            Err(BeaconError::SerialPortNotFound(msg)) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected SerialPortNotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_port_with_invalid_path_returns_error() {
        match SerialRadio::open_port("/dev/nonexistent_serial_device_12345", 9600) {
            Err(BeaconError::Serial(msg)) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_open_with_retry_gives_up() {
        let result = SerialRadio::open_with_retry(
            &["/dev/nonexistent0"],
            9600,
            3,
            Duration::from_millis(1),
        )
        .await;

        assert!(matches!(result, Err(BeaconError::SerialPortNotFound(_))));
    }

    #[tokio::test]
    async fn test_transmit_writes_frame() {
        let link = MockSerialLink::new();
        let mut radio = SerialRadio::with_link(link.clone(), "/dev/mock");

        radio.transmit(b"N0CALL>APLT00:!test").await.unwrap();
        radio.transmit(b"second").await.unwrap();

        assert_eq!(
            link.frames(),
            vec![b"N0CALL>APLT00:!test".to_vec(), b"second".to_vec()]
        );
        assert_eq!(radio.device_path(), "/dev/mock");
    }

    #[tokio::test]
    async fn test_transmit_failure_maps_to_radio_error() {
        let link = MockSerialLink::new();
        link.fail_next(1);
        let mut radio = SerialRadio::with_link(link.clone(), "/dev/mock");

        match radio.transmit(b"payload").await {
            Err(BeaconError::Radio(msg)) => assert!(msg.contains("/dev/mock")),
            other => panic!("Expected Radio error, got: {:?}", other),
        }

        // Failures are not retried; the next packet goes through
        radio.transmit(b"payload").await.unwrap();
        assert_eq!(link.frames().len(), 1);
    }

    // Only runs with a radio connected
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_open_with_real_hardware() {
        match SerialRadio::open_with_paths(FALLBACK_DEVICE_PATHS, 9600) {
            Ok(radio) => println!("Opened radio at: {}", radio.device_path()),
            Err(_) => println!("No radio hardware detected (this is OK for CI/CD)"),
        }
    }
}
