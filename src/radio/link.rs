//! Serial link seam between the radio and the OS serial port

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;

/// Byte link to the radio hardware
#[async_trait]
pub trait SerialLink: Send {
    /// Write one complete frame and flush it out of the OS buffer
    async fn write_frame(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// `SerialLink` over a tokio-serial stream
pub struct TokioSerialLink {
    stream: tokio_serial::SerialStream,
}

impl TokioSerialLink {
    pub fn new(stream: tokio_serial::SerialStream) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl SerialLink for TokioSerialLink {
    async fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await
    }
}
