//! UART backend (feature `serial`).

use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::StreamLink;

/// Baud rate the radio module runs its host UART at.
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

/// Read timeout used when polling the port for new bytes.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(20);

/// An opened serial port wrapped as a byte transport.
pub type SerialLink = StreamLink<Box<dyn SerialPort>>;

/// Serial port settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path (`/dev/ttyACM0`, `COM3`, ...).
    pub path: String,
    /// Line speed. Default: 1 Mbaud.
    pub baud_rate: u32,
    /// How long a poll waits for a byte before reporting "nothing available".
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Settings for `path` with the module's default line speed.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Open the port 8N1 and discard anything the device buffered before we
/// attached.
pub fn open(config: &SerialConfig) -> Result<SerialLink> {
    debug!(
        path = %config.path,
        baud = config.baud_rate,
        "opening serial port"
    );

    let port = serialport::new(&config.path, config.baud_rate)
        .timeout(config.read_timeout)
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .flow_control(serialport::FlowControl::None)
        .open()
        .map_err(|err| TransportError::Open {
            path: config.path.clone(),
            source: err.into(),
        })?;

    let mut link = StreamLink::new(port);
    purge(&mut link)?;
    Ok(link)
}

/// Drop pending input on the device and in the adapter buffer.
pub fn purge(link: &mut SerialLink) -> Result<()> {
    let pending = link
        .get_ref()
        .bytes_to_read()
        .map_err(|err| TransportError::Io(err.into()))?;
    if pending > 0 {
        link.get_ref()
            .clear(serialport::ClearBuffer::Input)
            .map_err(|err| TransportError::Io(err.into()))?;
    }
    link.discard_buffered();
    debug!(pending, "purged serial input");
    Ok(())
}
