use crate::source::{FrameSource, SourceError};
use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::io::{self, Read};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDetails {
    pub vid: u16,
    pub pid: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    Usb(UsbDetails),
    Pci,
    Bluetooth,
    Unknown,
}

/// A port the meter might be attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub port_name: String,
    pub kind: PortKind,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => PortKind::Usb(UsbDetails {
                vid: usb.vid,
                pid: usb.pid,
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
                product: usb.product,
            }),
            SerialPortType::PciPort => PortKind::Pci,
            SerialPortType::BluetoothPort => PortKind::Bluetooth,
            SerialPortType::Unknown => PortKind::Unknown,
        };
        Self {
            port_name: info.port_name,
            kind,
        }
    }
}

impl PortInfo {
    /// One-line description, e.g. `/dev/ttyUSB0 USB (1A86:7523) CH340`.
    pub fn describe(&self) -> String {
        match &self.kind {
            PortKind::Usb(usb) => {
                let mut line = format!("{} USB ({:04X}:{:04X})", self.port_name, usb.vid, usb.pid);
                if let Some(label) = usb.product.as_deref().or(usb.manufacturer.as_deref()) {
                    line.push(' ');
                    line.push_str(label);
                }
                line
            }
            PortKind::Pci => format!("{} PCI", self.port_name),
            PortKind::Bluetooth => format!("{} Bluetooth", self.port_name),
            PortKind::Unknown => format!("{} Unknown", self.port_name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub parity: serialport::Parity,
    pub stop_bits: serialport::StopBits,
    pub flow_control: serialport::FlowControl,
    /// Per-read timeout. A read that times out ends the current frame.
    /// It is not a deadline for the whole frame: a slow trickle of bytes
    /// keeps one frame open for up to this long between each byte.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 2400,
            data_bits: serialport::DataBits::Eight,
            parity: serialport::Parity::None,
            stop_bits: serialport::StopBits::One,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(1),
        }
    }
}

/// An open meter port. The handle is closed when this is dropped.
pub struct SerialSource {
    port_name: String,
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn list_ports() -> Vec<PortInfo> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(PortInfo::from).collect(),
            Err(e) => {
                log::warn!("could not enumerate serial ports: {e}");
                Vec::new()
            }
        }
    }

    pub fn open(cfg: &SerialConfig) -> Result<Self, SourceError> {
        let port = serialport::new(&cfg.port_name, cfg.baud_rate)
            .data_bits(cfg.data_bits)
            .parity(cfg.parity)
            .stop_bits(cfg.stop_bits)
            .flow_control(cfg.flow_control)
            .timeout(cfg.timeout)
            .open()
            .map_err(|source| SourceError::Open {
                port: cfg.port_name.clone(),
                source,
            })?;

        log::info!("opened {} at {} baud", cfg.port_name, cfg.baud_rate);
        Ok(Self {
            port_name: cfg.port_name.clone(),
            port,
        })
    }
}

impl FrameSource for SerialSource {
    fn read_frame(&mut self, max: usize) -> Result<Option<Vec<u8>>, SourceError> {
        let mut buf = vec![0u8; max];
        let mut filled = 0;
        while filled < max {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("{} closed", self.port_name),
                    )
                    .into())
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
        Ok(Some(buf))
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        log::debug!("closing {}", self.port_name);
    }
}
