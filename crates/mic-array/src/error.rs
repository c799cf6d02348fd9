use derive_more::From;
use i2s_capture::{GpioNum, Port};

/// Rejected acquisition parameters or wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroSampleRate,
    ZeroBlockSize,
    GainShiftOutOfRange(u8),
    DmaBuffering,
    BlockExceedsCapacity { requested: usize, capacity: usize },
    /// Config, bindings and controllers disagree on single vs dual.
    ModeMismatch,
    /// A controller was handed the binding meant for another port.
    PortMismatch { expected: Port, found: Port },
    DuplicatePort(Port),
    SharedDataPin(GpioNum),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroSampleRate => write!(f, "sample rate is zero"),
            ConfigError::ZeroBlockSize => write!(f, "block size is zero"),
            ConfigError::GainShiftOutOfRange(shift) => {
                write!(f, "gain shift {} out of range", shift)
            }
            ConfigError::DmaBuffering => {
                write!(f, "DMA needs at least two non-empty buffers")
            }
            ConfigError::BlockExceedsCapacity { requested, capacity } => {
                write!(
                    f,
                    "block of {} samples exceeds buffer of {}",
                    requested, capacity
                )
            }
            ConfigError::ModeMismatch => {
                write!(f, "peripheral count does not match mode")
            }
            ConfigError::PortMismatch { expected, found } => {
                write!(f, "expected {} but got {}", expected, found)
            }
            ConfigError::DuplicatePort(port) => {
                write!(f, "{} bound twice", port)
            }
            ConfigError::SharedDataPin(pin) => {
                write!(f, "data line {} shared between ports", pin)
            }
        }
    }
}

/// Bring-up failure. Acquisition must not start after one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    #[from]
    Config(ConfigError),
    DriverInstallFailed { port: Port, source: i2s_capture::Error },
    PinBindingFailed { port: Port, source: i2s_capture::Error },
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "bad configuration: {}", e),
            InitError::DriverInstallFailed { port, source } => {
                write!(f, "driver install failed on {}: {}", port, source)
            }
            InitError::PinBindingFailed { port, source } => {
                write!(f, "pin binding failed on {}: {}", port, source)
            }
        }
    }
}

/// A controller stopped delivering samples mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    HardwareFault { port: Port, source: i2s_capture::Error },
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::HardwareFault { port, source } => {
                write!(f, "hardware fault on {}: {}", port, source)
            }
        }
    }
}

/// The two controllers returned different byte counts in the same cycle.
///
/// Not fatal. The cycle is truncated to the shorter stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Desync {
    pub first: usize,
    pub second: usize,
}

/// Anything that stops the acquisition loop for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    Init(InitError),
    Read(ReadError),
    Transport(embedded_io::ErrorKind),
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Fault::Init(e) => write!(f, "init: {}", e),
            Fault::Read(e) => write!(f, "read: {}", e),
            Fault::Transport(kind) => write!(f, "transport: {:?}", kind),
        }
    }
}
