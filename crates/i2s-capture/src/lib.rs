#![cfg_attr(not(test), no_std)]

//! Capability surface for receive-only I2S microphone peripherals.
//!
//! A board support crate implements [`I2sRx`] on top of its HAL's I2S
//! driver. Everything above this crate only talks to the trait, so the same
//! acquisition logic runs against real DMA-backed hardware or a scripted
//! fake in tests.
//!
//! Samples are always delivered in 32-bit containers regardless of the
//! configured [`BitsPerSample`]; the driver left-aligns narrower words.

mod error;

pub use error::Error;

/// Hardware I2S controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    I2s0,
    I2s1,
}

impl Port {
    pub const fn index(self) -> usize {
        match self {
            Port::I2s0 => 0,
            Port::I2s1 => 1,
        }
    }
}

impl core::fmt::Display for Port {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "i2s{}", self.index())
    }
}

/// A GPIO number on the target package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioNum(pub u8);

impl core::fmt::Display for GpioNum {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Width of one sample word on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitsPerSample {
    Bits16,
    Bits24,
    Bits32,
}

impl BitsPerSample {
    pub const fn bits(self) -> u8 {
        match self {
            BitsPerSample::Bits16 => 16,
            BitsPerSample::Bits24 => 24,
            BitsPerSample::Bits32 => 32,
        }
    }
}

/// Direction and clock role of the controller.
///
/// Microphone arrays only ever need the controller to drive the bit clock
/// and word select while shifting data in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    MasterRx,
}

/// Slot layout of each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelFormat {
    /// Both slots captured, interleaved left then right.
    #[default]
    RightLeft,
    OnlyLeft,
    OnlyRight,
}

impl ChannelFormat {
    pub const fn channels(self) -> usize {
        match self {
            ChannelFormat::RightLeft => 2,
            ChannelFormat::OnlyLeft | ChannelFormat::OnlyRight => 1,
        }
    }
}

/// Bus framing standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommFormat {
    /// Philips I2S: data delayed one bit clock after word select.
    #[default]
    Philips,
    Msb,
}

/// Driver-level configuration applied at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxConfig {
    pub mode: Mode,
    /// Frame rate in Hz.
    pub sample_rate: u32,
    pub bits_per_sample: BitsPerSample,
    pub channel_format: ChannelFormat,
    pub comm_format: CommFormat,
    /// Number of DMA descriptors in the ring.
    pub dma_buf_count: u8,
    /// Frames per DMA descriptor.
    pub dma_buf_len: u16,
    /// Derive the bit clock from the audio PLL instead of the main PLL.
    pub use_apll: bool,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            mode: Mode::MasterRx,
            sample_rate: 8_000,
            bits_per_sample: BitsPerSample::Bits32,
            channel_format: ChannelFormat::RightLeft,
            comm_format: CommFormat::Philips,
            dma_buf_count: 4,
            dma_buf_len: 1024,
            use_apll: false,
        }
    }
}

/// Physical lines routed to one controller.
///
/// `data_out` is always `None` for receive-only use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub bck: GpioNum,
    pub ws: GpioNum,
    pub data_in: GpioNum,
    pub data_out: Option<GpioNum>,
}

/// One receive-only I2S controller.
///
/// The expected call order is `install`, `set_pins`, then any number of
/// `stop`/`start` and `read` calls. A controller captures as soon as it is
/// installed; `stop`/`start` only exist to re-align several controllers.
/// Implementations own their DMA ring and keep capturing between reads;
/// `read` drains from that ring.
#[allow(async_fn_in_trait)]
pub trait I2sRx {
    /// The controller this instance drives.
    fn port(&self) -> Port;

    /// Install the driver and allocate DMA buffers.
    fn install(&mut self, config: &RxConfig) -> Result<(), Error>;

    /// Route the controller to physical pins. Must follow `install`.
    fn set_pins(&mut self, pins: &PinConfig) -> Result<(), Error>;

    /// Start clocking and capturing into the DMA ring.
    async fn start(&mut self);

    /// Stop clocking. Safe to call on a controller that was never started.
    async fn stop(&mut self);

    /// Fill `buf` with interleaved samples, waiting as long as it takes.
    ///
    /// Returns the number of **bytes** written into `buf`. A short count is
    /// possible when the driver gives up on a partially filled ring.
    async fn read(&mut self, buf: &mut [i32]) -> Result<usize, Error>;
}
