use i2s_capture::{
    BitsPerSample, ChannelFormat, CommFormat, GpioNum, Mode, PinConfig, Port,
    RxConfig,
};

use crate::error::ConfigError;

/// Every controller captures a stereo pair.
pub const CHANNELS_PER_PERIPHERAL: usize = 2;
/// Upper bound on logical channels across the whole array.
pub const MAX_CHANNELS: usize = 4;
/// Largest usable right shift for a 32-bit container.
pub const MAX_GAIN_SHIFT: u8 = 31;

/// How many controllers the array is spread across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArrayMode {
    /// One controller, two microphones.
    Single,
    /// Two controllers sharing clocks, four microphones.
    Dual,
}

impl ArrayMode {
    pub const fn peripheral_count(self) -> usize {
        match self {
            ArrayMode::Single => 1,
            ArrayMode::Dual => 2,
        }
    }

    pub const fn channel_count(self) -> usize {
        self.peripheral_count() * CHANNELS_PER_PERIPHERAL
    }
}

/// What to do when a shifted, negated sample does not fit in 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Clamp to `i16::MIN..=i16::MAX`.
    #[default]
    Saturate,
    /// Keep the low 16 bits.
    Wrap,
}

/// Fixed acquisition parameters, set once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Frame rate in Hz.
    pub sample_rate: u32,
    pub bits_per_sample: BitsPerSample,
    /// Stereo frames pulled from each controller per cycle.
    pub block_size: usize,
    /// Right shift applied before sign inversion.
    pub gain_shift: u8,
    pub mode: ArrayMode,
    pub overflow: OverflowPolicy,
    pub dma_buf_count: u8,
    pub dma_buf_len: u16,
}

impl AcquisitionConfig {
    /// Two microphones on one controller.
    pub const SINGLE: Self = Self::new(ArrayMode::Single, 16);

    /// Four microphones on two controllers. Two fewer discarded bits than
    /// [`SINGLE`](Self::SINGLE), which is roughly 12 dB more gain.
    pub const DUAL: Self = Self::new(ArrayMode::Dual, 14);

    pub const fn new(mode: ArrayMode, gain_shift: u8) -> Self {
        Self {
            sample_rate: 8_000,
            bits_per_sample: BitsPerSample::Bits32,
            block_size: 512,
            gain_shift,
            mode,
            overflow: OverflowPolicy::Saturate,
            dma_buf_count: 4,
            dma_buf_len: 1024,
        }
    }

    /// Wide samples requested from each controller per cycle.
    pub const fn samples_per_read(&self) -> usize {
        self.block_size * CHANNELS_PER_PERIPHERAL
    }

    /// Wide samples held across all controllers per cycle.
    pub const fn samples_per_cycle(&self) -> usize {
        self.samples_per_read() * self.mode.peripheral_count()
    }

    /// Check the parameters against a per-controller buffer of `capacity`
    /// wide samples.
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.gain_shift > MAX_GAIN_SHIFT {
            return Err(ConfigError::GainShiftOutOfRange(self.gain_shift));
        }
        if self.dma_buf_count < 2 || self.dma_buf_len == 0 {
            return Err(ConfigError::DmaBuffering);
        }
        let requested = self.samples_per_read();
        if requested > capacity {
            return Err(ConfigError::BlockExceedsCapacity {
                requested,
                capacity,
            });
        }
        Ok(())
    }

    /// Driver parameters, identical for every controller in the array.
    pub fn rx_config(&self) -> RxConfig {
        RxConfig {
            mode: Mode::MasterRx,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            channel_format: ChannelFormat::RightLeft,
            comm_format: CommFormat::Philips,
            dma_buf_count: self.dma_buf_count,
            dma_buf_len: self.dma_buf_len,
            use_apll: false,
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self::DUAL
    }
}

/// Wiring of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralBinding {
    pub port: Port,
    pub clock_pin: GpioNum,
    pub word_select_pin: GpioNum,
    pub data_pin: GpioNum,
}

impl PeripheralBinding {
    pub fn pins(&self) -> PinConfig {
        PinConfig {
            bck: self.clock_pin,
            ws: self.word_select_pin,
            data_in: self.data_pin,
            data_out: None,
        }
    }
}

/// Something held once per controller: one in single mode, two in dual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topology<T> {
    Single(T),
    Dual([T; 2]),
}

impl<T> Topology<T> {
    pub const fn mode(&self) -> ArrayMode {
        match self {
            Topology::Single(_) => ArrayMode::Single,
            Topology::Dual(_) => ArrayMode::Dual,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Topology::Single(one) => core::slice::from_ref(one),
            Topology::Dual(two) => two,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Topology::Single(one) => core::slice::from_mut(one),
            Topology::Dual(two) => two,
        }
    }
}

pub type Bindings = Topology<PeripheralBinding>;

const SCK: GpioNum = GpioNum(7);
const WS: GpioNum = GpioNum(8);
const SD1: GpioNum = GpioNum(9);
const SD2: GpioNum = GpioNum(6);

impl Topology<PeripheralBinding> {
    pub const SINGLE: Self = Topology::Single(PeripheralBinding {
        port: Port::I2s0,
        clock_pin: SCK,
        word_select_pin: WS,
        data_pin: SD1,
    });

    /// Both controllers on the same bit clock and word select lines.
    pub const DUAL: Self = Topology::Dual([
        PeripheralBinding {
            port: Port::I2s0,
            clock_pin: SCK,
            word_select_pin: WS,
            data_pin: SD1,
        },
        PeripheralBinding {
            port: Port::I2s1,
            clock_pin: SCK,
            word_select_pin: WS,
            data_pin: SD2,
        },
    ]);

    /// Clock and word select may be shared; ports and data lines may not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Topology::Dual([a, b]) = self {
            if a.port == b.port {
                return Err(ConfigError::DuplicatePort(a.port));
            }
            if a.data_pin == b.data_pin {
                return Err(ConfigError::SharedDataPin(a.data_pin));
            }
        }
        Ok(())
    }
}
