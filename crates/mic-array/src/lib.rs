#![cfg_attr(not(test), no_std)]
//! Synchronized capture from one or two stereo I2S microphone pairs,
//! streamed as CSV over a byte link.
//!
//! Each cycle the [`Coordinator`] blocks on a fixed-size read from every
//! controller, the [`Converter`] reduces each 32-bit word to 16 bits, and the
//! [`Emitter`] writes one line per instant:
//!
//! ```text
//! left,right                  (single mode)
//! mic1,mic2,mic3,mic4         (dual mode)
//! ```
//!
//! [`Pipeline`] ties the three together and runs until a fatal [`Fault`].

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod config;
mod convert;
mod coordinator;
mod emitter;
mod error;
mod frame;
mod pipeline;

pub use config::*;
pub use convert::{convert, convert_default, Converter};
pub use coordinator::{Coordinator, Cycle, Frames, SYNC_SETTLE_MS};
pub use emitter::{Emitter, FAULT_PREFIX};
pub use error::*;
pub use frame::{Frame, Record, RECORD_CAPACITY};
pub use pipeline::{CycleReport, Pipeline, Stats};

pub use i2s_capture::{
    BitsPerSample, Error as DriverError, GpioNum, I2sRx, PinConfig, Port,
    RxConfig,
};
