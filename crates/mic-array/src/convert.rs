//! Bit-depth reduction from 32-bit microphone words to 16-bit PCM.
//!
//! The microphones deliver left-aligned words with padding in the low bits.
//! An arithmetic right shift keeps the audio-bearing bits, and the result is
//! negated to undo the array's fixed polarity. The shift trades headroom for
//! gain: each bit kept is ~6 dB louder and closer to clipping.

use crate::config::{OverflowPolicy, MAX_GAIN_SHIFT};

/// Reduce one wide sample.
///
/// Computed in 64-bit so that negating `i32::MIN >> 0` is defined.
#[inline]
pub fn convert(raw: i32, gain_shift: u8, policy: OverflowPolicy) -> i16 {
    let narrowed = -(i64::from(raw) >> gain_shift.min(MAX_GAIN_SHIFT));
    match policy {
        OverflowPolicy::Saturate => {
            narrowed.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
        }
        OverflowPolicy::Wrap => narrowed as i16,
    }
}

/// [`convert`] with [`OverflowPolicy::Saturate`].
#[inline]
pub fn convert_default(raw: i32, gain_shift: u8) -> i16 {
    convert(raw, gain_shift, OverflowPolicy::Saturate)
}

/// Stateless converter bound to one acquisition's shift and policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Converter {
    pub gain_shift: u8,
    pub policy: OverflowPolicy,
}

impl Converter {
    pub const fn new(gain_shift: u8, policy: OverflowPolicy) -> Self {
        Self { gain_shift, policy }
    }

    #[inline]
    pub fn sample(&self, raw: i32) -> i16 {
        convert(raw, self.gain_shift, self.policy)
    }

    /// Convert one interleaved `[left, right]` pair.
    #[inline]
    pub fn pair(&self, raw: [i32; 2]) -> [i16; 2] {
        [self.sample(raw[0]), self.sample(raw[1])]
    }
}
