use core::fmt::Write as _;

use crate::config::MAX_CHANNELS;

/// Room for four `-32768` fields, three commas and a newline.
pub const RECORD_CAPACITY: usize = 32;

/// One text line on the wire.
pub type Record = heapless::String<RECORD_CAPACITY>;

/// One instant across every logical channel.
///
/// Channel order is fixed: `[left, right]` in single mode and
/// `[mic1, mic2, mic3, mic4]` = `[i2s0.left, i2s0.right, i2s1.left,
/// i2s1.right]` in dual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    samples: [i16; MAX_CHANNELS],
    len: u8,
}

impl Frame {
    pub const fn stereo(pair: [i16; 2]) -> Self {
        Self { samples: [pair[0], pair[1], 0, 0], len: 2 }
    }

    pub const fn quad(first: [i16; 2], second: [i16; 2]) -> Self {
        Self { samples: [first[0], first[1], second[0], second[1]], len: 4 }
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.samples[..usize::from(self.len)]
    }

    /// Render as `a,b[,c,d]\n` into `out`, replacing its contents.
    pub fn write_record(&self, out: &mut Record) -> core::fmt::Result {
        out.clear();
        for (i, sample) in self.as_slice().iter().enumerate() {
            if i > 0 {
                out.push(',').map_err(|_| core::fmt::Error)?;
            }
            write!(out, "{}", sample)?;
        }
        out.push('\n').map_err(|_| core::fmt::Error)
    }
}
