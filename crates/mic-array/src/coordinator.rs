use embedded_hal_async::delay::DelayNs;
use i2s_capture::I2sRx;

use crate::config::{AcquisitionConfig, Bindings, Topology};
use crate::convert::Converter;
use crate::error::{ConfigError, Desync, InitError, ReadError};
use crate::frame::Frame;

/// Pause between stopping and restarting both controllers, long enough for
/// the shared clock lines to settle.
pub const SYNC_SETTLE_MS: u32 = 10;

const SAMPLE_BYTES: usize = core::mem::size_of::<i32>();

/// Owns the controllers and their receive buffers.
///
/// `N` is the capacity of each controller's buffer in wide samples. It is
/// fixed at compile time so the hot path never allocates; the configured
/// block must fit (`block_size * 2 <= N`).
pub struct Coordinator<P, const N: usize> {
    config: AcquisitionConfig,
    bindings: Bindings,
    ports: Topology<P>,
    buffers: [[i32; N]; 2],
}

impl<P: I2sRx, const N: usize> Coordinator<P, N> {
    pub fn new(
        config: AcquisitionConfig,
        bindings: Bindings,
        ports: Topology<P>,
    ) -> Self {
        Self { config, bindings, ports, buffers: [[0; N]; 2] }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Install and wire every controller, then line up their start times.
    ///
    /// In dual mode both controllers are stopped (even though neither was
    /// explicitly started), given [`SYNC_SETTLE_MS`] to settle and started
    /// back to back. The sample clocks are still independent so they will
    /// drift apart over a long run.
    pub async fn initialize<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), InitError> {
        self.config.validate(N)?;
        self.bindings.validate()?;
        if self.bindings.mode() != self.config.mode
            || self.ports.mode() != self.config.mode
        {
            return Err(ConfigError::ModeMismatch.into());
        }

        let rx = self.config.rx_config();
        for (port, binding) in self
            .ports
            .as_mut_slice()
            .iter_mut()
            .zip(self.bindings.as_slice())
        {
            if port.port() != binding.port {
                return Err(ConfigError::PortMismatch {
                    expected: binding.port,
                    found: port.port(),
                }
                .into());
            }

            debug!("Installing {:?} at {} Hz", binding.port, rx.sample_rate);
            port.install(&rx).map_err(|source| {
                InitError::DriverInstallFailed { port: binding.port, source }
            })?;
            port.set_pins(&binding.pins()).map_err(|source| {
                InitError::PinBindingFailed { port: binding.port, source }
            })?;
            info!("{:?} ready", binding.port);
        }

        if let Topology::Dual([first, second]) = &mut self.ports {
            first.stop().await;
            second.stop().await;
            delay.delay_ms(SYNC_SETTLE_MS).await;
            first.start().await;
            second.start().await;
            info!("Started both controllers");
        }

        Ok(())
    }

    /// Wait for one block from each controller.
    ///
    /// Reads are sequential: the second controller is only drained once the
    /// first buffer is full. Only the samples actually returned are exposed,
    /// so nothing left over from a previous cycle can leak into this one.
    pub async fn acquire_cycle(&mut self) -> Result<Cycle<'_>, ReadError> {
        let want = self.config.samples_per_read().min(N);
        let [first_buf, second_buf] = &mut self.buffers;

        match &mut self.ports {
            Topology::Single(port) => {
                let (bytes, n) =
                    read_block(port, &mut first_buf[..want]).await?;
                Ok(Cycle {
                    blocks: Topology::Single(&first_buf[..n]),
                    bytes: Topology::Single(bytes),
                    desync: None,
                })
            }
            Topology::Dual([first, second]) => {
                let (first_bytes, first_n) =
                    read_block(first, &mut first_buf[..want]).await?;
                let (second_bytes, second_n) =
                    read_block(second, &mut second_buf[..want]).await?;

                let desync = (first_bytes != second_bytes).then_some(Desync {
                    first: first_bytes,
                    second: second_bytes,
                });

                Ok(Cycle {
                    blocks: Topology::Dual([
                        &first_buf[..first_n],
                        &second_buf[..second_n],
                    ]),
                    bytes: Topology::Dual([first_bytes, second_bytes]),
                    desync,
                })
            }
        }
    }
}

/// Returns the byte count reported by the driver and the number of whole
/// samples it covers, clamped to the buffer.
async fn read_block<P: I2sRx>(
    port: &mut P,
    buf: &mut [i32],
) -> Result<(usize, usize), ReadError> {
    let bytes = port.read(buf).await.map_err(|source| {
        ReadError::HardwareFault { port: port.port(), source }
    })?;
    let samples = (bytes / SAMPLE_BYTES).min(buf.len());
    trace!("{:?} returned {} bytes", port.port(), bytes);
    Ok((bytes, samples))
}

/// The raw blocks captured in one cycle, borrowed from the coordinator.
#[derive(Debug)]
pub struct Cycle<'a> {
    blocks: Topology<&'a [i32]>,
    bytes: Topology<usize>,
    desync: Option<Desync>,
}

impl<'a> Cycle<'a> {
    pub fn blocks(&self) -> &Topology<&'a [i32]> {
        &self.blocks
    }

    /// Byte counts as reported by each controller, before flooring to
    /// whole samples.
    pub fn bytes(&self) -> Topology<usize> {
        self.bytes
    }

    pub fn desync(&self) -> Option<Desync> {
        self.desync
    }

    /// Whole stereo pairs available on every controller.
    pub fn frame_count(&self) -> usize {
        match &self.blocks {
            Topology::Single(block) => block.len() / 2,
            Topology::Dual([first, second]) => {
                first.len().min(second.len()) / 2
            }
        }
    }

    /// Time-ordered converted frames.
    pub fn frames<'s>(&'s self, converter: &'s Converter) -> Frames<'s> {
        Frames {
            blocks: self.blocks,
            converter,
            next: 0,
            count: self.frame_count(),
        }
    }
}

/// Iterator over the frames of a [`Cycle`].
pub struct Frames<'s> {
    blocks: Topology<&'s [i32]>,
    converter: &'s Converter,
    next: usize,
    count: usize,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.count {
            return None;
        }
        let at = 2 * self.next;
        self.next += 1;

        let frame = match self.blocks {
            Topology::Single(block) => {
                Frame::stereo(self.converter.pair([block[at], block[at + 1]]))
            }
            Topology::Dual([first, second]) => Frame::quad(
                self.converter.pair([first[at], first[at + 1]]),
                self.converter.pair([second[at], second[at + 1]]),
            ),
        };
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames<'_> {}
