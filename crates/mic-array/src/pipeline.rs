use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use i2s_capture::I2sRx;

use crate::config::{AcquisitionConfig, Bindings, Topology};
use crate::convert::Converter;
use crate::coordinator::Coordinator;
use crate::emitter::Emitter;
use crate::error::{Desync, Fault};

/// Running totals since start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub cycles: u64,
    pub frames: u64,
    pub desyncs: u64,
}

/// Outcome of one acquire, convert and emit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub frames: usize,
    pub desync: Option<Desync>,
}

/// The whole acquisition loop: controllers in, CSV records out.
pub struct Pipeline<P, W, D, const N: usize> {
    coordinator: Coordinator<P, N>,
    emitter: Emitter<W>,
    converter: Converter,
    delay: D,
    stats: Stats,
    started: bool,
}

impl<P, W, D, const N: usize> Pipeline<P, W, D, N>
where
    P: I2sRx,
    W: Write,
    D: DelayNs,
{
    pub fn new(
        config: AcquisitionConfig,
        bindings: Bindings,
        ports: Topology<P>,
        transport: W,
        delay: D,
    ) -> Self {
        Self {
            coordinator: Coordinator::new(config, bindings, ports),
            emitter: Emitter::new(transport),
            converter: Converter::new(config.gain_shift, config.overflow),
            delay,
            stats: Stats::default(),
            started: false,
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn transport(&self) -> &W {
        self.emitter.transport()
    }

    /// Bring up every controller. Does nothing once bring-up has succeeded.
    pub async fn start(&mut self) -> Result<(), Fault> {
        if self.started {
            return Ok(());
        }
        let config = *self.coordinator.config();
        info!(
            "Starting {:?} array, {} Hz, shift {}",
            config.mode,
            config.sample_rate,
            config.gain_shift
        );
        self.coordinator.initialize(&mut self.delay).await?;
        self.started = true;
        Ok(())
    }

    /// Run exactly one cycle.
    pub async fn step(&mut self) -> Result<CycleReport, Fault> {
        let cycle = self.coordinator.acquire_cycle().await?;

        let desync = cycle.desync();
        if let Some(d) = desync {
            self.stats.desyncs += 1;
            warn!(
                "Controllers out of step: {} vs {} bytes ({} total)",
                d.first,
                d.second,
                self.stats.desyncs
            );
        }

        let frames = self.emitter.emit_cycle(&cycle, &self.converter).await?;
        self.stats.cycles += 1;
        self.stats.frames += frames as u64;

        Ok(CycleReport { frames, desync })
    }

    /// Start unless already started, then cycle until something fatal
    /// happens.
    ///
    /// Only returns after writing the diagnostic line for the fault. The
    /// caller is expected to halt; nothing here retries.
    pub async fn run(&mut self) -> Fault {
        if let Err(fault) = self.start().await {
            return self.halt(fault).await;
        }
        loop {
            if let Err(fault) = self.step().await {
                return self.halt(fault).await;
            }
        }
    }

    async fn halt(&mut self, fault: Fault) -> Fault {
        error!("Halting: {:?}", fault);
        // A broken transport cannot carry its own diagnostic.
        if !matches!(fault, Fault::Transport(_)) {
            if let Err(kind) = self.emitter.diagnostic(&fault).await {
                error!("Could not report fault: {:?}", kind);
            }
        }
        fault
    }
}
