#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;
use embedded_io::ErrorKind;
use embedded_io_async::{ErrorType, Write};
use mic_array::{
    AcquisitionConfig, ArrayMode, DriverError, I2sRx, PinConfig, Port,
    RxConfig,
};

// ---------------------------------------------------------------------------
// Call log shared by the fake controllers and the fake delay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install(Port, RxConfig),
    SetPins(Port, PinConfig),
    Stop(Port),
    Start(Port),
    Read(Port),
    DelayMs(u32),
    DelayNs(u32),
}

pub type Log = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

// ---------------------------------------------------------------------------
// Scripted controller
// ---------------------------------------------------------------------------

/// What the next `read` call does.
pub enum Step {
    /// Copy these samples and report their exact byte count.
    Samples(Vec<i32>),
    /// Copy these samples but report `bytes` as read.
    Bytes(Vec<i32>, usize),
    Fault(DriverError),
}

pub struct FakeMic {
    port: Port,
    log: Log,
    script: VecDeque<Step>,
    pub fail_install: Option<DriverError>,
    pub fail_pins: Option<DriverError>,
}

impl FakeMic {
    pub fn new(port: Port, log: &Log) -> Self {
        Self {
            port,
            log: log.clone(),
            script: VecDeque::new(),
            fail_install: None,
            fail_pins: None,
        }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.script.push_back(step);
        self
    }

    pub fn samples(self, samples: &[i32]) -> Self {
        self.then(Step::Samples(samples.to_vec()))
    }
}

impl I2sRx for FakeMic {
    fn port(&self) -> Port {
        self.port
    }

    fn install(&mut self, config: &RxConfig) -> Result<(), DriverError> {
        self.log.borrow_mut().push(Call::Install(self.port, *config));
        match self.fail_install {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn set_pins(&mut self, pins: &PinConfig) -> Result<(), DriverError> {
        self.log.borrow_mut().push(Call::SetPins(self.port, *pins));
        match self.fail_pins {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn start(&mut self) {
        self.log.borrow_mut().push(Call::Start(self.port));
    }

    async fn stop(&mut self) {
        self.log.borrow_mut().push(Call::Stop(self.port));
    }

    async fn read(&mut self, buf: &mut [i32]) -> Result<usize, DriverError> {
        self.log.borrow_mut().push(Call::Read(self.port));
        // An exhausted script behaves like a dead DMA engine, which ends
        // `Pipeline::run` deterministically.
        let (samples, bytes) = match self.script.pop_front() {
            Some(Step::Samples(s)) => {
                let bytes = s.len() * 4;
                (s, bytes)
            }
            Some(Step::Bytes(s, bytes)) => (s, bytes),
            Some(Step::Fault(e)) => return Err(e),
            None => return Err(DriverError::Dma),
        };
        let n = samples.len().min(buf.len());
        buf[..n].copy_from_slice(&samples[..n]);
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

pub struct FakeDelay {
    log: Log,
}

impl FakeDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Call::DelayNs(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Call::DelayMs(ms));
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Collects everything written, counting `write` calls.
#[derive(Default)]
pub struct Sink {
    pub bytes: Vec<u8>,
    pub writes: usize,
}

impl Sink {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text().lines().collect()
    }
}

impl ErrorType for Sink {
    type Error = Infallible;
}

impl Write for Sink {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writes += 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Accepts `budget` writes, then reports a broken link.
pub struct FlakySink {
    pub budget: usize,
    pub bytes: Vec<u8>,
}

impl ErrorType for FlakySink {
    type Error = ErrorKind;
}

impl Write for FlakySink {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.budget == 0 {
            return Err(ErrorKind::BrokenPipe);
        }
        self.budget -= 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-controller buffer capacity used throughout the tests.
pub const CAP: usize = 16;

pub fn config(
    mode: ArrayMode,
    gain_shift: u8,
    block_size: usize,
) -> AcquisitionConfig {
    AcquisitionConfig {
        block_size,
        ..AcquisitionConfig::new(mode, gain_shift)
    }
}
