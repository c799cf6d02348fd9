use core::fmt::Write as _;

use embedded_io::{Error as _, ErrorKind};
use embedded_io_async::Write;

use crate::convert::Converter;
use crate::coordinator::Cycle;
use crate::error::Fault;
use crate::frame::{Frame, Record};

/// Prefix that keeps a diagnostic line from parsing as a sample record.
pub const FAULT_PREFIX: &str = "#FAULT ";

type DiagnosticLine = heapless::String<128>;

/// Writes CSV sample records to a byte sink, one `write_all` per record.
///
/// No buffering beyond the current line; pacing is whatever backpressure the
/// transport applies.
pub struct Emitter<W> {
    transport: W,
    record: Record,
}

impl<W: Write> Emitter<W> {
    pub fn new(transport: W) -> Self {
        Self { transport, record: Record::new() }
    }

    pub fn transport(&self) -> &W {
        &self.transport
    }

    pub fn into_inner(self) -> W {
        self.transport
    }

    pub async fn emit(&mut self, frame: &Frame) -> Result<(), ErrorKind> {
        frame
            .write_record(&mut self.record)
            .map_err(|_| ErrorKind::OutOfMemory)?;
        self.transport
            .write_all(self.record.as_bytes())
            .await
            .map_err(|e| e.kind())
    }

    /// Emit every frame of `cycle` in sample order. Returns the frame count.
    pub async fn emit_cycle(
        &mut self,
        cycle: &Cycle<'_>,
        converter: &Converter,
    ) -> Result<usize, ErrorKind> {
        let mut emitted = 0;
        for frame in cycle.frames(converter) {
            self.emit(&frame).await?;
            emitted += 1;
        }
        Ok(emitted)
    }

    /// Write the one-time `#FAULT ...` line and flush.
    pub async fn diagnostic(&mut self, fault: &Fault) -> Result<(), ErrorKind> {
        let mut line = DiagnosticLine::new();
        if writeln!(line, "{}{}", FAULT_PREFIX, fault).is_err() {
            // Too long to render; the bare prefix still marks the halt.
            line.clear();
            line.push_str("#FAULT\n").map_err(|_| ErrorKind::OutOfMemory)?;
        }
        self.transport
            .write_all(line.as_bytes())
            .await
            .map_err(|e| e.kind())?;
        self.transport.flush().await.map_err(|e| e.kind())
    }
}
