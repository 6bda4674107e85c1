//! Satellite radio that writes packets as text.

use std::io::Write;

use eidlink_core::{SatPacket, SatelliteRadio};

/// Writes each packet as `channel <n>: <symbols as hex>` on its own line.
///
/// Stands in for a modem on hosts without satellite hardware.
#[derive(Debug)]
pub struct StdoutRadio<W = std::io::Stdout> {
    out: W,
    sent: usize,
}

impl StdoutRadio {
    /// Radio writing to the process's stdout.
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for StdoutRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdoutRadio<W> {
    /// Radio writing to `out`.
    pub fn with_writer(out: W) -> Self {
        Self { out, sent: 0 }
    }

    /// Packets written so far.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SatelliteRadio for StdoutRadio<W> {
    type Error = std::io::Error;

    fn transmit_packet(&mut self, packet: &SatPacket) -> Result<(), Self::Error> {
        write!(self.out, "channel {:2}:", packet.channel())?;
        for symbol in packet.symbols() {
            write!(self.out, " {symbol:02x}")?;
        }
        writeln!(self.out)?;
        self.sent += 1;
        tracing::debug!(channel = packet.channel(), symbols = packet.len(), "packet transmitted");
        Ok(())
    }
}
