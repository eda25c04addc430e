//! Transmission frames.
//!
//! A [`TransmissionFrame`] is the ordered list of [`OokSymbol`]s produced by
//! [`encode`](crate::encoding::encode) for one activation. It is handed to a
//! [`TransmissionPort`](crate::port::TransmissionPort) and dropped once the
//! port is done with it.
//!
//! Frames can also be rendered as signed raw timings (positive = carrier on,
//! negative = carrier off), the format used by Flipper Zero `.sub` captures,
//! so an encoded frame can be diffed against a recording of a real remote.

use core::fmt;

#[cfg(not(feature = "std"))]
use crate::consts::MAX_FRAME_SYMBOLS;
use crate::encoding::{Level, OokSymbol, Pulse};
use crate::error::TxError;

#[cfg(not(feature = "std"))]
type SymbolBuf = heapless::Vec<OokSymbol, MAX_FRAME_SYMBOLS>;
#[cfg(feature = "std")]
type SymbolBuf = Vec<OokSymbol>;

/// Number of raw timings per `RAW_Data:` line in a `.sub` file.
const RAW_DATA_PER_LINE: usize = 512;

/// An encoded frame, ready to be played by a port.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TransmissionFrame {
    symbols: SymbolBuf,
}

impl TransmissionFrame {
    /// Allocates an empty frame able to hold `len` symbols.
    ///
    /// # Errors
    /// [`TxError::ResourceExhausted`] when the allocation fails (`std`) or when
    /// `len` exceeds the fixed capacity (`no_std`).
    #[cfg(feature = "std")]
    pub(crate) fn with_capacity(len: usize) -> Result<Self, TxError> {
        let mut symbols = Vec::new();
        symbols
            .try_reserve_exact(len)
            .map_err(|_| TxError::ResourceExhausted)?;
        Ok(Self { symbols })
    }

    /// Allocates an empty frame able to hold `len` symbols.
    ///
    /// # Errors
    /// [`TxError::ResourceExhausted`] when the allocation fails (`std`) or when
    /// `len` exceeds the fixed capacity (`no_std`).
    #[cfg(not(feature = "std"))]
    pub(crate) fn with_capacity(len: usize) -> Result<Self, TxError> {
        if len > MAX_FRAME_SYMBOLS {
            return Err(TxError::ResourceExhausted);
        }
        Ok(Self {
            symbols: heapless::Vec::new(),
        })
    }

    #[cfg(feature = "std")]
    pub(crate) fn push(&mut self, symbol: OokSymbol) -> Result<(), TxError> {
        self.symbols.push(symbol);
        Ok(())
    }

    #[cfg(not(feature = "std"))]
    pub(crate) fn push(&mut self, symbol: OokSymbol) -> Result<(), TxError> {
        self.symbols
            .push(symbol)
            .map_err(|_| TxError::ResourceExhausted)
    }

    /// The symbols in transmission order.
    pub fn symbols(&self) -> &[OokSymbol] {
        &self.symbols
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the frame holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every half of every symbol, in transmission order.
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> + '_ {
        self.symbols.iter().flat_map(OokSymbol::pulses)
    }

    /// Total air time in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.symbols.iter().map(OokSymbol::duration_us).sum()
    }

    /// Signed raw timings with adjacent equal levels merged.
    pub fn raw_timings(&self) -> RawTimings<'_> {
        RawTimings {
            symbols: &self.symbols,
            index: 0,
        }
    }

    /// Writes the frame as `.sub`-style `RAW_Data:` lines.
    ///
    /// ```rust
    /// use came433::channel::Code;
    /// use came433::encoding::encode;
    /// use came433::profile::ProfileBuilder;
    ///
    /// let profile = ProfileBuilder::new().repeats(1).build().unwrap();
    /// let frame = encode(Code::new(0x03B29B).unwrap(), &profile).unwrap();
    /// let mut out = String::new();
    /// frame.write_raw_data(&mut out).unwrap();
    /// assert!(out.starts_with("RAW_Data: -24320 320 -320 640"));
    /// ```
    pub fn write_raw_data<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for (i, timing) in self.raw_timings().enumerate() {
            if i % RAW_DATA_PER_LINE == 0 {
                if i > 0 {
                    out.write_char('\n')?;
                }
                out.write_str("RAW_Data:")?;
            }
            write!(out, " {}", timing)?;
        }
        if !self.is_empty() {
            out.write_char('\n')?;
        }
        Ok(())
    }
}

/// Iterator over merged signed timings, see [`TransmissionFrame::raw_timings`].
#[derive(Debug, Clone)]
pub struct RawTimings<'a> {
    symbols: &'a [OokSymbol],
    index: usize,
}

impl RawTimings<'_> {
    fn pulse_at(&self, index: usize) -> Option<Pulse> {
        let symbol = self.symbols.get(index / 2)?;
        Some(if index % 2 == 0 {
            symbol.first
        } else {
            symbol.second
        })
    }
}

impl Iterator for RawTimings<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.pulse_at(self.index)?;
        let mut total = i64::from(head.duration_us);
        self.index += 1;
        while let Some(pulse) = self.pulse_at(self.index) {
            if pulse.level != head.level {
                break;
            }
            total += i64::from(pulse.duration_us);
            self.index += 1;
        }
        Some(match head.level {
            Level::High => total,
            Level::Low => -total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Code;
    use crate::encoding::encode;
    use crate::profile::ProfileBuilder;

    #[cfg(feature = "std")]
    #[test]
    fn test_allocation_failure_is_reported() {
        assert_eq!(
            TransmissionFrame::with_capacity(usize::MAX),
            Err(TxError::ResourceExhausted)
        );
        assert!(TransmissionFrame::with_capacity(16).unwrap().is_empty());
    }

    #[cfg(not(feature = "std"))]
    #[test]
    fn test_capacity_is_bounded() {
        use crate::consts::MAX_FRAME_SYMBOLS;

        assert_eq!(
            TransmissionFrame::with_capacity(MAX_FRAME_SYMBOLS + 1),
            Err(TxError::ResourceExhausted)
        );
        let mut frame = TransmissionFrame::with_capacity(MAX_FRAME_SYMBOLS).unwrap();
        let symbol = OokSymbol::new(Pulse::low(1), Pulse::high(1));
        for _ in 0..MAX_FRAME_SYMBOLS {
            frame.push(symbol).unwrap();
        }
        assert_eq!(frame.push(symbol), Err(TxError::ResourceExhausted));
    }

    #[test]
    fn test_raw_timings_merge_equal_levels() {
        let profile = ProfileBuilder::new()
            .repeats(2)
            .repeat_gap(10_000)
            .build()
            .unwrap();
        let frame = encode(Code::new(0x00_0000).unwrap(), &profile).unwrap();
        let raw: Vec<i64> = frame.raw_timings().collect();

        // sync + 24 zero cells per repeat, the gap merges with the next header
        assert_eq!(raw.len(), 2 * 2 * 25);
        assert_eq!(&raw[..4], &[-24_320, 320, -320, 640]);
        assert_eq!(raw[50], -(10_000 + 24_320));
        assert_eq!(raw.iter().map(|t| t.unsigned_abs()).sum::<u64>(), frame.duration_us());
    }

    #[test]
    fn test_duration() {
        let profile = ProfileBuilder::new().repeats(1).build().unwrap();
        let frame = encode(Code::new(0x00_0000).unwrap(), &profile).unwrap();
        assert_eq!(frame.duration_us(), 24_320 + 320 + 24 * 960);
    }

    #[test]
    fn test_write_raw_data_wraps_lines() {
        let profile = ProfileBuilder::new().repeats(12).build().unwrap();
        let frame = encode(Code::new(0x03_B29B).unwrap(), &profile).unwrap();
        let mut out = String::new();
        frame.write_raw_data(&mut out).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("RAW_Data: ")));
        let values = lines
            .iter()
            .map(|l| l.split_whitespace().skip(1).count())
            .collect::<Vec<_>>();
        assert_eq!(values, vec![512, frame.raw_timings().count() - 512]);
    }

    #[test]
    fn test_empty_frame_writes_nothing() {
        let frame = TransmissionFrame::with_capacity(0).unwrap();
        let mut out = String::new();
        frame.write_raw_data(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
