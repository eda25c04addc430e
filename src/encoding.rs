//! CAME pulse-width encoding.
//!
//! This module turns a 24-bit [`Code`] into the timed on/off sequence a CAME
//! receiver expects. It is a pure function of the code and the
//! [`ProtocolProfile`]: the same input always yields the same frame, and no
//! I/O happens here.
//!
//! ## Bit cells
//!
//! Every bit is one [`OokSymbol`]: a low half followed by a high half. The
//! value is carried by the ratio between the two.
//!
//! | Bit | Low half   | High half     |
//! |-----|------------|---------------|
//! | `1` | `long_gap` | `short_pulse` |
//! | `0` | `short_gap`| `long_pulse`  |
//!
//! With [`invert_logic`](ProtocolProfile::invert_logic) the two rows swap.
//!
//! ## Frame layout
//!
//! Each repetition is, in order: an optional preamble
//! `(high, 4 × long_pulse)(low, short_pulse)`, an optional sync
//! `(low, header)(high, start_bit)`, then the 24 bit cells in the profile's
//! [`BitOrder`]. Repetitions are concatenated; if the profile sets a
//! [`repeat_gap`](ProtocolProfile::repeat_gap), one all-low symbol is placed
//! between consecutive repetitions.

use core::ops::Not;

use crate::channel::Code;
use crate::consts::CODE_BITS;
use crate::error::TxError;
use crate::frame::TransmissionFrame;
use crate::profile::{BitOrder, ProtocolProfile};

/// Logical output level: carrier off (`Low`) or on (`High`).
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Level {
    /// Carrier off.
    #[default]
    Low,
    /// Carrier on.
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`].
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// One level held for a fixed time.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Pulse {
    /// Output level.
    pub level: Level,
    /// How long the level is held, in microseconds. Never zero.
    pub duration_us: u32,
}

impl Pulse {
    /// A high pulse.
    pub const fn high(duration_us: u32) -> Self {
        Self {
            level: Level::High,
            duration_us,
        }
    }

    /// A low pulse.
    pub const fn low(duration_us: u32) -> Self {
        Self {
            level: Level::Low,
            duration_us,
        }
    }
}

/// Two consecutive pulses: one bit cell, a sync or preamble mark, or a gap.
///
/// This matches the two-half symbol word used by pulse-train peripherals
/// such as the ESP32 RMT.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct OokSymbol {
    /// First half.
    pub first: Pulse,
    /// Second half.
    pub second: Pulse,
}

impl OokSymbol {
    /// Creates a symbol from its two halves.
    pub const fn new(first: Pulse, second: Pulse) -> Self {
        Self { first, second }
    }

    /// Both halves in transmission order.
    pub fn pulses(&self) -> [Pulse; 2] {
        [self.first, self.second]
    }

    /// Total air time of the symbol in microseconds.
    pub fn duration_us(&self) -> u64 {
        u64::from(self.first.duration_us) + u64::from(self.second.duration_us)
    }
}

/// Returns the bit cell for `bit` under `profile`.
pub fn encode_bit(bit: bool, profile: &ProtocolProfile) -> OokSymbol {
    let one = OokSymbol::new(
        Pulse::low(profile.long_gap()),
        Pulse::high(profile.short_pulse()),
    );
    let zero = OokSymbol::new(
        Pulse::low(profile.short_gap()),
        Pulse::high(profile.long_pulse()),
    );
    if bit != profile.invert_logic() { one } else { zero }
}

/// Returns the bits of `code` in the order they go on the air.
pub fn code_bits(code: Code, order: BitOrder) -> impl Iterator<Item = bool> {
    let value = code.value();
    (0..CODE_BITS).map(move |i| {
        let shift = match order {
            BitOrder::MsbFirst => CODE_BITS - 1 - i,
            BitOrder::LsbFirst => i,
        };
        (value >> shift) & 1 == 1
    })
}

/// Encodes `code` into a full transmission frame.
///
/// # Returns
/// A frame of exactly [`profile.frame_len()`](ProtocolProfile::frame_len) symbols.
///
/// # Errors
/// [`TxError::ResourceExhausted`] if the frame buffer cannot be allocated.
/// The profile itself was validated when it was built, so no other error is
/// possible here.
pub fn encode(code: Code, profile: &ProtocolProfile) -> Result<TransmissionFrame, TxError> {
    let mut frame = TransmissionFrame::with_capacity(profile.frame_len())?;
    let one = encode_bit(true, profile);
    let zero = encode_bit(false, profile);
    let gap = profile.repeat_gap();

    for repeat in 0..profile.repeats() {
        if repeat > 0 && gap > 0 {
            frame.push(OokSymbol::new(
                Pulse::low(gap - gap / 2),
                Pulse::low(gap / 2),
            ))?;
        }
        if profile.use_preamble() {
            frame.push(OokSymbol::new(
                Pulse::high(profile.long_pulse().saturating_mul(4)),
                Pulse::low(profile.short_pulse()),
            ))?;
        }
        if profile.use_sync() {
            frame.push(OokSymbol::new(
                Pulse::low(profile.header()),
                Pulse::high(profile.start_bit()),
            ))?;
        }
        for bit in code_bits(code, profile.bit_order()) {
            frame.push(if bit { one } else { zero })?;
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::KEY_A;
    use crate::profile::ProfileBuilder;

    fn single(profile: ProfileBuilder) -> ProtocolProfile {
        profile.repeats(1).build().unwrap()
    }

    #[test]
    fn test_bit_mapping() {
        let profile = ProfileBuilder::new()
            .pulses(300, 900)
            .gaps(310, 910)
            .build()
            .unwrap();
        assert_eq!(
            encode_bit(true, &profile),
            OokSymbol::new(Pulse::low(910), Pulse::high(300))
        );
        assert_eq!(
            encode_bit(false, &profile),
            OokSymbol::new(Pulse::low(310), Pulse::high(900))
        );
    }

    #[test]
    fn test_inverted_bit_mapping() {
        let profile = ProfileBuilder::new()
            .pulses(300, 900)
            .gaps(310, 910)
            .invert_logic(true)
            .build()
            .unwrap();
        assert_eq!(
            encode_bit(true, &profile),
            OokSymbol::new(Pulse::low(310), Pulse::high(900))
        );
        assert_eq!(
            encode_bit(false, &profile),
            OokSymbol::new(Pulse::low(910), Pulse::high(300))
        );
    }

    #[test]
    fn test_working_profile_example() {
        let code = Code::new(KEY_A).unwrap();
        let profile = single(ProtocolProfile::came_working().to_builder());
        let frame = encode(code, &profile).unwrap();

        assert_eq!(frame.len(), 25);
        let pulses: Vec<Pulse> = frame.pulses().collect();
        assert_eq!(
            &pulses[..4],
            &[
                Pulse::low(24_320),
                Pulse::high(320),
                Pulse::low(320),
                Pulse::high(640),
            ]
        );

        // 0x03B29B = 0000 0011 1011 0010 1001 1011
        let expected: Vec<bool> = "000000111011001010011011".chars().map(|c| c == '1').collect();
        let one = encode_bit(true, &profile);
        let zero = encode_bit(false, &profile);
        for (symbol, bit) in frame.symbols()[1..].iter().zip(expected) {
            assert_eq!(*symbol, if bit { one } else { zero });
        }
    }

    #[test]
    fn test_bit_order() {
        let code = Code::new(0x00_0001).unwrap();
        let msb = single(ProfileBuilder::new().use_sync(false));
        let lsb = single(
            ProfileBuilder::new()
                .use_sync(false)
                .bit_order(BitOrder::LsbFirst),
        );
        let one = encode_bit(true, &msb);
        let zero = encode_bit(false, &msb);

        let frame = encode(code, &msb).unwrap();
        assert_eq!(frame.symbols()[23], one);
        assert!(frame.symbols()[..23].iter().all(|s| *s == zero));

        let frame = encode(code, &lsb).unwrap();
        assert_eq!(frame.symbols()[0], one);
        assert!(frame.symbols()[1..].iter().all(|s| *s == zero));
    }

    #[test]
    fn test_preamble_precedes_sync() {
        let profile = single(ProfileBuilder::new().use_preamble(true));
        let frame = encode(Code::new(KEY_A).unwrap(), &profile).unwrap();
        assert_eq!(frame.len(), 26);
        assert_eq!(
            frame.symbols()[0],
            OokSymbol::new(Pulse::high(2_560), Pulse::low(320))
        );
        assert_eq!(
            frame.symbols()[1],
            OokSymbol::new(Pulse::low(24_320), Pulse::high(320))
        );
    }

    #[test]
    fn test_symbol_count_matches_profile() {
        let code = Code::new(KEY_A).unwrap();
        for preamble in [false, true] {
            for sync in [false, true] {
                for repeats in [1, 2, 12] {
                    let profile = ProfileBuilder::new()
                        .use_preamble(preamble)
                        .use_sync(sync)
                        .repeats(repeats)
                        .build()
                        .unwrap();
                    let expected = usize::from(repeats)
                        * (24 + usize::from(preamble) + usize::from(sync));
                    assert_eq!(encode(code, &profile).unwrap().len(), expected);
                }
            }
        }
    }

    #[test]
    fn test_repeat_gap_between_repetitions_only() {
        let profile = ProfileBuilder::new()
            .repeats(3)
            .repeat_gap(10_001)
            .build()
            .unwrap();
        let frame = encode(Code::new(KEY_A).unwrap(), &profile).unwrap();
        assert_eq!(frame.len(), 3 * 25 + 2);

        let gap = OokSymbol::new(Pulse::low(5_001), Pulse::low(5_000));
        assert_eq!(frame.symbols()[25], gap);
        assert_eq!(frame.symbols()[51], gap);
        assert_ne!(frame.symbols()[frame.len() - 1], gap);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let code = Code::new(KEY_A).unwrap();
        let profile = ProtocolProfile::came_working();
        assert_eq!(encode(code, &profile), encode(code, &profile));
    }

    #[test]
    fn test_repetitions_are_identical() {
        let code = Code::new(0x00AB_CDEF).unwrap();
        let profile = ProfileBuilder::new().repeats(4).build().unwrap();
        let frame = encode(code, &profile).unwrap();
        let first = &frame.symbols()[..25];
        for chunk in frame.symbols().chunks(25) {
            assert_eq!(chunk, first);
        }
    }
}
