//! Protocol profiles: the timing and framing parameters of one CAME variant.
//!
//! A [`ProtocolProfile`] is immutable once built. It is validated by
//! [`ProfileBuilder::build`] so that the encoder never has to reject input;
//! a profile that passes validation always encodes.
//!
//! ## Presets
//!
//! | Preset                             | Pulse/gap (µs)   | Sync | Repeats |
//! |------------------------------------|------------------|------|---------|
//! | [`ProtocolProfile::came_working`]  | 320 / 640        | yes  | 12      |
//! | [`ProtocolProfile::came_legacy`]   | 300 / 900        | yes  | 12      |
//! | [`ProtocolProfile::came_wide`]     | 350 / 1050       | yes  | 12      |
//!
//! A device build should pin exactly one of these.

use crate::consts::{
    CAME_HEADER_US, CAME_LEGACY_LONG_US, CAME_LEGACY_SHORT_US, CAME_LONG_GAP_US,
    CAME_LONG_PULSE_US, CAME_REPEATS, CAME_SHORT_GAP_US, CAME_SHORT_PULSE_US, CAME_START_BIT_US,
    CAME_WIDE_LONG_US, CAME_WIDE_SHORT_US, CODE_BITS, MAX_REPEATS,
};
use crate::encoding::Level;
use crate::error::EncodingError;

/// Order in which the 24 code bits are put on the air.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BitOrder {
    /// Bit 23 first, bit 0 last.
    #[default]
    MsbFirst,
    /// Bit 0 first, bit 23 last.
    LsbFirst,
}

/// Timing and framing parameters for one protocol variant.
///
/// Build one with [`ProfileBuilder`] or start from a preset. All durations
/// are in microseconds.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ProtocolProfile {
    short_pulse: u32,
    long_pulse: u32,
    short_gap: u32,
    long_gap: u32,
    header: u32,
    start_bit: u32,
    invert_logic: bool,
    use_preamble: bool,
    use_sync: bool,
    bit_order: BitOrder,
    repeats: u8,
    repeat_gap: u32,
    idle_level: Level,
}

impl ProtocolProfile {
    /// 320/640 µs timings with a 24.32 ms sync header.
    ///
    /// These are the timings that open the gate reliably, checked against a
    /// Flipper Zero capture of the original remote.
    pub const fn came_working() -> Self {
        Self {
            short_pulse: CAME_SHORT_PULSE_US,
            long_pulse: CAME_LONG_PULSE_US,
            short_gap: CAME_SHORT_GAP_US,
            long_gap: CAME_LONG_GAP_US,
            header: CAME_HEADER_US,
            start_bit: CAME_START_BIT_US,
            invert_logic: false,
            use_preamble: false,
            use_sync: true,
            bit_order: BitOrder::MsbFirst,
            repeats: CAME_REPEATS,
            repeat_gap: 0,
            idle_level: Level::Low,
        }
    }

    /// Older 300/900 µs timings.
    pub const fn came_legacy() -> Self {
        Self {
            short_pulse: CAME_LEGACY_SHORT_US,
            long_pulse: CAME_LEGACY_LONG_US,
            short_gap: CAME_LEGACY_SHORT_US,
            long_gap: CAME_LEGACY_LONG_US,
            ..Self::came_working()
        }
    }

    /// Wide 350/1050 µs timings.
    pub const fn came_wide() -> Self {
        Self {
            short_pulse: CAME_WIDE_SHORT_US,
            long_pulse: CAME_WIDE_LONG_US,
            short_gap: CAME_WIDE_SHORT_US,
            long_gap: CAME_WIDE_LONG_US,
            ..Self::came_working()
        }
    }

    /// Returns a builder seeded with this profile's values.
    pub fn to_builder(&self) -> ProfileBuilder {
        ProfileBuilder { profile: *self }
    }

    /// Short high pulse.
    pub fn short_pulse(&self) -> u32 {
        self.short_pulse
    }

    /// Long high pulse.
    pub fn long_pulse(&self) -> u32 {
        self.long_pulse
    }

    /// Short low gap.
    pub fn short_gap(&self) -> u32 {
        self.short_gap
    }

    /// Long low gap.
    pub fn long_gap(&self) -> u32 {
        self.long_gap
    }

    /// Low header of the sync symbol.
    pub fn header(&self) -> u32 {
        self.header
    }

    /// High start bit of the sync symbol.
    pub fn start_bit(&self) -> u32 {
        self.start_bit
    }

    /// Whether the bit-1 and bit-0 timings are swapped.
    pub fn invert_logic(&self) -> bool {
        self.invert_logic
    }

    /// Whether each repetition starts with the compatibility preamble.
    pub fn use_preamble(&self) -> bool {
        self.use_preamble
    }

    /// Whether each repetition starts with the header/start-bit sync symbol.
    pub fn use_sync(&self) -> bool {
        self.use_sync
    }

    /// Bit order on the air.
    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Number of repetitions per frame.
    pub fn repeats(&self) -> u8 {
        self.repeats
    }

    /// Idle time inserted between repetitions, `0` when repetitions are back to back.
    pub fn repeat_gap(&self) -> u32 {
        self.repeat_gap
    }

    /// Logical level the port holds before and after the frame.
    ///
    /// [`PinPort`](crate::port::PinPort) output inversion applies on top of it.
    pub fn idle_level(&self) -> Level {
        self.idle_level
    }

    /// Number of symbols in one repetition.
    pub fn symbols_per_repeat(&self) -> usize {
        CODE_BITS as usize + usize::from(self.use_preamble) + usize::from(self.use_sync)
    }

    /// Number of symbols [`encode`](crate::encoding::encode) produces with this profile.
    pub fn frame_len(&self) -> usize {
        let repeats = usize::from(self.repeats);
        let gaps = if self.repeat_gap > 0 { repeats - 1 } else { 0 };
        repeats * self.symbols_per_repeat() + gaps
    }

    fn validate(&self) -> Result<(), EncodingError> {
        let durations = [
            ("short pulse", self.short_pulse),
            ("long pulse", self.long_pulse),
            ("short gap", self.short_gap),
            ("long gap", self.long_gap),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(EncodingError::ZeroDuration(name));
            }
        }
        if self.use_sync {
            if self.header == 0 {
                return Err(EncodingError::ZeroDuration("header"));
            }
            if self.start_bit == 0 {
                return Err(EncodingError::ZeroDuration("start bit"));
            }
        }
        if self.repeats == 0 {
            return Err(EncodingError::ZeroRepeats);
        }
        if self.repeats > MAX_REPEATS {
            return Err(EncodingError::TooManyRepeats(self.repeats));
        }
        if self.repeat_gap == 1 {
            return Err(EncodingError::RepeatGapTooShort(self.repeat_gap));
        }
        Ok(())
    }
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self::came_working()
    }
}

/// Builder for [`ProtocolProfile`].
///
/// Starts from [`ProtocolProfile::came_working`]; every setter overrides one
/// field and [`build`](ProfileBuilder::build) validates the result.
///
/// ```rust
/// use came433::profile::{BitOrder, ProfileBuilder};
///
/// let profile = ProfileBuilder::new()
///     .pulses(300, 900)
///     .gaps(300, 900)
///     .bit_order(BitOrder::MsbFirst)
///     .repeats(4)
///     .build()
///     .unwrap();
/// assert_eq!(profile.frame_len(), 4 * 25);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileBuilder {
    profile: ProtocolProfile,
}

impl ProfileBuilder {
    /// Creates a builder seeded with the working CAME profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the short and long high pulses.
    pub fn pulses(mut self, short: u32, long: u32) -> Self {
        self.profile.short_pulse = short;
        self.profile.long_pulse = long;
        self
    }

    /// Sets the short and long low gaps.
    pub fn gaps(mut self, short: u32, long: u32) -> Self {
        self.profile.short_gap = short;
        self.profile.long_gap = long;
        self
    }

    /// Sets the sync header and start bit, and enables sync.
    pub fn sync(mut self, header: u32, start_bit: u32) -> Self {
        self.profile.header = header;
        self.profile.start_bit = start_bit;
        self.profile.use_sync = true;
        self
    }

    /// Enables or disables the sync symbol.
    pub fn use_sync(mut self, enabled: bool) -> Self {
        self.profile.use_sync = enabled;
        self
    }

    /// Enables or disables the compatibility preamble.
    pub fn use_preamble(mut self, enabled: bool) -> Self {
        self.profile.use_preamble = enabled;
        self
    }

    /// Swaps bit-1 and bit-0 timings.
    pub fn invert_logic(mut self, inverted: bool) -> Self {
        self.profile.invert_logic = inverted;
        self
    }

    /// Sets the bit order.
    pub fn bit_order(mut self, order: BitOrder) -> Self {
        self.profile.bit_order = order;
        self
    }

    /// Sets the number of repetitions.
    pub fn repeats(mut self, repeats: u8) -> Self {
        self.profile.repeats = repeats;
        self
    }

    /// Sets the idle time inserted between repetitions (`0` disables it).
    pub fn repeat_gap(mut self, micros: u32) -> Self {
        self.profile.repeat_gap = micros;
        self
    }

    /// Sets the level held outside of a transmission.
    pub fn idle_level(mut self, level: Level) -> Self {
        self.profile.idle_level = level;
        self
    }

    /// Validates and returns the profile.
    pub fn build(self) -> Result<ProtocolProfile, EncodingError> {
        self.profile.validate()?;
        Ok(self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in [
            ProtocolProfile::came_working(),
            ProtocolProfile::came_legacy(),
            ProtocolProfile::came_wide(),
        ] {
            assert_eq!(preset.to_builder().build(), Ok(preset));
        }
    }

    #[test]
    fn test_legacy_keeps_working_framing() {
        let legacy = ProtocolProfile::came_legacy();
        assert_eq!(legacy.short_pulse(), 300);
        assert_eq!(legacy.long_gap(), 900);
        assert_eq!(legacy.header(), CAME_HEADER_US);
        assert!(legacy.use_sync());
        assert_eq!(legacy.repeats(), CAME_REPEATS);
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert_eq!(
            ProfileBuilder::new().pulses(0, 640).build(),
            Err(EncodingError::ZeroDuration("short pulse"))
        );
        assert_eq!(
            ProfileBuilder::new().gaps(320, 0).build(),
            Err(EncodingError::ZeroDuration("long gap"))
        );
        assert_eq!(
            ProfileBuilder::new().sync(0, 320).build(),
            Err(EncodingError::ZeroDuration("header"))
        );
    }

    #[test]
    fn test_sync_durations_ignored_without_sync() {
        let profile = ProfileBuilder::new().sync(0, 0).use_sync(false).build();
        assert!(profile.is_ok());
    }

    #[test]
    fn test_repeat_bounds() {
        assert_eq!(
            ProfileBuilder::new().repeats(0).build(),
            Err(EncodingError::ZeroRepeats)
        );
        assert_eq!(
            ProfileBuilder::new().repeats(MAX_REPEATS + 1).build(),
            Err(EncodingError::TooManyRepeats(MAX_REPEATS + 1))
        );
        assert!(ProfileBuilder::new().repeats(MAX_REPEATS).build().is_ok());
    }

    #[test]
    fn test_repeat_gap_of_one_rejected() {
        assert_eq!(
            ProfileBuilder::new().repeat_gap(1).build(),
            Err(EncodingError::RepeatGapTooShort(1))
        );
        assert!(ProfileBuilder::new().repeat_gap(2).build().is_ok());
    }

    #[test]
    fn test_frame_len() {
        let working = ProtocolProfile::came_working();
        assert_eq!(working.frame_len(), 12 * 25);

        let profile = ProfileBuilder::new()
            .use_preamble(true)
            .repeats(3)
            .repeat_gap(10_000)
            .build()
            .unwrap();
        assert_eq!(profile.symbols_per_repeat(), 26);
        assert_eq!(profile.frame_len(), 3 * 26 + 2);
    }
}
