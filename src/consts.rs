//! Constants used across the CAME encoder and activation controller.
//!
//! This module pins the protocol-wide values: code width, timing presets
//! captured from working remotes, buffer capacities and controller defaults.
//!
//! ## Key Concepts
//!
//! - **Code width**: CAME fixed-code remotes send exactly 24 data bits.
//! - **Timings**: three timing families were observed in the field
//!   (320/640 µs, 300/900 µs, 350/1050 µs). The 320/640 µs family is the one
//!   that matches a Flipper Zero capture of the original remote.
//! - **Capacities**: `no_std` builds use fixed-capacity buffers; the limits
//!   below size them.
//!
//! Durations are in microseconds unless the name says otherwise.

/// Number of data bits in a CAME code.
pub const CODE_BITS: u8 = 24;

/// Mask of the valid bits of a CAME code (`2^24 - 1`).
pub const CODE_MASK: u32 = (1 << CODE_BITS) - 1;

/// Short high pulse of the working profile.
pub const CAME_SHORT_PULSE_US: u32 = 320;

/// Long high pulse of the working profile.
pub const CAME_LONG_PULSE_US: u32 = 640;

/// Short low gap of the working profile.
pub const CAME_SHORT_GAP_US: u32 = 320;

/// Long low gap of the working profile.
pub const CAME_LONG_GAP_US: u32 = 640;

/// Low header that opens a CAME frame (76 short periods).
pub const CAME_HEADER_US: u32 = 24_320;

/// High start bit that follows the header.
pub const CAME_START_BIT_US: u32 = 320;

/// Short pulse of the older 1:3 timing family.
pub const CAME_LEGACY_SHORT_US: u32 = 300;

/// Long pulse of the older 1:3 timing family.
pub const CAME_LEGACY_LONG_US: u32 = 900;

/// Short pulse of the wide 1:3 timing family.
pub const CAME_WIDE_SHORT_US: u32 = 350;

/// Long pulse of the wide 1:3 timing family.
pub const CAME_WIDE_LONG_US: u32 = 1_050;

/// Number of frame repetitions sent per activation.
///
/// Twelve repeats keep the carrier up for roughly half a second, which is
/// long enough for slow receivers to lock on.
pub const CAME_REPEATS: u8 = 12;

/// Upper bound accepted for [`ProtocolProfile`](crate::profile::ProtocolProfile) repeats.
pub const MAX_REPEATS: u8 = 16;

/// Worst-case number of symbols per repetition: preamble, sync, 24 bits and a repeat gap.
pub const MAX_SYMBOLS_PER_REPEAT: usize = CODE_BITS as usize + 3;

/// Capacity of a [`TransmissionFrame`](crate::frame::TransmissionFrame) in `no_std` builds.
pub const MAX_FRAME_SYMBOLS: usize = MAX_REPEATS as usize * MAX_SYMBOLS_PER_REPEAT;

/// Maximum number of channels a registry can hold.
pub const MAX_CHANNELS: usize = 4;

/// Time after the last activation before the exposed state returns to off.
pub const DEBOUNCE_MS: u64 = 5_000;

/// Slack allowed on top of a frame's air time before the port is declared stuck.
pub const TX_TIMEOUT_MS: u64 = 1_000;

/// Endpoint of the main gate channel.
pub const CHANNEL_A_ENDPOINT: u8 = 1;

/// Endpoint of the parking gate channel.
pub const CHANNEL_B_ENDPOINT: u8 = 2;

/// Code of the main gate remote.
pub const KEY_A: u32 = 0x0003_B29B;

/// Code of the parking gate remote.
pub const KEY_B: u32 = 0x0003_B29A;
