//! Error types for profiles, channel configuration and transmission.
//!
//! Nothing here is fatal. Profile and channel errors are raised once, while
//! the static configuration is loaded; transmission errors are recovered by
//! the [`ActivationController`](crate::controller::ActivationController).

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

use crate::channel::ChannelId;

/// A [`ProtocolProfile`](crate::profile::ProtocolProfile) that cannot produce a valid frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum EncodingError {
    /// A pulse, gap or sync duration was zero.
    #[error("{0} must be longer than 0 µs")]
    ZeroDuration(&'static str),

    /// The profile would send nothing.
    #[error("repeat count must be at least 1")]
    ZeroRepeats,

    /// More repeats than a frame buffer can hold.
    #[error("repeat count {0} exceeds the maximum")]
    TooManyRepeats(u8),

    /// A repeat gap too short to split into two non-empty halves.
    #[error("repeat gap of {0} µs is too short, use 0 or at least 2 µs")]
    RepeatGapTooShort(u32),
}

/// Static channel configuration that was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// The code does not fit in 24 bits.
    #[error("code {0:#x} does not fit in 24 bits")]
    CodeOutOfRange(u32),

    /// Two channels share an id.
    #[error("channel {0} is already registered")]
    DuplicateChannel(ChannelId),

    /// The registry has no room left.
    #[error("channel registry is full")]
    RegistryFull,

    /// The channel's profile is invalid.
    #[error("invalid profile: {0}")]
    Profile(#[from] EncodingError),
}

/// Failure to get a frame on the air.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxError {
    /// The port did not report completion within the bounded wait.
    #[error("transmission timed out")]
    Timeout,

    /// The frame buffer could not be allocated.
    #[error("no memory for the frame buffer")]
    ResourceExhausted,

    /// The output pin reported an error.
    #[error("output pin error: {0:?}")]
    Pin(ErrorKind),
}

/// Top-level error returned by the controller and the mailbox.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// No channel is registered under this id.
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// The event queue is full and the event was dropped.
    #[error("event queue is full")]
    QueueFull,

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transmission error. The channel state machine has already recovered.
    #[error(transparent)]
    Transmit(#[from] TxError),
}
