//! Channels and the channel registry.
//!
//! A channel is one controlled gate: a fixed [`Code`], the
//! [`ProtocolProfile`] used to send it, and the live activation state the
//! controller exposes upstream. Channels are created once, from static
//! [`ChannelConfig`]s, and live for the lifetime of the
//! [`ActivationController`](crate::controller::ActivationController) that
//! owns the [`ChannelRegistry`].

use core::fmt;

use heapless::Vec;

use crate::consts::{
    CHANNEL_A_ENDPOINT, CHANNEL_B_ENDPOINT, CODE_MASK, KEY_A, KEY_B, MAX_CHANNELS,
};
use crate::error::ConfigError;
use crate::led::Rgb;
use crate::profile::ProtocolProfile;
use crate::timer::DebounceTimer;

/// A 24-bit CAME code.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct Code(u32);

impl Code {
    /// Wraps `value`, rejecting anything wider than 24 bits.
    pub const fn new(value: u32) -> Result<Self, ConfigError> {
        if value & !CODE_MASK != 0 {
            return Err(ConfigError::CodeOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The raw code.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Code {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

#[cfg(feature = "defmt-0-3")]
impl defmt::Format for Code {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u32:#x}", self.0)
    }
}

/// Identifies a channel. The value is the network endpoint it is exposed on.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ChannelId(pub u8);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EP{}", self.0)
    }
}

/// Main gate.
pub const CHANNEL_A: ChannelId = ChannelId(CHANNEL_A_ENDPOINT);

/// Parking gate.
pub const CHANNEL_B: ChannelId = ChannelId(CHANNEL_B_ENDPOINT);

/// Where a channel is in its activation cycle.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ChannelState {
    /// Nothing pending; the exposed state is off.
    #[default]
    Idle,
    /// A frame is being played by the port.
    Transmitting,
    /// The frame is done; the exposed state stays on until the debounce timer fires.
    DebounceWindow,
}

/// Static description of a channel.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ChannelConfig {
    /// Channel id.
    pub id: ChannelId,
    /// Human-readable name, used in logs.
    pub label: &'static str,
    /// Raw 24-bit code; checked when the channel is registered.
    pub code: u32,
    /// Protocol profile used to send the code.
    pub profile: ProtocolProfile,
    /// LED colour shown while this channel transmits.
    pub color: Rgb,
}

/// The two gates of the reference installation.
pub const DEFAULT_CHANNELS: [ChannelConfig; 2] = [
    ChannelConfig {
        id: CHANNEL_A,
        label: "Portail principal",
        code: KEY_A,
        profile: ProtocolProfile::came_working(),
        color: Rgb::new(0, 128, 255),
    },
    ChannelConfig {
        id: CHANNEL_B,
        label: "Portail parking",
        code: KEY_B,
        profile: ProtocolProfile::came_working(),
        color: Rgb::new(255, 0, 255),
    },
];

/// One controlled gate and its live state.
#[derive(Debug)]
pub struct Channel {
    id: ChannelId,
    label: &'static str,
    code: Code,
    profile: ProtocolProfile,
    color: Rgb,
    active: bool,
    state: ChannelState,
    debounce: Option<DebounceTimer>,
}

impl Channel {
    /// Builds a channel from its static configuration.
    pub fn from_config(config: &ChannelConfig) -> Result<Self, ConfigError> {
        let code = Code::new(config.code)?;
        Ok(Self {
            id: config.id,
            label: config.label,
            code,
            profile: config.profile,
            color: config.color,
            active: false,
            state: ChannelState::Idle,
            debounce: None,
        })
    }

    /// Channel id.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The code this channel sends.
    pub fn code(&self) -> Code {
        self.code
    }

    /// The profile used to send the code.
    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    /// LED colour shown while transmitting.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// The exposed on/off state.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current activation state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// The debounce timer, once the channel has been activated at least once.
    pub fn debounce(&self) -> Option<&DebounceTimer> {
        self.debounce.as_ref()
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_state(&mut self, state: ChannelState) {
        self.state = state;
    }

    /// Returns the debounce timer, creating it on first use.
    pub(crate) fn debounce_or_insert(
        &mut self,
        create: impl FnOnce() -> DebounceTimer,
    ) -> &mut DebounceTimer {
        self.debounce.get_or_insert_with(create)
    }

    pub(crate) fn debounce_mut(&mut self) -> Option<&mut DebounceTimer> {
        self.debounce.as_mut()
    }
}

/// Fixed-capacity set of channels keyed by [`ChannelId`].
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: Vec<Channel, MAX_CHANNELS>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Builds a registry from a list of channel configurations.
    ///
    /// ```rust
    /// use came433::channel::{ChannelRegistry, CHANNEL_A, DEFAULT_CHANNELS};
    ///
    /// let registry = ChannelRegistry::from_configs(&DEFAULT_CHANNELS).unwrap();
    /// assert_eq!(registry.len(), 2);
    /// assert_eq!(registry.get(CHANNEL_A).unwrap().code().value(), 0x03B29B);
    /// ```
    pub fn from_configs(configs: &[ChannelConfig]) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// Adds one channel.
    ///
    /// # Errors
    /// - [`ConfigError::DuplicateChannel`] if the id is taken
    /// - [`ConfigError::RegistryFull`] past [`MAX_CHANNELS`]
    /// - [`ConfigError::CodeOutOfRange`] for a code wider than 24 bits
    pub fn register(&mut self, config: &ChannelConfig) -> Result<(), ConfigError> {
        if self.get(config.id).is_some() {
            return Err(ConfigError::DuplicateChannel(config.id));
        }
        let channel = Channel::from_config(config)?;
        self.channels
            .push(channel)
            .map_err(|_| ConfigError::RegistryFull)
    }

    /// Looks up a channel.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Looks up a channel for mutation.
    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id == id)
    }

    /// All channels, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.iter_mut()
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channel is registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
