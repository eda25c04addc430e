//! The activation controller.
//!
//! [`ActivationController`] is a single actor that owns the channel registry,
//! the [`TransmissionPort`], the [`Clock`] and the two upstream collaborators
//! (LED and attribute sink). Every state change goes through `&mut self`, so
//! two transmissions can never overlap and no lock is needed around the port.
//!
//! Each channel runs the same small state machine:
//!
//! ```text
//!            activate                 frame done / failed
//!   Idle ─────────────► Transmitting ─────────────────────► DebounceWindow
//!    ▲                        ▲                                   │  │
//!    │                        └────────── activate ───────────────┘  │
//!    └──────────────────────── debounce timer fires ─────────────────┘
//! ```
//!
//! The exposed on/off state goes `true` on activation and stays `true` until
//! the debounce timer fires, so a burst of activations collapses into one
//! on/off cycle upstream.
//!
//! ## Example
//!
//! ```rust
//! use came433::channel::{ChannelRegistry, CHANNEL_A, DEFAULT_CHANNELS};
//! use came433::controller::{ActivationController, ControllerConfig, Event, NoAttributes};
//! use came433::encoding::Level;
//! use came433::error::TxError;
//! use came433::frame::TransmissionFrame;
//! use came433::led::NoIndicator;
//! use came433::port::TransmissionPort;
//! use came433::timer::StdClock;
//! use heapless::Deque;
//!
//! struct Radio;
//!
//! impl TransmissionPort for Radio {
//!     fn start(&mut self, _frame: &TransmissionFrame, _idle: Level) -> nb::Result<(), TxError> {
//!         Ok(())
//!     }
//!
//!     fn poll_done(&mut self) -> nb::Result<(), TxError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut controller = ActivationController::new(
//!     ChannelRegistry::from_configs(&DEFAULT_CHANNELS)?,
//!     Radio,
//!     StdClock::new(),
//!     NoIndicator,
//!     NoAttributes,
//!     ControllerConfig::default(),
//! );
//!
//! let mut events: Deque<Event, 4> = Deque::new();
//! events.push_back(Event::Activate(CHANNEL_A)).unwrap();
//! controller.process(&mut events);
//!
//! assert!(controller.channel(CHANNEL_A).unwrap().is_active());
//! assert_eq!(controller.tx_good, 1);
//! # Ok::<(), came433::Error>(())
//! ```

use core::fmt;
use core::time::Duration;

use heapless::Deque;

use crate::channel::{Channel, ChannelId, ChannelRegistry, ChannelState};
use crate::consts::{DEBOUNCE_MS, TX_TIMEOUT_MS};
use crate::encoding::encode;
use crate::error::Error;
use crate::led::{IdentifyEffect, Indication, Indicator};
use crate::port::{TransmissionPort, transmit};
use crate::timer::{Clock, DebounceTimer, Instant};

/// Something the controller is asked to do.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Event {
    /// Send the channel's code.
    Activate(ChannelId),
    /// The network wrote the channel's on/off attribute.
    AttributeWrite {
        /// Target channel.
        channel: ChannelId,
        /// Value written.
        on: bool,
    },
    /// Show an identify effect.
    Identify(IdentifyEffect),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Activate(channel) => write!(f, "activate {}", channel),
            Event::AttributeWrite { channel, on } => {
                write!(f, "attribute write {} = {}", channel, on)
            }
            Event::Identify(effect) => write!(f, "identify {:?}", effect),
        }
    }
}

/// A queue of pending [`Event`]s.
pub trait EventSource {
    /// Removes the next event, or `None` when the source is drained.
    fn next_event(&mut self) -> Option<Event>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Option<Event> {
        (**self).next_event()
    }
}

impl<const N: usize> EventSource for Deque<Event, N> {
    fn next_event(&mut self) -> Option<Event> {
        self.pop_front()
    }
}

/// Receives the exposed state of each channel.
///
/// Two values are published per channel:
/// - the on/off state, which stays on for the whole debounce window
/// - the transmitting flag, which is only set while a frame is on the air
pub trait AttributeSink {
    /// Publishes `active` as the new on/off state of `channel`.
    fn report(&mut self, channel: ChannelId, active: bool);

    /// Publishes whether `channel` is transmitting right now.
    fn report_transmitting(&mut self, _channel: ChannelId, _transmitting: bool) {}
}

impl<A: AttributeSink + ?Sized> AttributeSink for &mut A {
    fn report(&mut self, channel: ChannelId, active: bool) {
        (**self).report(channel, active)
    }

    fn report_transmitting(&mut self, channel: ChannelId, transmitting: bool) {
        (**self).report_transmitting(channel, transmitting)
    }
}

/// An attribute sink that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAttributes;

impl AttributeSink for NoAttributes {
    fn report(&mut self, _channel: ChannelId, _active: bool) {}
}

/// What an activation does while the channel is still in its debounce window.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CoalescePolicy {
    /// Send a fresh frame and restart the timer.
    #[default]
    Retransmit,
    /// Only restart the timer.
    RestartTimer,
}

/// Runtime settings of an [`ActivationController`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ControllerConfig {
    /// How long a channel stays active after its last transmission.
    pub debounce: Duration,
    /// Slack allowed on top of a frame's air time before the transmission
    /// is declared timed out. Covers waiting for the port to accept the frame.
    pub tx_timeout: Duration,
    /// Behaviour of activations inside the debounce window.
    pub coalesce: CoalescePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            tx_timeout: Duration::from_millis(TX_TIMEOUT_MS),
            coalesce: CoalescePolicy::Retransmit,
        }
    }
}

impl ControllerConfig {
    /// Sets the debounce period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the slack allowed on top of a frame's air time.
    pub fn with_tx_timeout(mut self, tx_timeout: Duration) -> Self {
        self.tx_timeout = tx_timeout;
        self
    }

    /// Sets the coalescing policy.
    pub fn with_coalesce(mut self, coalesce: CoalescePolicy) -> Self {
        self.coalesce = coalesce;
        self
    }
}

/// Owns the channels and the radio, and serializes every activation.
///
/// # Type parameters
/// - `P`: the transmission port
/// - `C`: the monotonic clock
/// - `L`: the LED indicator
/// - `A`: the attribute sink
#[derive(Debug)]
pub struct ActivationController<P, C, L, A>
where
    P: TransmissionPort,
    C: Clock,
    L: Indicator,
    A: AttributeSink,
{
    registry: ChannelRegistry,
    port: P,
    clock: C,
    led: L,
    attributes: A,
    config: ControllerConfig,
    /// Frames played without error.
    pub tx_good: u32,
    /// Transmissions that failed.
    pub tx_failed: u32,
}

impl<P, C, L, A> ActivationController<P, C, L, A>
where
    P: TransmissionPort,
    C: Clock,
    L: Indicator,
    A: AttributeSink,
{
    /// Creates a controller, reports every channel as off and shows the boot indication.
    ///
    /// # Arguments
    /// - `registry`: the channels to serve
    /// - `port`: the radio
    /// - `clock`: monotonic time source for timeouts and debounce
    /// - `led`: status LED collaborator
    /// - `attributes`: receives the exposed on/off state of each channel
    /// - `config`: debounce, timeout and coalescing settings
    pub fn new(
        registry: ChannelRegistry,
        port: P,
        clock: C,
        led: L,
        attributes: A,
        config: ControllerConfig,
    ) -> Self {
        let mut controller = Self {
            registry,
            port,
            clock,
            led,
            attributes,
            config,
            tx_good: 0,
            tx_failed: 0,
        };
        for channel in controller.registry.iter() {
            controller.attributes.report(channel.id(), false);
            controller.attributes.report_transmitting(channel.id(), false);
        }
        controller.led.indicate(Indication::Boot);
        info!(
            "controller ready with {} channels",
            controller.registry.len()
        );
        controller
    }

    /// Activates a channel: sends its code and opens (or extends) its debounce window.
    ///
    /// Blocks for the length of the frame, bounded by its air time plus
    /// [`ControllerConfig::tx_timeout`].
    ///
    /// # Errors
    /// - [`Error::UnknownChannel`] if no channel has this id; nothing changes
    /// - [`Error::Transmit`] if the frame could not be sent; the channel has
    ///   still moved to its debounce window and will fall back to idle
    pub fn activate(&mut self, id: ChannelId) -> Result<(), Error> {
        let Some(channel) = self.registry.get_mut(id) else {
            warn!("activation for unknown channel {}", id);
            return Err(Error::UnknownChannel(id));
        };

        if channel.state() == ChannelState::DebounceWindow
            && self.config.coalesce == CoalescePolicy::RestartTimer
        {
            let now = self.clock.now();
            if let Some(timer) = channel.debounce_mut() {
                timer.restart(now);
            }
            debug!("{}: still in debounce window, timer restarted", id);
            return Ok(());
        }

        channel.set_state(ChannelState::Transmitting);
        channel.set_active(true);
        let label = channel.label();
        let code = channel.code();
        let profile = *channel.profile();
        let color = channel.color();
        self.attributes.report(id, true);
        self.attributes.report_transmitting(id, true);
        self.led.indicate(Indication::Transmitting(color));
        info!("{} ({}): sending {}", id, label, code);

        let result = encode(code, &profile).and_then(|frame| {
            let air_time = Duration::from_micros(frame.duration_us());
            transmit(
                &mut self.port,
                &mut self.clock,
                &frame,
                profile.idle_level(),
                air_time.saturating_add(self.config.tx_timeout),
            )
        });
        match result {
            Ok(()) => {
                self.tx_good = self.tx_good.wrapping_add(1);
                debug!("{}: frame sent", id);
            }
            Err(e) => {
                self.tx_failed = self.tx_failed.wrapping_add(1);
                error!("{}: transmission failed: {}", id, e);
            }
        }

        let now = self.clock.now();
        let period = self.config.debounce;
        if let Some(channel) = self.registry.get_mut(id) {
            channel.set_state(ChannelState::DebounceWindow);
            channel
                .debounce_or_insert(|| DebounceTimer::new(period))
                .restart(now);
        }
        self.attributes.report_transmitting(id, false);
        self.led.indicate(Indication::Ready);

        result.map_err(Error::from)
    }

    /// Handles one upstream event.
    ///
    /// # Errors
    /// Whatever [`activate`](Self::activate) returns, or
    /// [`Error::UnknownChannel`] for an attribute write to an unknown channel.
    pub fn handle(&mut self, event: Event) -> Result<(), Error> {
        debug!("handling {}", event);
        match event {
            Event::Activate(id) | Event::AttributeWrite { channel: id, on: true } => {
                self.activate(id)
            }
            Event::AttributeWrite { channel, on: false } => {
                // Writes of `false` are not commands; restore the real state.
                let active = self
                    .registry
                    .get(channel)
                    .map(Channel::is_active)
                    .ok_or(Error::UnknownChannel(channel))?;
                self.attributes.report(channel, active);
                Ok(())
            }
            Event::Identify(effect) => {
                self.led.indicate(Indication::Identify(effect));
                Ok(())
            }
        }
    }

    /// Fires expired debounce timers. Never touches the port.
    ///
    /// # Returns
    /// The number of channels that went back to idle.
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        for channel in self.registry.iter_mut() {
            let expired = channel.debounce_mut().is_some_and(|t| t.poll(now));
            if expired && channel.state() == ChannelState::DebounceWindow {
                channel.set_state(ChannelState::Idle);
                channel.set_active(false);
                self.attributes.report(channel.id(), false);
                info!("{}: debounce elapsed, idle", channel.id());
                fired += 1;
            }
        }
        fired
    }

    /// Drains `source`, handling each event in order, and fires due timers.
    ///
    /// Errors are logged and the event is dropped; the state machine has
    /// already recovered by the time they are reported.
    ///
    /// # Returns
    /// The number of events handled.
    pub fn process<S: EventSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut handled = 0;
        loop {
            let _ = self.poll_timers();
            let Some(event) = source.next_event() else {
                break;
            };
            if let Err(e) = self.handle(event) {
                warn!("{} failed: {}", event, e);
            }
            handled += 1;
        }
        handled
    }

    /// The earliest pending debounce deadline, if any channel is in its window.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry
            .iter()
            .filter_map(|c| c.debounce().and_then(DebounceTimer::deadline))
            .min()
    }

    /// The channel registry.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Looks up a channel.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.registry.get(id)
    }

    /// Current settings.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The transmission port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The LED indicator.
    pub fn indicator(&self) -> &L {
        &self.led
    }

    /// The attribute sink.
    pub fn attributes(&self) -> &A {
        &self.attributes
    }

    /// Consumes the controller, returning the port, clock and collaborators.
    pub fn release(self) -> (P, C, L, A) {
        (self.port, self.clock, self.led, self.attributes)
    }
}
