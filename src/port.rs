//! The transmission port: the hardware seam between frames and the radio.
//!
//! A [`TransmissionPort`] plays a [`TransmissionFrame`] on the transmitter's
//! data line. The trait is non-blocking in the `nb` style so that a port
//! backed by a pulse-train peripheral (DMA, RMT, PIO, ...) can report
//! "still busy" instead of blocking; [`transmit`] wraps it in a bounded wait
//! and turns an overrun into [`TxError::Timeout`].
//!
//! Only one frame may be in flight. Ports are not required to be re-entrant;
//! the [`ActivationController`](crate::controller::ActivationController) owns
//! its port and serializes all use of it.
//!
//! [`PinPort`] is the reference implementation: it bit-bangs an
//! `embedded-hal` [`OutputPin`] with a [`DelayNs`] provider, which is accurate
//! to a few microseconds on most MCUs, well inside the receiver's tolerance.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};

use crate::encoding::Level;
use crate::error::TxError;
use crate::frame::TransmissionFrame;
use crate::timer::{Clock, Instant};

/// Hardware that can play a frame.
pub trait TransmissionPort {
    /// Starts playing `frame`, holding `idle` before the first and after the last symbol.
    ///
    /// Returns `WouldBlock` while a previous frame is still in flight; the
    /// caller retries. A blocking implementation plays the whole frame here
    /// and returns `Ok(())` when done.
    fn start(&mut self, frame: &TransmissionFrame, idle: Level) -> nb::Result<(), TxError>;

    /// Returns `Ok(())` once the hardware has fully drained the last frame.
    fn poll_done(&mut self) -> nb::Result<(), TxError>;
}

impl<P: TransmissionPort + ?Sized> TransmissionPort for &mut P {
    fn start(&mut self, frame: &TransmissionFrame, idle: Level) -> nb::Result<(), TxError> {
        (**self).start(frame, idle)
    }

    fn poll_done(&mut self) -> nb::Result<(), TxError> {
        (**self).poll_done()
    }
}

fn wait_until<C, F>(clock: &mut C, deadline: Instant, mut op: F) -> Result<(), TxError>
where
    C: Clock,
    F: FnMut() -> nb::Result<(), TxError>,
{
    loop {
        match op() {
            Ok(()) => return Ok(()),
            Err(nb::Error::Other(e)) => return Err(e),
            Err(nb::Error::WouldBlock) => {
                if clock.now() >= deadline {
                    return Err(TxError::Timeout);
                }
            }
        }
    }
}

/// Plays `frame` on `port` and waits for it to drain, for at most `timeout`.
///
/// The timeout covers both waiting for a previous frame to clear and playing
/// this one. There is no cancellation: on timeout the hardware may still be
/// busy, and the next call will wait for it again.
///
/// # Errors
/// - [`TxError::Timeout`] if the port is still busy when `timeout` elapses
/// - any error the port itself reports
pub fn transmit<P, C>(
    port: &mut P,
    clock: &mut C,
    frame: &TransmissionFrame,
    idle: Level,
    timeout: Duration,
) -> Result<(), TxError>
where
    P: TransmissionPort + ?Sized,
    C: Clock,
{
    let deadline = clock.now() + timeout;
    wait_until(clock, deadline, || port.start(frame, idle))?;
    wait_until(clock, deadline, || port.poll_done())
}

/// A blocking port that toggles an output pin and times each pulse with a delay.
///
/// ## Example
///
/// ```rust
/// # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
/// # use embedded_hal_mock::eh1::delay::NoopDelay;
/// use came433::port::PinPort;
///
/// # let pin = Pin::new(&[PinTransaction::set(PinState::Low)]);
/// let mut port = PinPort::new(pin, NoopDelay::new(), None, None);
/// # port.pin.done();
/// ```
///
/// ## Notes
///
/// Levels go through two steps before they reach the pin:
///
/// 1. The idle level is logical. It is given once to [`PinPort::new`] and
///    again with every frame, from
///    [`ProtocolProfile::idle_level`](crate::profile::ProtocolProfile::idle_level).
///    Build the port with the same idle level as the profiles it plays.
/// 2. `inverted` then flips every level written to the pin, idle included,
///    for transmitters keyed through an open-collector stage with a pull-up.
///
/// With the defaults (idle low, not inverted) the pin is low at startup and
/// after every frame.
#[derive(Debug)]
pub struct PinPort<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Data line of the transmitter.
    pub pin: P,
    /// Delay provider timing each pulse.
    pub delay: D,
    idle: Level,
    inverted: bool,
    /// Number of frames played in full.
    pub frames_sent: u32,
}

impl<P, D> PinPort<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates a port and drives the pin to the idle level.
    ///
    /// # Arguments
    /// - `pin`: the transmitter's data input
    /// - `delay`: a microsecond-capable delay provider
    /// - `idle`: logical level held outside of frames (defaults to `Low`)
    /// - `inverted`: whether the output is active-low (defaults to `false`)
    pub fn new(pin: P, delay: D, idle: Option<Level>, inverted: Option<bool>) -> Self {
        let mut port = Self {
            pin,
            delay,
            idle: idle.unwrap_or_default(),
            inverted: inverted.unwrap_or(false),
            frames_sent: 0,
        };
        let _ = port.write(port.idle);
        port
    }

    /// Logical level held outside of frames.
    pub fn idle_level(&self) -> Level {
        self.idle
    }

    /// Whether levels are inverted on the pin.
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn write(&mut self, level: Level) -> Result<(), TxError> {
        let high = level.is_high() != self.inverted;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| TxError::Pin(e.kind()))
    }

    fn play(&mut self, frame: &TransmissionFrame, idle: Level) -> Result<(), TxError> {
        self.write(idle)?;
        for pulse in frame.pulses() {
            self.write(pulse.level)?;
            self.delay.delay_us(pulse.duration_us);
        }
        self.write(idle)
    }
}

impl<P, D> TransmissionPort for PinPort<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn start(&mut self, frame: &TransmissionFrame, idle: Level) -> nb::Result<(), TxError> {
        if idle != self.idle {
            debug!("idle level changed by frame profile");
            self.idle = idle;
        }
        if let Err(e) = self.play(frame, idle) {
            // Never leave the carrier keyed after a failed write.
            let _ = self.write(idle);
            return Err(nb::Error::Other(e));
        }
        self.frames_sent += 1;
        Ok(())
    }

    fn poll_done(&mut self) -> nb::Result<(), TxError> {
        Ok(())
    }
}
