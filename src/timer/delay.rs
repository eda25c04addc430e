use embedded_hal::delay::DelayNs;

use crate::controller::{ActivationController, AttributeSink, EventSource};
use crate::led::Indicator;
use crate::port::TransmissionPort;
use crate::timer::Clock;

/// Runs a blocking loop that drains `source` into the controller forever.
///
/// For firmware with nothing else to do: each pass handles every queued
/// event, fires due debounce timers, then sleeps for `poll_us`.
///
/// # Arguments
/// - `controller`: the activation controller
/// - `source`: where events arrive, typically a static
///   [`Mailbox`](crate::mailbox::Mailbox)
/// - `delay`: a delay provider implementing `DelayNs`, typically from the HAL
/// - `poll_us`: sleep between passes, in microseconds (e.g. 10 000)
///
/// # Example
/// ```rust,no_run
/// # use came433::channel::{ChannelRegistry, DEFAULT_CHANNELS};
/// # use came433::controller::{ActivationController, ControllerConfig, NoAttributes};
/// # use came433::led::NoIndicator;
/// # use came433::port::PinPort;
/// # use came433::timer::StdClock;
/// # use embedded_hal_mock::eh1::delay::NoopDelay;
/// # use embedded_hal_mock::eh1::digital::Mock as Pin;
/// use came433::run_controller_loop;
///
/// came433::init_mailbox!(EVENTS);
///
/// # let port = PinPort::new(Pin::new(&[]), NoopDelay::new(), None, None);
/// let mut controller = ActivationController::new(
///     ChannelRegistry::from_configs(&DEFAULT_CHANNELS).unwrap(),
///     port,
///     StdClock::new(),
///     NoIndicator,
///     NoAttributes,
///     ControllerConfig::default(),
/// );
/// run_controller_loop(&mut controller, &mut &EVENTS, &mut NoopDelay::new(), 10_000);
/// ```
///
/// # Notes
/// - This loop never returns.
/// - `poll_us` bounds how late a debounce expiry can be reported; it does not
///   affect transmission timing, which the port owns.
pub fn run_controller_loop<P, C, L, A, S, D>(
    controller: &mut ActivationController<P, C, L, A>,
    source: &mut S,
    delay: &mut D,
    poll_us: u32,
) -> !
where
    P: TransmissionPort,
    C: Clock,
    L: Indicator,
    A: AttributeSink,
    S: EventSource + ?Sized,
    D: DelayNs,
{
    loop {
        let _ = controller.process(source);
        delay.delay_us(poll_us);
    }
}
