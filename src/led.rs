//! Status LED vocabulary.
//!
//! The controller never drives the LED itself. It sends fire-and-forget
//! [`Indication`]s to an [`Indicator`], and each indication maps to a short
//! static pattern of [`LedStep`]s that an RGB LED driver can play at its own
//! pace.
//!
//! | Indication        | Pattern                                      |
//! |-------------------|----------------------------------------------|
//! | `Boot`            | solid red                                    |
//! | `Transmitting(c)` | solid channel colour `c`                     |
//! | `Ready`           | off                                          |
//! | identify blink    | white 100 ms, off 100 ms, white 100 ms, off  |
//! | identify breathe  | 15 × (lavender 100 ms, off 100 ms)           |
//! | identify okay     | green 1 s, off                               |

use core::time::Duration;

/// An RGB colour, 8 bits per channel.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// LED off.
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    /// Boot colour.
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Identify "okay" colour.
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    /// Identify "blink" colour.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Identify "breathe" colour.
    pub const LAVENDER: Rgb = Rgb::new(128, 128, 255);

    /// Creates a colour.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Identify effects requested by the network.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum IdentifyEffect {
    /// Two short white flashes.
    Blink,
    /// Three seconds of slow pulsing.
    Breathe,
    /// One second of green.
    Okay,
}

impl IdentifyEffect {
    /// Maps a ZCL Identify "trigger effect" identifier.
    ///
    /// Returns `None` for effects this device doesn't render
    /// (channel change, finish, stop, ...).
    pub fn from_effect_id(id: u8) -> Option<Self> {
        match id {
            0x00 => Some(IdentifyEffect::Blink),
            0x01 => Some(IdentifyEffect::Breathe),
            0x02 => Some(IdentifyEffect::Okay),
            _ => None,
        }
    }
}

/// A request for the LED collaborator.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Indication {
    /// Powered up, not yet doing anything.
    Boot,
    /// A channel is transmitting; shown in the channel's colour.
    Transmitting(Rgb),
    /// Idle and ready for the next activation.
    Ready,
    /// Identify effect.
    Identify(IdentifyEffect),
}

/// One step of an LED pattern: show `color`, then wait `hold`.
///
/// A zero `hold` means "stay until the next indication".
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct LedStep {
    /// Colour to show.
    pub color: Rgb,
    /// How long to hold it.
    pub hold: Duration,
}

impl LedStep {
    const fn new(color: Rgb, hold_ms: u64) -> Self {
        Self {
            color,
            hold: Duration::from_millis(hold_ms),
        }
    }

    const fn hold(color: Rgb) -> Self {
        Self::new(color, 0)
    }
}

const BOOT: [LedStep; 1] = [LedStep::hold(Rgb::RED)];
const READY: [LedStep; 1] = [LedStep::hold(Rgb::OFF)];
const BLINK: [LedStep; 4] = [
    LedStep::new(Rgb::WHITE, 100),
    LedStep::new(Rgb::OFF, 100),
    LedStep::new(Rgb::WHITE, 100),
    LedStep::hold(Rgb::OFF),
];
const BREATHE_CYCLES: usize = 15;
const BREATHE: [LedStep; 2 * BREATHE_CYCLES] = {
    let mut steps = [LedStep::new(Rgb::OFF, 100); 2 * BREATHE_CYCLES];
    let mut i = 0;
    while i < BREATHE_CYCLES {
        steps[2 * i] = LedStep::new(Rgb::LAVENDER, 100);
        i += 1;
    }
    steps
};
const OKAY: [LedStep; 2] = [LedStep::new(Rgb::GREEN, 1_000), LedStep::hold(Rgb::OFF)];

impl Indication {
    /// Steps that render this indication on a single RGB LED.
    ///
    /// `Transmitting` returns an empty slice: it is a solid colour, see
    /// [`Indication::steady_color`].
    pub fn pattern(&self) -> &'static [LedStep] {
        match self {
            Indication::Boot => &BOOT,
            Indication::Transmitting(_) => &[],
            Indication::Ready => &READY,
            Indication::Identify(IdentifyEffect::Blink) => &BLINK,
            Indication::Identify(IdentifyEffect::Breathe) => &BREATHE,
            Indication::Identify(IdentifyEffect::Okay) => &OKAY,
        }
    }

    /// Colour the LED settles on once the pattern is done.
    pub fn steady_color(&self) -> Rgb {
        match self {
            Indication::Boot => Rgb::RED,
            Indication::Transmitting(color) => *color,
            _ => Rgb::OFF,
        }
    }

    /// Total time the pattern takes before it settles.
    pub fn pattern_duration(&self) -> Duration {
        self.pattern().iter().map(|step| step.hold).sum()
    }
}

/// The LED collaborator.
///
/// Implementations must return quickly: the controller calls this from its
/// own context, between transmissions.
pub trait Indicator {
    /// Shows `indication`.
    fn indicate(&mut self, indication: Indication);
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn indicate(&mut self, indication: Indication) {
        (**self).indicate(indication)
    }
}

/// An indicator that ignores every request, for headless builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn indicate(&mut self, _indication: Indication) {}
}
