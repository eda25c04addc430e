//! # came433
//!
//! A portable, no_std Rust encoder and activation controller for CAME-style
//! 24-bit fixed-code 433 MHz gate remotes, driven through cheap OOK
//! transmitter modules like the FS1000A.
//!
//! The crate turns a 24-bit code into a frame of timed high/low pulses and
//! plays it on a transmitter's data line. It also runs the small per-gate
//! state machine a bridge device needs: an exposed on/off state that goes on
//! when a gate is activated and drops back after a debounce window, however
//! many activations arrive in between.
//!
//! It uses:
//! - `embedded-hal` traits for digital I/O and timing
//! - `heapless` fixed-capacity buffers, so no allocator is needed
//! - interrupt-safe event posting with `critical-section`
//! - `nb` for non-blocking transmission ports
//!
//! ## Crate features
//! | Feature              | Description |
//! |----------------------|-------------|
//! | `std`                | Disables `#![no_std]`, stores frames in `std::vec::Vec`s and enables `StdClock` |
//! | `mailbox` (default)  | `critical_section` protected event mailbox |
//! | `delay-loop`         | `run_controller_loop`, a blocking loop paced by `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`          | Uses `defmt` logging |
//! | `log`                | Uses `log` logging |
//!
//! ## Layers
//!
//! - [`profile`]: timing presets and a validated [`ProtocolProfile`](profile::ProtocolProfile) builder
//! - [`encoding`]: code to OOK symbols, preamble, sync and repeats
//! - [`frame`]: the encoded [`TransmissionFrame`](frame::TransmissionFrame) and its raw-timing view
//! - [`port`]: the [`TransmissionPort`](port::TransmissionPort) seam and a pin/delay implementation
//! - [`channel`]: gate codes and the channel registry
//! - [`controller`]: the activation state machine with debounce
//! - [`mailbox`]: event queue shared with interrupts and callbacks
//!
//! ## Usage
//!
//! ```rust
//! use came433::channel::Code;
//! use came433::encoding::encode;
//! use came433::profile::{ProfileBuilder, ProtocolProfile};
//!
//! let code = Code::new(0x03_B29B)?;
//! let frame = encode(code, &ProtocolProfile::came_working())?;
//! assert_eq!(frame.len(), 12 * 25);
//!
//! let single = ProfileBuilder::new().repeats(1).build()?;
//! let frame = encode(code, &single)?;
//! let raw: Vec<i64> = frame.raw_timings().take(4).collect();
//! assert_eq!(raw, [-24_320, 320, -320, 640]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Or, with the controller and `run_controller_loop()`:
//!
//! ```rust,ignore
//! came433::init_mailbox!(EVENTS);
//!
//! // network callback
//! came433::post_activation!(EVENTS, 1)?;
//!
//! // main
//! came433::timer::run_controller_loop(&mut controller, &mut &EVENTS, &mut delay, 10_000);
//! ```
//!
//! ## Integration Notes
//!
//! - A working-profile frame lasts about 0.6 s; the transmission port blocks
//!   the controller for that long, so upstream code should post events
//!   rather than call the controller directly
//! - Only the controller touches the port; transmissions never overlap
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

#[cfg(feature = "mailbox")]
pub use critical_section;

pub use heapless;

pub mod channel;
pub mod consts;
pub mod controller;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod led;
#[cfg(feature = "mailbox")]
pub mod mailbox;
pub mod port;
pub mod profile;
pub mod timer;

pub use error::Error;
#[cfg(feature = "delay-loop")]
pub use timer::run_controller_loop;
