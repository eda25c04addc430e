/// Declares a static [`Mailbox`](crate::mailbox::Mailbox) shared between
/// interrupt handlers, callbacks and the controller loop.
///
/// # Arguments
/// - `$name`: name of the static
/// - `$depth`: optional queue depth, defaults to
///   [`DEFAULT_MAILBOX_DEPTH`](crate::mailbox::DEFAULT_MAILBOX_DEPTH)
///
/// # Example
/// ```rust
/// came433::init_mailbox!(EVENTS);
/// came433::init_mailbox!(BUTTON_EVENTS, 4);
///
/// assert!(EVENTS.is_empty());
/// ```
#[macro_export]
macro_rules! init_mailbox {
    ( $name:ident ) => {
        $crate::init_mailbox!($name, $crate::mailbox::DEFAULT_MAILBOX_DEPTH);
    };
    ( $name:ident, $depth:expr ) => {
        pub static $name: $crate::mailbox::Mailbox<{ $depth }> = $crate::mailbox::Mailbox::new();
    };
}

/// Posts an activation for an endpoint number into a mailbox.
///
/// Expands to a `Result<(), Error>`; a full mailbox drops the event.
///
/// # Example
/// ```rust
/// came433::init_mailbox!(EVENTS);
///
/// fn on_attribute_write(endpoint: u8) {
///     let _ = came433::post_activation!(EVENTS, endpoint);
/// }
/// on_attribute_write(1);
/// assert_eq!(EVENTS.len(), 1);
/// ```
#[macro_export]
macro_rules! post_activation {
    ( $mailbox:ident, $endpoint:expr ) => {
        $mailbox.post($crate::controller::Event::Activate(
            $crate::channel::ChannelId($endpoint),
        ))
    };
}
