//! Player collaborator abstraction
//!
//! Wraps the host's native media element behind a trait so the session
//! controller can be driven against a test double. The real element lives
//! outside this crate; decoding and network streaming are its problem.

use thiserror::Error;


/// Errors surfaced by the playback element.
///
/// Pause has no failure mode; only asynchronous play attempts can fail
/// (autoplay blocked, decode or network error on the loaded source).
#[derive( Debug, Clone, Error, PartialEq, Eq )]
pub enum PlayerError {
    #[error( "Play attempt failed: {reason}" )]
    PlayFailed { reason: String },
}


/// Identity of one asynchronous play attempt.
///
/// Every call to [`PlayerHandle::play`] mints a fresh token. The outcome of
/// the attempt arrives later, paired with the token it belongs to; the
/// session controller keeps only the most recent token and discards
/// resolutions carrying any other. Discarding stale tokens is the
/// cancellation mechanism; there is no explicit cancel for in-flight plays.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct PlayToken( u64 );


impl PlayToken {
    pub fn new( value: u64 ) -> Self {
        Self( value )
    }


    pub fn value( &self ) -> u64 {
        self.0
    }
}


/// One native playback element.
///
/// The implementation is expected to be single-threaded and event-driven:
/// `play` kicks off an attempt and returns immediately, the outcome is
/// delivered later through the owning controller's `on_play_resolved`.
pub trait PlayerHandle {
    /// Sets the media source (local track identifier or remote stream URI).
    fn load( &mut self, uri: &str );

    /// Clears the media source. Used when switching sources so two sources
    /// can never race on the same element.
    fn unload( &mut self );

    /// Begins an asynchronous play attempt on the loaded source.
    fn play( &mut self ) -> PlayToken;

    /// Pauses playback. Synchronous, cannot fail.
    fn pause( &mut self );

    /// Sets the volume (0-100).
    fn set_volume( &mut self, percent: u8 );

    /// Live playing state of the element. Controllers never cache a playing
    /// flag of their own; the element is the source of truth.
    fn is_playing( &self ) -> bool;
}
