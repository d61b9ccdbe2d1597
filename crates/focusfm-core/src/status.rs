//! Status surface collaborators
//!
//! Controllers push their state to the host's status bar through these
//! traits and never render anything themselves. The presenter is a pure
//! sink; it performs no logic of its own.

/// The host's status-bar surface.
pub trait StatusPresenter {
    /// Updates the playback status line.
    fn show_playback_status( &mut self, text: &str );

    /// Updates the timer status line.
    fn show_timer_status( &mut self, text: &str );

    /// Shows or hides the playback control buttons.
    fn set_playback_controls_visible( &mut self, visible: bool );

    /// Highlights the given playlist position, or clears the highlight.
    fn set_track_highlight( &mut self, index: Option<usize> );

    /// Shows a transient user-visible notice.
    fn notify( &mut self, text: &str );
}


/// Settings persistence collaborator.
///
/// Fire and forget: the controller calls this once per source switch and
/// does not retry. Persistence failures are the implementation's to log.
pub trait SettingsSink {
    fn persist_active_stream( &mut self, stream_id: Option<&str> );
}
