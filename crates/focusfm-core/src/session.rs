//! Playback session controller
//!
//! Owns the active source (local playlist or one remote stream), the
//! current track index, and the one player handle. All play, pause, skip
//! and source-switch requests go through here; the controller keeps the
//! session internally consistent under rapid user interaction and stale
//! asynchronous play resolutions.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{ Track, TrackCatalog };
use crate::player::{ PlayerError, PlayerHandle, PlayToken };
use crate::status::{ SettingsSink, StatusPresenter };
use crate::stream::{ self, Source };


/// Recoverable conditions reported by session operations.
///
/// None of these are fatal: every one ends in a notice and a consistent
/// session state.
#[derive( Debug, Clone, Error, PartialEq, Eq )]
pub enum SessionError {
    #[error( "Nothing to play yet" )]
    NotReady,

    #[error( "Playlist is empty" )]
    EmptyPlaylist,

    #[error( "Only one track in the playlist, cannot cycle" )]
    SingleTrack,

    #[error( "Not available while streaming" )]
    SourceMismatch,

    #[error( "Track not in the current playlist: {0}" )]
    NotFound( Track ),
}


/// Mediator between user commands and the native playback element.
pub struct PlaybackSessionController<P, C, U, S>
where
    P: PlayerHandle,
    C: TrackCatalog,
    U: StatusPresenter,
    S: SettingsSink,
{
    player: P,
    catalog: C,
    presenter: U,
    settings: S,
    folder: PathBuf,

    source: Source,
    playlist: Vec<Track>,
    current: Option<usize>,
    /// Token of the most recent play attempt; resolutions carrying any
    /// other token are stale and get discarded.
    pending_play: Option<PlayToken>,
}


impl<P, C, U, S> PlaybackSessionController<P, C, U, S>
where
    P: PlayerHandle,
    C: TrackCatalog,
    U: StatusPresenter,
    S: SettingsSink,
{
    /// Creates a controller with an empty local session.
    ///
    /// Call [`switch_source`](Self::switch_source) with the persisted
    /// stream id to populate the initial source.
    pub fn new( player: P, catalog: C, presenter: U, settings: S, folder: PathBuf ) -> Self {
        Self {
            player,
            catalog,
            presenter,
            settings,
            folder,
            source: Source::Local,
            playlist: Vec::new(),
            current: None,
            pending_play: None,
        }
    }


    /// Switches the active source.
    ///
    /// `None`, the `"local"` sentinel, and any unknown id select the local
    /// catalog; a known registry id selects that remote stream. Current
    /// playback is stopped unconditionally before the switch so two
    /// sources can never race on the element.
    pub fn switch_source( &mut self, stream_id: Option<&str> ) {
        self.player.pause();
        self.player.unload();
        self.pending_play = None;
        self.playlist.clear();
        self.current = None;

        let source = stream::resolve( stream_id );
        match source {
            Source::Remote( descriptor ) => {
                tracing::info!( "Tuning to stream: {}", descriptor.name );
                self.player.load( descriptor.uri );
                // Autoplay; a failure arrives later via on_play_resolved
                // and is recoverable (the user retries with toggle).
                self.pending_play = Some( self.player.play() );
                self.presenter.show_playback_status(
                    &format!( "Streaming: {}", descriptor.name )
                );
            }
            Source::Local => {
                tracing::info!( "Switching to local folder: {:?}", self.folder );
                match self.catalog.scan( &self.folder ) {
                    Ok( tracks ) if !tracks.is_empty() => {
                        self.playlist = tracks;
                        self.current = Some( 0 );
                        // Load the first track but do not force playback.
                        self.player.load( self.playlist[ 0 ].as_str() );
                        self.presenter.show_playback_status(
                            &format!( "Ready: {}", self.playlist[ 0 ].name() )
                        );
                    }
                    Ok( _ ) => {
                        self.presenter.show_playback_status( "No tracks found" );
                    }
                    Err( e ) => {
                        tracing::warn!( "Folder scan failed: {}", e );
                        self.presenter.notify( &format!( "Cannot read audio folder: {}", e ) );
                        self.presenter.show_playback_status( "No tracks found" );
                    }
                }
            }
        }

        self.source = source;
        self.presenter.set_track_highlight( self.current );
        self.presenter.set_playback_controls_visible( true );

        // Fire and forget; the sink logs its own failures.
        let persisted = match self.source {
            Source::Remote( descriptor ) => Some( descriptor.id ),
            Source::Local => None,
        };
        self.settings.persist_active_stream( persisted );
    }


    /// Toggles between play and pause based on the element's live state.
    pub fn toggle( &mut self ) -> Result<(), SessionError> {
        self.reconcile_index();

        if !self.source.is_remote() && self.playlist.is_empty() {
            return self.report( SessionError::NotReady );
        }

        if self.player.is_playing() {
            self.player.pause();
        } else {
            self.pending_play = Some( self.player.play() );
        }
        Ok(())
    }


    /// Selects and plays a specific local track.
    ///
    /// The index change stands even if the subsequent play attempt fails;
    /// the track is loaded, just not audibly playing.
    pub fn select_track( &mut self, track: &Track ) -> Result<(), SessionError> {
        self.reconcile_index();

        if self.source.is_remote() {
            return self.report( SessionError::SourceMismatch );
        }

        // Stale references happen when the UI has not re-rendered after a
        // rescan; reported, not fatal.
        let Some( position ) = self.playlist.iter().position( |t| t == track ) else {
            return self.report( SessionError::NotFound( track.clone() ) );
        };

        self.current = Some( position );
        self.player.load( track.as_str() );
        self.pending_play = Some( self.player.play() );
        self.presenter.show_playback_status( &format!( "Playing: {}", track.name() ) );
        self.presenter.set_track_highlight( self.current );
        Ok(())
    }


    /// Advances to the next track, wrapping at the end of the playlist.
    pub fn next( &mut self ) -> Result<(), SessionError> {
        self.step( 1 )
    }


    /// Goes back to the previous track, wrapping at the start.
    pub fn previous( &mut self ) -> Result<(), SessionError> {
        self.step( -1 )
    }


    fn step( &mut self, delta: isize ) -> Result<(), SessionError> {
        self.reconcile_index();

        if self.source.is_remote() {
            return self.report( SessionError::SourceMismatch );
        }

        match self.playlist.len() {
            0 => return self.report( SessionError::EmptyPlaylist ),
            // Deliberate UX choice: a single track does not cycle.
            1 => return self.report( SessionError::SingleTrack ),
            _ => {}
        }

        let len = self.playlist.len() as isize;
        let from = self.current.map( |i| i as isize ).unwrap_or( 0 );
        let target = ( from + delta ).rem_euclid( len ) as usize;
        let track = self.playlist[ target ].clone();
        self.select_track( &track )
    }


    /// Inbound end-of-media event from the playback element.
    pub fn on_track_ended( &mut self ) {
        match self.source {
            Source::Remote( descriptor ) => {
                // Streams are treated as infinite; this firing is
                // unexpected but must not advance anything.
                tracing::warn!( "End-of-media event on stream {}", descriptor.id );
            }
            Source::Local => {
                // Benign conditions (empty or single-track playlist) are
                // already reported by next().
                let _ = self.next();
            }
        }
    }


    /// Inbound resolution of an asynchronous play attempt.
    ///
    /// A resolution whose token no longer matches the most recent attempt
    /// was superseded by a newer command; its effects would be cosmetic at
    /// best and are discarded wholesale.
    pub fn on_play_resolved( &mut self, token: PlayToken, outcome: Result<(), PlayerError> ) {
        if self.pending_play != Some( token ) {
            tracing::debug!( "Discarding stale play resolution {:?}", token );
            return;
        }

        self.pending_play = None;
        if let Err( e ) = outcome {
            tracing::warn!( "{}", e );
            self.presenter.notify( &e.to_string() );
            self.presenter.show_playback_status( "Playback unavailable" );
        }
    }


    /// Inbound play event from the element (source of truth for state).
    pub fn on_player_play( &mut self ) {
        let label = self.now_playing_label();
        self.presenter.show_playback_status( &format!( "Playing: {}", label ) );
    }


    /// Inbound pause event from the element.
    pub fn on_player_pause( &mut self ) {
        let label = self.now_playing_label();
        self.presenter.show_playback_status( &format!( "Paused: {}", label ) );
    }


    /// Sets the playback volume (clamped to 0-100).
    pub fn set_volume( &mut self, percent: u8 ) {
        self.player.set_volume( percent.min( 100 ) );
    }


    /// Stops playback and clears the source at plugin teardown.
    pub fn shutdown( &mut self ) {
        self.player.pause();
        self.player.unload();
        self.pending_play = None;
        self.presenter.set_playback_controls_visible( false );
    }


    pub fn source( &self ) -> Source {
        self.source
    }


    pub fn playlist( &self ) -> &[Track] {
        &self.playlist
    }


    pub fn current_index( &self ) -> Option<usize> {
        self.current
    }


    fn now_playing_label( &self ) -> String {
        match self.source {
            Source::Remote( descriptor ) => descriptor.name.to_string(),
            Source::Local => self
                .current
                .and_then( |i| self.playlist.get( i ) )
                .map( |t| t.name().to_string() )
                .unwrap_or_else( || "nothing".to_string() ),
        }
    }


    /// Clamps an out-of-range index back to a safe state instead of
    /// letting it persist across an operation.
    fn reconcile_index( &mut self ) {
        if self.source.is_remote() {
            if self.current.is_some() {
                tracing::warn!( "Track index present on a stream session, clearing" );
                self.current = None;
            }
            return;
        }

        if let Some( index ) = self.current {
            if index >= self.playlist.len() {
                tracing::warn!( "Track index {} out of range, resetting", index );
                self.current = if self.playlist.is_empty() { None } else { Some( 0 ) };
            }
        }
    }


    fn report( &mut self, err: SessionError ) -> Result<(), SessionError> {
        tracing::debug!( "{}", err );
        self.presenter.notify( &err.to_string() );
        Err( err )
    }
}


#[cfg( test )]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::testing::{ FakeCatalog, FakePlayer, RecordingPresenter, RecordingSettings };


    type TestController =
        PlaybackSessionController<FakePlayer, FakeCatalog, RecordingPresenter, RecordingSettings>;


    fn controller_with_tracks( names: &[&str] ) -> TestController {
        let catalog = FakeCatalog::with_tracks( names );
        let mut controller = PlaybackSessionController::new(
            FakePlayer::new(),
            catalog,
            RecordingPresenter::new(),
            RecordingSettings::new(),
            Path::new( "/music" ).to_path_buf(),
        );
        controller.switch_source( None );
        controller
    }


    #[test]
    fn test_local_switch_selects_first_track_without_autoplay() {
        let controller = controller_with_tracks( &[ "/music/a.mp3", "/music/b.mp3" ] );

        assert_eq!( controller.current_index(), Some( 0 ) );
        assert_eq!( controller.player.loaded.as_deref(), Some( "/music/a.mp3" ) );
        assert!( controller.player.play_requests.is_empty() );
    }


    #[test]
    fn test_local_switch_with_empty_folder_has_no_selection() {
        let controller = controller_with_tracks( &[] );

        assert_eq!( controller.current_index(), None );
        assert!( controller.playlist().is_empty() );
        assert!( controller.player.loaded.is_none() );
    }


    #[test]
    fn test_invalid_folder_reports_and_stays_consistent() {
        let mut controller = PlaybackSessionController::new(
            FakePlayer::new(),
            FakeCatalog::invalid_path(),
            RecordingPresenter::new(),
            RecordingSettings::new(),
            Path::new( "/missing" ).to_path_buf(),
        );
        controller.switch_source( None );

        assert_eq!( controller.current_index(), None );
        assert!( controller.playlist().is_empty() );
        assert_eq!( controller.presenter.notices.len(), 1 );
        assert!( controller.presenter.notices[ 0 ].contains( "audio folder" ) );
    }


    #[test]
    fn test_remote_switch_autoplays_and_clears_index() {
        let mut controller = controller_with_tracks( &[ "/music/a.mp3" ] );
        controller.switch_source( Some( "groove-salad" ) );

        assert!( controller.source().is_remote() );
        assert_eq!( controller.current_index(), None );
        assert!( controller.playlist().is_empty() );
        assert_eq!( controller.player.play_requests.len(), 1 );
        assert_eq!(
            controller.player.loaded.as_deref(),
            Some( "https://ice1.somafm.com/groovesalad-128-mp3" )
        );
    }


    #[test]
    fn test_unknown_stream_id_falls_back_to_local() {
        let mut controller = controller_with_tracks( &[ "/music/a.mp3", "/music/b.mp3" ] );
        controller.switch_source( Some( "nonexistent-id" ) );

        assert!( !controller.source().is_remote() );
        assert_eq!( controller.current_index(), Some( 0 ) );
        // Local persists as None, same as switch_source( None ).
        assert_eq!( controller.settings.persisted.last(), Some( &None ) );
    }


    #[test]
    fn test_switch_source_persists_stream_id() {
        let mut controller = controller_with_tracks( &[] );
        controller.switch_source( Some( "drone-zone" ) );

        assert_eq!(
            controller.settings.persisted.last(),
            Some( &Some( "drone-zone".to_string() ) )
        );
    }


    #[test]
    fn test_next_wraps_around() {
        let mut controller =
            controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3", "/m/c.mp3" ] );
        controller.current = Some( 2 );

        controller.next().unwrap();
        assert_eq!( controller.current_index(), Some( 0 ) );
    }


    #[test]
    fn test_previous_wraps_around() {
        let mut controller =
            controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3", "/m/c.mp3" ] );

        controller.previous().unwrap();
        assert_eq!( controller.current_index(), Some( 2 ) );
    }


    #[test]
    fn test_next_and_previous_guard_empty_playlist() {
        let mut controller = controller_with_tracks( &[] );

        assert_eq!( controller.next(), Err( SessionError::EmptyPlaylist ) );
        assert_eq!( controller.previous(), Err( SessionError::EmptyPlaylist ) );
        assert_eq!( controller.current_index(), None );
        assert_eq!( controller.presenter.notices.len(), 2 );
    }


    #[test]
    fn test_next_and_previous_guard_single_track() {
        let mut controller = controller_with_tracks( &[ "/m/only.mp3" ] );

        assert_eq!( controller.next(), Err( SessionError::SingleTrack ) );
        assert_eq!( controller.previous(), Err( SessionError::SingleTrack ) );
        assert_eq!( controller.current_index(), Some( 0 ) );
    }


    #[test]
    fn test_skip_is_source_mismatch_on_stream() {
        let mut controller = controller_with_tracks( &[] );
        controller.switch_source( Some( "lofi" ) );

        assert_eq!( controller.next(), Err( SessionError::SourceMismatch ) );
        assert_eq!( controller.previous(), Err( SessionError::SourceMismatch ) );
    }


    #[test]
    fn test_select_track_plays_and_highlights() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        controller.select_track( &Track::new( "/m/b.mp3" ) ).unwrap();
        assert_eq!( controller.current_index(), Some( 1 ) );
        assert_eq!( controller.player.loaded.as_deref(), Some( "/m/b.mp3" ) );
        assert_eq!( controller.player.play_requests.len(), 1 );
        assert_eq!( controller.presenter.highlights.last(), Some( &Some( 1 ) ) );
    }


    #[test]
    fn test_select_track_rejects_stale_reference() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        let stale = Track::new( "/m/gone.mp3" );
        let result = controller.select_track( &stale );
        assert_eq!( result, Err( SessionError::NotFound( stale ) ) );
        assert_eq!( controller.current_index(), Some( 0 ) );
    }


    #[test]
    fn test_select_track_rejects_remote_source() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3" ] );
        controller.switch_source( Some( "fip" ) );

        let result = controller.select_track( &Track::new( "/m/a.mp3" ) );
        assert_eq!( result, Err( SessionError::SourceMismatch ) );
        assert_eq!( controller.current_index(), None );
    }


    #[test]
    fn test_toggle_not_ready_on_empty_local_playlist() {
        let mut controller = controller_with_tracks( &[] );

        assert_eq!( controller.toggle(), Err( SessionError::NotReady ) );
        assert!( controller.player.play_requests.is_empty() );
        assert_eq!( controller.player.pauses, 0 );
    }


    #[test]
    fn test_toggle_follows_live_player_state() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        controller.toggle().unwrap();
        assert_eq!( controller.player.play_requests.len(), 1 );

        controller.player.playing = true;
        controller.toggle().unwrap();
        assert_eq!( controller.player.pauses, 1 );
        assert_eq!( controller.player.play_requests.len(), 1 );
    }


    #[test]
    fn test_track_ended_advances_local_playlist() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        controller.on_track_ended();
        assert_eq!( controller.current_index(), Some( 1 ) );
        assert_eq!( controller.player.loaded.as_deref(), Some( "/m/b.mp3" ) );
    }


    #[test]
    fn test_track_ended_is_ignored_on_stream() {
        let mut controller = controller_with_tracks( &[] );
        controller.switch_source( Some( "groove-salad" ) );
        let loads_before = controller.player.loads.len();

        controller.on_track_ended();
        assert!( controller.source().is_remote() );
        assert_eq!( controller.current_index(), None );
        assert_eq!( controller.player.loads.len(), loads_before );
    }


    #[test]
    fn test_stale_play_resolution_is_discarded() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        // Issue a play for a local track, then switch to a stream before
        // the attempt resolves.
        controller.select_track( &Track::new( "/m/a.mp3" ) ).unwrap();
        let stale_token = *controller.player.play_requests.last().unwrap();
        controller.switch_source( Some( "groove-salad" ) );

        controller.on_play_resolved( stale_token, Err( PlayerError::PlayFailed {
            reason: "decode error".to_string(),
        }));

        // The stale failure must not corrupt the stream session or leak a
        // notice meant for the old source.
        assert!( controller.source().is_remote() );
        assert_eq!( controller.current_index(), None );
        assert!( controller.presenter.notices.iter().all( |n| !n.contains( "decode" ) ) );
    }


    #[test]
    fn test_current_play_failure_is_reported_but_recoverable() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        controller.select_track( &Track::new( "/m/b.mp3" ) ).unwrap();
        let token = *controller.player.play_requests.last().unwrap();
        controller.on_play_resolved( token, Err( PlayerError::PlayFailed {
            reason: "autoplay blocked".to_string(),
        }));

        // Index change stands; the session stays alive and retryable.
        assert_eq!( controller.current_index(), Some( 1 ) );
        assert!( controller.presenter.notices.iter().any( |n| n.contains( "autoplay blocked" ) ) );
        assert_eq!(
            controller.presenter.playback_statuses.last().map( String::as_str ),
            Some( "Playback unavailable" )
        );
    }


    #[test]
    fn test_out_of_range_index_is_clamped() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );
        controller.current = Some( 10 );

        controller.next().unwrap();
        assert_eq!( controller.current_index(), Some( 1 ) );
    }


    #[test]
    fn test_player_events_drive_status_text() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3", "/m/b.mp3" ] );

        controller.on_player_play();
        assert_eq!(
            controller.presenter.playback_statuses.last().map( String::as_str ),
            Some( "Playing: a" )
        );

        controller.on_player_pause();
        assert_eq!(
            controller.presenter.playback_statuses.last().map( String::as_str ),
            Some( "Paused: a" )
        );
    }


    #[test]
    fn test_shutdown_stops_and_hides_controls() {
        let mut controller = controller_with_tracks( &[ "/m/a.mp3" ] );
        controller.shutdown();

        assert_eq!( controller.player.pauses, 1 );
        assert!( controller.player.loaded.is_none() );
        assert_eq!( controller.presenter.controls_visible.last(), Some( &false ) );
    }
}
