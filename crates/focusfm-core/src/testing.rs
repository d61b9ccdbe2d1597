//! Test doubles shared by the controller unit tests.

use std::path::{ Path, PathBuf };

use crate::catalog::{ CatalogError, Track, TrackCatalog };
use crate::player::{ PlayerHandle, PlayToken };
use crate::status::{ SettingsSink, StatusPresenter };
use crate::timer::TickScheduler;


/// Recording stand-in for the native playback element.
#[derive( Debug, Default )]
pub struct FakePlayer {
    pub loaded: Option<String>,
    pub loads: Vec<String>,
    pub play_requests: Vec<PlayToken>,
    pub pauses: usize,
    pub playing: bool,
    pub volume: Option<u8>,
    next_token: u64,
}


impl FakePlayer {
    pub fn new() -> Self {
        Self::default()
    }
}


impl PlayerHandle for FakePlayer {
    fn load( &mut self, uri: &str ) {
        self.loaded = Some( uri.to_string() );
        self.loads.push( uri.to_string() );
    }


    fn unload( &mut self ) {
        self.loaded = None;
    }


    fn play( &mut self ) -> PlayToken {
        self.next_token += 1;
        let token = PlayToken::new( self.next_token );
        self.play_requests.push( token );
        token
    }


    fn pause( &mut self ) {
        self.pauses += 1;
        self.playing = false;
    }


    fn set_volume( &mut self, percent: u8 ) {
        self.volume = Some( percent );
    }


    fn is_playing( &self ) -> bool {
        self.playing
    }
}


/// Canned catalog results.
pub struct FakeCatalog {
    tracks: Vec<Track>,
    invalid_path: bool,
}


impl FakeCatalog {
    pub fn with_tracks( ids: &[&str] ) -> Self {
        Self {
            tracks: ids.iter().map( |id| Track::new( *id ) ).collect(),
            invalid_path: false,
        }
    }


    pub fn invalid_path() -> Self {
        Self { tracks: Vec::new(), invalid_path: true }
    }
}


impl TrackCatalog for FakeCatalog {
    fn scan( &self, folder: &Path ) -> Result<Vec<Track>, CatalogError> {
        if self.invalid_path {
            return Err( CatalogError::InvalidPath( PathBuf::from( folder ) ) );
        }
        Ok( self.tracks.clone() )
    }
}


/// Captures everything pushed to the status surface.
#[derive( Debug, Default )]
pub struct RecordingPresenter {
    pub playback_statuses: Vec<String>,
    pub timer_statuses: Vec<String>,
    pub notices: Vec<String>,
    pub highlights: Vec<Option<usize>>,
    pub controls_visible: Vec<bool>,
}


impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}


impl StatusPresenter for RecordingPresenter {
    fn show_playback_status( &mut self, text: &str ) {
        self.playback_statuses.push( text.to_string() );
    }


    fn show_timer_status( &mut self, text: &str ) {
        self.timer_statuses.push( text.to_string() );
    }


    fn set_playback_controls_visible( &mut self, visible: bool ) {
        self.controls_visible.push( visible );
    }


    fn set_track_highlight( &mut self, index: Option<usize> ) {
        self.highlights.push( index );
    }


    fn notify( &mut self, text: &str ) {
        self.notices.push( text.to_string() );
    }
}


/// Records fire-and-forget persistence calls.
#[derive( Debug, Default )]
pub struct RecordingSettings {
    pub persisted: Vec<Option<String>>,
}


impl RecordingSettings {
    pub fn new() -> Self {
        Self::default()
    }
}


impl SettingsSink for RecordingSettings {
    fn persist_active_stream( &mut self, stream_id: Option<&str> ) {
        self.persisted.push( stream_id.map( str::to_string ) );
    }
}


/// Tick scheduler that panics when a second handle would be created.
#[derive( Debug, Default )]
pub struct FakeScheduler {
    pub running: bool,
    pub starts: usize,
    pub cancels: usize,
}


impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}


impl TickScheduler for FakeScheduler {
    fn start( &mut self ) {
        assert!( !self.running, "a second tick interval was started" );
        self.running = true;
        self.starts += 1;
    }


    fn cancel( &mut self ) {
        self.running = false;
        self.cancels += 1;
    }


    fn is_running( &self ) -> bool {
        self.running
    }
}
