//! Shared status-bar state.
//!
//! Both controllers push their presentation through a [`StatusPresenter`]
//! clone; the render loop reads the same snapshot each frame. Notices
//! auto-expire after a few seconds.

use std::sync::{ Arc, Mutex };
use std::time::{ Duration, Instant };

use focusfm_core::StatusPresenter;


const NOTICE_TTL: Duration = Duration::from_secs( 3 );


/// Everything the status bar renders.
#[derive( Debug )]
pub struct StatusSnapshot {
    pub playback: String,
    pub timer: String,
    pub notice: Option<String>,
    notice_at: Option<Instant>,
    pub controls_visible: bool,
    pub highlight: Option<usize>,
}


impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            playback: "No source".to_string(),
            timer: "Timer off".to_string(),
            notice: None,
            notice_at: None,
            controls_visible: false,
            highlight: None,
        }
    }
}


impl StatusSnapshot {
    /// Clears the notice once its display window has passed.
    pub fn expire_notice( &mut self ) {
        if let Some( at ) = self.notice_at {
            if at.elapsed() >= NOTICE_TTL {
                self.notice = None;
                self.notice_at = None;
            }
        }
    }
}


pub type SharedStatus = Arc<Mutex<StatusSnapshot>>;


pub fn shared_status() -> SharedStatus {
    Arc::new( Mutex::new( StatusSnapshot::default() ) )
}


/// Presenter handle cloned into each controller.
#[derive( Clone )]
pub struct SharedStatusPresenter {
    snapshot: SharedStatus,
}


impl SharedStatusPresenter {
    pub fn new( snapshot: SharedStatus ) -> Self {
        Self { snapshot }
    }


    fn lock( &self ) -> std::sync::MutexGuard<'_, StatusSnapshot> {
        self.snapshot.lock().unwrap_or_else( |e| e.into_inner() )
    }
}


impl StatusPresenter for SharedStatusPresenter {
    fn show_playback_status( &mut self, text: &str ) {
        self.lock().playback = text.to_string();
    }


    fn show_timer_status( &mut self, text: &str ) {
        self.lock().timer = text.to_string();
    }


    fn set_playback_controls_visible( &mut self, visible: bool ) {
        self.lock().controls_visible = visible;
    }


    fn set_track_highlight( &mut self, index: Option<usize> ) {
        self.lock().highlight = index;
    }


    fn notify( &mut self, text: &str ) {
        let mut snapshot = self.lock();
        snapshot.notice = Some( text.to_string() );
        snapshot.notice_at = Some( Instant::now() );
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_presenter_clones_share_one_snapshot() {
        let shared = shared_status();
        let mut a = SharedStatusPresenter::new( Arc::clone( &shared ) );
        let mut b = a.clone();

        a.show_playback_status( "Playing: x" );
        b.show_timer_status( "Work: 24:59" );

        let snapshot = shared.lock().unwrap();
        assert_eq!( snapshot.playback, "Playing: x" );
        assert_eq!( snapshot.timer, "Work: 24:59" );
    }


    #[test]
    fn test_notice_is_set_with_timestamp() {
        let shared = shared_status();
        let mut presenter = SharedStatusPresenter::new( Arc::clone( &shared ) );
        presenter.notify( "Work session ended!" );

        let mut snapshot = shared.lock().unwrap();
        assert_eq!( snapshot.notice.as_deref(), Some( "Work session ended!" ) );
        // Fresh notices survive an expiry pass.
        snapshot.expire_notice();
        assert!( snapshot.notice.is_some() );
    }
}
