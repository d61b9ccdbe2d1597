//! Focus timer controller
//!
//! Pomodoro-style two-phase interval timer. Work and rest sessions
//! alternate automatically: when a countdown reaches zero the next session
//! starts on its own, and the cycle runs until the user pauses or resets.

use thiserror::Error;

use crate::status::StatusPresenter;


/// Default work session length, used when the configured value is invalid.
pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Default rest session length, used when the configured value is invalid.
pub const DEFAULT_REST_MINUTES: u32 = 5;


/// Benign conditions reported by timer operations.
#[derive( Debug, Clone, Error, PartialEq, Eq )]
pub enum TimerError {
    #[error( "Timer is already running" )]
    AlreadyRunning,

    #[error( "Timer is not running" )]
    NotRunning,

    #[error( "Timer is already reset" )]
    AlreadyReset,
}


/// Logical session type. While paused this doubles as the memory of which
/// phase the pause came from.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum SessionKind {
    Work,
    Rest,
}


impl SessionKind {
    pub fn label( &self ) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::Rest => "Rest",
        }
    }


    fn flip( self ) -> Self {
        match self {
            SessionKind::Work => SessionKind::Rest,
            SessionKind::Rest => SessionKind::Work,
        }
    }
}


/// Current phase of the timer state machine.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Phase {
    Stopped,
    Working,
    Resting,
    Paused,
}


/// Session durations in whole minutes.
#[derive( Debug, Clone, Copy )]
pub struct TimerConfig {
    work_minutes: u32,
    rest_minutes: u32,
}


impl TimerConfig {
    /// Builds a config, falling back to the documented defaults (25/5)
    /// for non-positive durations instead of propagating an invalid
    /// countdown.
    pub fn new( work_minutes: u32, rest_minutes: u32 ) -> Self {
        let work = if work_minutes == 0 {
            tracing::warn!( "Invalid work duration, using {} minutes", DEFAULT_WORK_MINUTES );
            DEFAULT_WORK_MINUTES
        } else {
            work_minutes
        };
        let rest = if rest_minutes == 0 {
            tracing::warn!( "Invalid rest duration, using {} minutes", DEFAULT_REST_MINUTES );
            DEFAULT_REST_MINUTES
        } else {
            rest_minutes
        };
        Self { work_minutes: work, rest_minutes: rest }
    }


    fn duration_secs( &self, kind: SessionKind ) -> u32 {
        match kind {
            SessionKind::Work => self.work_minutes * 60,
            SessionKind::Rest => self.rest_minutes * 60,
        }
    }
}


impl Default for TimerConfig {
    fn default() -> Self {
        Self::new( DEFAULT_WORK_MINUTES, DEFAULT_REST_MINUTES )
    }
}


/// Handle to the one repeating one-second tick source.
///
/// At most one handle may be active at any time; the controller cancels
/// defensively before every start so rapid start/pause/start sequences can
/// never leave a duplicate interval behind.
pub trait TickScheduler {
    fn start( &mut self );

    fn cancel( &mut self );

    fn is_running( &self ) -> bool;
}


/// The Pomodoro phase state machine.
pub struct TimerController<U, S>
where
    U: StatusPresenter,
    S: TickScheduler,
{
    presenter: U,
    scheduler: S,
    config: TimerConfig,

    phase: Phase,
    /// While running, matches the phase; while paused, the phase to resume
    /// into; while stopped, the kind the next start begins.
    session_kind: SessionKind,
    remaining_secs: u32,
}


impl<U, S> TimerController<U, S>
where
    U: StatusPresenter,
    S: TickScheduler,
{
    pub fn new( presenter: U, scheduler: S, config: TimerConfig ) -> Self {
        Self {
            presenter,
            scheduler,
            config,
            phase: Phase::Stopped,
            session_kind: SessionKind::Work,
            remaining_secs: 0,
        }
    }


    /// Starts a fresh session from Stopped, or resumes from Paused.
    pub fn start( &mut self ) -> Result<(), TimerError> {
        match self.phase {
            Phase::Working | Phase::Resting => self.report( TimerError::AlreadyRunning ),
            Phase::Paused => {
                // Resume from the frozen countdown, no reset.
                self.begin_ticking();
                self.phase = self.running_phase();
                tracing::info!( "Resuming {} session at {}", self.session_kind.label(), self.format_remaining() );
                self.push_status();
                Ok(())
            }
            Phase::Stopped => {
                self.remaining_secs = self.config.duration_secs( self.session_kind );
                self.begin_ticking();
                self.phase = self.running_phase();
                tracing::info!( "Starting {} session ({})", self.session_kind.label(), self.format_remaining() );
                self.presenter.notify( &format!( "{} session starting", self.session_kind.label() ) );
                self.push_status();
                Ok(())
            }
        }
    }


    /// Freezes the countdown and remembers which phase it paused from.
    pub fn pause( &mut self ) -> Result<(), TimerError> {
        match self.phase {
            Phase::Working | Phase::Resting => {
                self.scheduler.cancel();
                // session_kind already holds the phase being paused from.
                self.phase = Phase::Paused;
                self.push_status();
                Ok(())
            }
            Phase::Stopped | Phase::Paused => self.report( TimerError::NotRunning ),
        }
    }


    /// Returns to the canonical reset state: Stopped, zero remaining, next
    /// session a work session.
    pub fn reset( &mut self ) -> Result<(), TimerError> {
        let canonical = self.phase == Phase::Stopped
            && self.remaining_secs == 0
            && self.session_kind == SessionKind::Work;
        if canonical {
            return self.report( TimerError::AlreadyReset );
        }

        self.scheduler.cancel();
        self.phase = Phase::Stopped;
        self.remaining_secs = 0;
        self.session_kind = SessionKind::Work;
        tracing::info!( "Timer reset" );
        self.push_status();
        Ok(())
    }


    /// Inbound once-per-second tick while a session is running.
    ///
    /// Ticks arriving after a pause or reset (a cancelled interval firing
    /// one last time) are ignored.
    pub fn on_tick( &mut self ) {
        if !matches!( self.phase, Phase::Working | Phase::Resting ) {
            return;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub( 1 );
        if self.remaining_secs == 0 {
            self.finish_session();
        } else {
            self.push_status();
        }
    }


    /// Cancels scheduling at plugin teardown.
    pub fn shutdown( &mut self ) {
        self.scheduler.cancel();
    }


    /// Remaining time rendered as zero-padded `MM:SS`.
    pub fn format_remaining( &self ) -> String {
        format!( "{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60 )
    }


    pub fn phase( &self ) -> Phase {
        self.phase
    }


    pub fn session_kind( &self ) -> SessionKind {
        self.session_kind
    }


    pub fn remaining_secs( &self ) -> u32 {
        self.remaining_secs
    }


    /// End of countdown: announce, flip the session type, and auto-chain
    /// straight into the next session. There is no terminal state; the
    /// cycle is perpetual until pause or reset.
    fn finish_session( &mut self ) {
        self.scheduler.cancel();

        let ended = self.session_kind;
        tracing::info!( "{} session ended", ended.label() );
        self.presenter.notify( &format!( "{} session ended!", ended.label() ) );

        self.session_kind = ended.flip();
        self.phase = Phase::Stopped;
        // Stopped with zero remaining is only transient here; start()
        // immediately arms the next session.
        let _ = self.start();
    }


    fn begin_ticking( &mut self ) {
        // Defensive cancel: rapid start/pause/start must never stack a
        // second interval.
        self.scheduler.cancel();
        self.scheduler.start();
    }


    fn running_phase( &self ) -> Phase {
        match self.session_kind {
            SessionKind::Work => Phase::Working,
            SessionKind::Rest => Phase::Resting,
        }
    }


    fn push_status( &mut self ) {
        let text = match self.phase {
            Phase::Working => format!( "Work: {}", self.format_remaining() ),
            Phase::Resting => format!( "Rest: {}", self.format_remaining() ),
            Phase::Paused => format!( "Paused: {}", self.format_remaining() ),
            Phase::Stopped => "Timer off".to_string(),
        };
        self.presenter.show_timer_status( &text );
    }


    fn report( &mut self, err: TimerError ) -> Result<(), TimerError> {
        tracing::debug!( "{}", err );
        self.presenter.notify( &err.to_string() );
        Err( err )
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::testing::{ FakeScheduler, RecordingPresenter };


    type TestTimer = TimerController<RecordingPresenter, FakeScheduler>;


    fn timer( work_minutes: u32, rest_minutes: u32 ) -> TestTimer {
        TimerController::new(
            RecordingPresenter::new(),
            FakeScheduler::new(),
            TimerConfig::new( work_minutes, rest_minutes ),
        )
    }


    fn tick_n( t: &mut TestTimer, n: u32 ) {
        for _ in 0..n {
            t.on_tick();
        }
    }


    #[test]
    fn test_start_begins_work_session() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();

        assert_eq!( t.phase(), Phase::Working );
        assert_eq!( t.remaining_secs(), 25 * 60 );
        assert!( t.presenter.notices.iter().any( |n| n == "Work session starting" ) );
        assert_eq!(
            t.presenter.timer_statuses.last().map( String::as_str ),
            Some( "Work: 25:00" )
        );
    }


    #[test]
    fn test_start_while_running_is_benign() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();
        tick_n( &mut t, 3 );

        assert_eq!( t.start(), Err( TimerError::AlreadyRunning ) );
        assert_eq!( t.remaining_secs(), 25 * 60 - 3 );
    }


    #[test]
    fn test_tick_counts_down_and_updates_status() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();
        t.on_tick();

        assert_eq!( t.remaining_secs(), 25 * 60 - 1 );
        assert_eq!(
            t.presenter.timer_statuses.last().map( String::as_str ),
            Some( "Work: 24:59" )
        );
    }


    #[test]
    fn test_sessions_auto_chain_without_external_start() {
        let mut t = timer( 1, 5 );
        t.start().unwrap();
        tick_n( &mut t, 60 );

        assert_eq!( t.phase(), Phase::Resting );
        assert_eq!( t.remaining_secs(), 5 * 60 );
        assert!( t.presenter.notices.iter().any( |n| n == "Work session ended!" ) );
        assert_eq!(
            t.presenter.timer_statuses.last().map( String::as_str ),
            Some( "Rest: 05:00" )
        );
    }


    #[test]
    fn test_full_cycle_returns_to_work() {
        let mut t = timer( 1, 1 );
        t.start().unwrap();
        tick_n( &mut t, 60 );
        assert_eq!( t.phase(), Phase::Resting );

        tick_n( &mut t, 60 );
        assert_eq!( t.phase(), Phase::Working );
        assert_eq!( t.remaining_secs(), 60 );
        assert!( t.presenter.notices.iter().any( |n| n == "Rest session ended!" ) );
    }


    #[test]
    fn test_pause_resume_fidelity() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();
        tick_n( &mut t, 10 );

        t.pause().unwrap();
        assert_eq!( t.phase(), Phase::Paused );
        assert_eq!( t.remaining_secs(), 25 * 60 - 10 );
        assert!( !t.scheduler.running );

        // Ticks from a cancelled interval must not advance the countdown.
        t.on_tick();
        assert_eq!( t.remaining_secs(), 25 * 60 - 10 );

        t.start().unwrap();
        assert_eq!( t.phase(), Phase::Working );
        assert_eq!( t.remaining_secs(), 25 * 60 - 10 );
    }


    #[test]
    fn test_pause_resumes_into_rest_phase() {
        let mut t = timer( 1, 5 );
        t.start().unwrap();
        tick_n( &mut t, 60 );
        tick_n( &mut t, 12 );
        assert_eq!( t.phase(), Phase::Resting );

        t.pause().unwrap();
        t.start().unwrap();
        assert_eq!( t.phase(), Phase::Resting );
        assert_eq!( t.remaining_secs(), 5 * 60 - 12 );
    }


    #[test]
    fn test_pause_when_not_running_is_benign() {
        let mut t = timer( 25, 5 );
        assert_eq!( t.pause(), Err( TimerError::NotRunning ) );

        t.start().unwrap();
        t.pause().unwrap();
        assert_eq!( t.pause(), Err( TimerError::NotRunning ) );
    }


    #[test]
    fn test_reset_returns_to_canonical_state() {
        let mut t = timer( 1, 1 );
        t.start().unwrap();
        tick_n( &mut t, 60 ); // now resting, kind flipped
        tick_n( &mut t, 5 );

        t.reset().unwrap();
        assert_eq!( t.phase(), Phase::Stopped );
        assert_eq!( t.remaining_secs(), 0 );
        assert_eq!( t.session_kind(), SessionKind::Work );
        assert!( !t.scheduler.running );
    }


    #[test]
    fn test_reset_when_already_reset_is_benign() {
        let mut t = timer( 25, 5 );
        assert_eq!( t.reset(), Err( TimerError::AlreadyReset ) );
    }


    #[test]
    fn test_invalid_durations_fall_back_to_defaults() {
        let mut t = timer( 0, 0 );
        t.start().unwrap();
        assert_eq!( t.remaining_secs(), DEFAULT_WORK_MINUTES * 60 );

        tick_n( &mut t, DEFAULT_WORK_MINUTES * 60 );
        assert_eq!( t.phase(), Phase::Resting );
        assert_eq!( t.remaining_secs(), DEFAULT_REST_MINUTES * 60 );
    }


    #[test]
    fn test_scheduler_never_holds_two_handles() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();
        t.pause().unwrap();
        t.start().unwrap();
        t.pause().unwrap();
        t.start().unwrap();

        // FakeScheduler panics on a double start; reaching here with a
        // running handle means every start was preceded by a cancel.
        assert!( t.scheduler.running );
        assert_eq!( t.scheduler.starts, 3 );
    }


    #[test]
    fn test_formatting_zero_pads() {
        let mut t = timer( 2, 5 );
        t.start().unwrap();
        tick_n( &mut t, 61 );
        assert_eq!( t.format_remaining(), "00:59" );
        tick_n( &mut t, 50 );
        assert_eq!( t.format_remaining(), "00:09" );
    }


    #[test]
    fn test_shutdown_cancels_scheduling() {
        let mut t = timer( 25, 5 );
        t.start().unwrap();
        t.shutdown();
        assert!( !t.scheduler.running );
    }
}
