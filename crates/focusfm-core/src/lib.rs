//! FocusFM Core - playback session and focus timer controllers
//!
//! This crate provides the two state machines behind the FocusFM status
//! bar: the playback session controller (local playlist or remote radio
//! stream) and the Pomodoro-style focus timer, plus the collaborator
//! traits they are driven through.

pub mod catalog;
pub mod player;
pub mod session;
pub mod status;
pub mod stream;
pub mod timer;

#[cfg( test )]
pub( crate ) mod testing;

pub use catalog::{ CatalogError, FsTrackCatalog, Track, TrackCatalog };
pub use player::{ PlayerError, PlayerHandle, PlayToken };
pub use session::{ PlaybackSessionController, SessionError };
pub use status::{ SettingsSink, StatusPresenter };
pub use stream::{ Source, StreamDescriptor, LOCAL_STREAM_ID, STREAMS };
pub use timer::{ Phase, SessionKind, TickScheduler, TimerConfig, TimerController, TimerError };
