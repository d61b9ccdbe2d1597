//! Host media element shim
//!
//! Stands in for the host application's native playback element behind the
//! core [`PlayerHandle`] trait. The shim resolves play attempts on the next
//! event-loop pass and mirrors play/pause transitions back as events, the
//! same shape a real media element would deliver them in.

use std::sync::mpsc::{ self, Receiver, Sender };

use focusfm_core::{ PlayerError, PlayerHandle, PlayToken };


/// Events the shim delivers back to the main loop.
#[derive( Debug, Clone )]
pub enum MediaEvent {
    PlayResolved( PlayToken, Result<(), PlayerError> ),
    Played,
    Paused,
}


/// Creates the shim and the event receiver the main loop drains.
pub fn create_shim_player() -> ( ShimPlayer, Receiver<MediaEvent> ) {
    let ( tx, rx ) = mpsc::channel();
    ( ShimPlayer::new( tx ), rx )
}


/// PlayerHandle implementation backing the terminal build.
///
/// TODO: bridge a real audio backend behind this shim; today it only
/// tracks element state and logs what the host element would do.
pub struct ShimPlayer {
    events: Sender<MediaEvent>,
    source: Option<String>,
    playing: bool,
    volume: u8,
    next_token: u64,
}


impl ShimPlayer {
    fn new( events: Sender<MediaEvent> ) -> Self {
        Self {
            events,
            source: None,
            playing: false,
            volume: 100,
            next_token: 0,
        }
    }


    fn emit( &self, event: MediaEvent ) {
        // The receiver outlives the player in practice; a closed channel
        // just means teardown is underway.
        let _ = self.events.send( event );
    }
}


impl PlayerHandle for ShimPlayer {
    fn load( &mut self, uri: &str ) {
        tracing::info!( "Loading source: {}", uri );
        self.source = Some( uri.to_string() );
    }


    fn unload( &mut self ) {
        tracing::debug!( "Clearing media source" );
        self.source = None;
        self.playing = false;
    }


    fn play( &mut self ) -> PlayToken {
        self.next_token += 1;
        let token = PlayToken::new( self.next_token );

        match self.source {
            Some( ref uri ) => {
                tracing::info!( "Play attempt {} on {}", token.value(), uri );
                self.playing = true;
                self.emit( MediaEvent::PlayResolved( token, Ok(()) ) );
                self.emit( MediaEvent::Played );
            }
            None => {
                tracing::warn!( "Play attempt {} with no source loaded", token.value() );
                self.emit( MediaEvent::PlayResolved( token, Err( PlayerError::PlayFailed {
                    reason: "no media source loaded".to_string(),
                })));
            }
        }

        token
    }


    fn pause( &mut self ) {
        if self.playing {
            tracing::info!( "Pausing" );
            self.playing = false;
            self.emit( MediaEvent::Paused );
        }
    }


    fn set_volume( &mut self, percent: u8 ) {
        self.volume = percent;
        tracing::debug!( "Volume set to {}", percent );
    }


    fn is_playing( &self ) -> bool {
        self.playing
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_play_without_source_resolves_failed() {
        let ( mut player, rx ) = create_shim_player();
        let token = player.play();

        match rx.try_recv().unwrap() {
            MediaEvent::PlayResolved( t, Err( _ ) ) => assert_eq!( t, token ),
            other => panic!( "unexpected event: {:?}", other ),
        }
        assert!( !player.is_playing() );
    }


    #[test]
    fn test_play_with_source_resolves_ok_and_mirrors_play_event() {
        let ( mut player, rx ) = create_shim_player();
        player.load( "https://example.org/stream" );
        let token = player.play();

        match rx.try_recv().unwrap() {
            MediaEvent::PlayResolved( t, Ok(()) ) => assert_eq!( t, token ),
            other => panic!( "unexpected event: {:?}", other ),
        }
        assert!( matches!( rx.try_recv().unwrap(), MediaEvent::Played ) );
        assert!( player.is_playing() );
    }


    #[test]
    fn test_tokens_are_unique_per_attempt() {
        let ( mut player, _rx ) = create_shim_player();
        player.load( "x" );
        assert_ne!( player.play(), player.play() );
    }
}
