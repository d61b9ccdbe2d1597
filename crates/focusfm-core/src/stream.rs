//! Stream registry
//!
//! Static table of the remote radio streams the player can tune to, plus
//! the reserved sentinel id meaning "use the local catalog instead".

/// Reserved stream id that selects the local playlist source.
pub const LOCAL_STREAM_ID: &str = "local";


/// One remote radio stream.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct StreamDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub uri: &'static str,
}


/// The fixed set of available streams.
pub const STREAMS: &[StreamDescriptor] = &[
    StreamDescriptor {
        id: "groove-salad",
        name: "SomaFM Groove Salad",
        uri: "https://ice1.somafm.com/groovesalad-128-mp3",
    },
    StreamDescriptor {
        id: "drone-zone",
        name: "SomaFM Drone Zone",
        uri: "https://ice1.somafm.com/dronezone-128-mp3",
    },
    StreamDescriptor {
        id: "lofi",
        name: "Lofi Girl Radio",
        uri: "https://play.streamafrica.net/lofiradio",
    },
    StreamDescriptor {
        id: "fip",
        name: "FIP Radio",
        uri: "https://icecast.radiofrance.fr/fip-midfi.mp3",
    },
];


/// Active playback source: the local playlist or one remote stream.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Source {
    Local,
    Remote( &'static StreamDescriptor ),
}


impl Source {
    pub fn is_remote( &self ) -> bool {
        matches!( self, Source::Remote( _ ) )
    }
}


/// Resolves a persisted or user-chosen stream id to a source.
///
/// `None`, the reserved `"local"` id, and any id not present in the table
/// all select the local source. The unknown-id fallback is deliberate: a
/// stale persisted id must never fail source selection.
pub fn resolve( stream_id: Option<&str> ) -> Source {
    match stream_id {
        None | Some( LOCAL_STREAM_ID ) => Source::Local,
        Some( id ) => match STREAMS.iter().find( |s| s.id == id ) {
            Some( descriptor ) => Source::Remote( descriptor ),
            None => {
                tracing::warn!( "Unknown stream id {:?}, falling back to local", id );
                Source::Local
            }
        },
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_resolve_known_id() {
        let source = resolve( Some( "groove-salad" ) );
        match source {
            Source::Remote( descriptor ) => assert_eq!( descriptor.name, "SomaFM Groove Salad" ),
            Source::Local => panic!( "expected remote source" ),
        }
    }


    #[test]
    fn test_resolve_local_sentinel_and_none() {
        assert_eq!( resolve( None ), Source::Local );
        assert_eq!( resolve( Some( LOCAL_STREAM_ID ) ), Source::Local );
    }


    #[test]
    fn test_resolve_unknown_id_falls_back_to_local() {
        assert_eq!( resolve( Some( "nonexistent-id" ) ), Source::Local );
    }


    #[test]
    fn test_stream_ids_are_unique() {
        for ( i, a ) in STREAMS.iter().enumerate() {
            for b in &STREAMS[ i + 1.. ] {
                assert_ne!( a.id, b.id );
            }
        }
    }
}
