//! Track catalog
//!
//! Produces the ordered sequence of local tracks for a folder. The scan is
//! a single-level directory listing filtered to audio extensions; the
//! resulting order is fixed for the duration of a playback session.

use std::fmt;
use std::path::{ Path, PathBuf };

use thiserror::Error;


/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "wav", "m4a", "aac", "opus", "wma", "aiff", "alac",
];


/// Errors that can occur while scanning a folder.
#[derive( Debug, Error )]
pub enum CatalogError {
    #[error( "IO error: {0}" )]
    Io( #[from] std::io::Error ),

    #[error( "Not a folder: {0}" )]
    InvalidPath( PathBuf ),
}


/// Opaque identifier of a local audio file within the active folder.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Track( String );


impl Track {
    pub fn new( id: impl Into<String> ) -> Self {
        Self( id.into() )
    }


    /// The raw identifier, also usable as a player source URI.
    pub fn as_str( &self ) -> &str {
        &self.0
    }


    /// Display form: the file stem, without directory or extension.
    pub fn name( &self ) -> &str {
        Path::new( &self.0 )
            .file_stem()
            .and_then( |s| s.to_str() )
            .unwrap_or( &self.0 )
    }
}


impl fmt::Display for Track {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        write!( f, "{}", self.name() )
    }
}


/// Source of the ordered local track sequence.
pub trait TrackCatalog {
    /// Scans a folder and returns its qualifying tracks in catalog order.
    ///
    /// An empty folder yields an empty sequence; a path that is not a real
    /// folder fails with [`CatalogError::InvalidPath`].
    fn scan( &self, folder: &Path ) -> Result<Vec<Track>, CatalogError>;
}


/// Filesystem-backed catalog.
///
/// Lists a single directory level, keeps files with a supported audio
/// extension, and orders them case-insensitively by file name.
#[derive( Debug, Default )]
pub struct FsTrackCatalog;


impl FsTrackCatalog {
    pub fn new() -> Self {
        Self
    }


    /// Checks if a file has a supported audio extension.
    fn is_audio_file( path: &Path ) -> bool {
        path.extension()
            .and_then( |e| e.to_str() )
            .map( |e| SUPPORTED_EXTENSIONS.contains( &e.to_lowercase().as_str() ) )
            .unwrap_or( false )
    }
}


impl TrackCatalog for FsTrackCatalog {
    fn scan( &self, folder: &Path ) -> Result<Vec<Track>, CatalogError> {
        if !folder.is_dir() {
            return Err( CatalogError::InvalidPath( folder.to_path_buf() ) );
        }

        tracing::info!( "Scanning: {:?}", folder );

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir( folder )?.flatten() {
            let path = entry.path();
            if path.is_file() && Self::is_audio_file( &path ) {
                paths.push( path );
            }
        }

        paths.sort_by_key( |p| {
            p.file_name()
                .map( |n| n.to_string_lossy().to_lowercase() )
                .unwrap_or_default()
        });

        tracing::info!( "Found {} tracks", paths.len() );
        Ok( paths
            .into_iter()
            .map( |p| Track::new( p.to_string_lossy().into_owned() ) )
            .collect() )
    }
}


#[cfg( test )]
mod tests {
    use std::fs;

    use super::*;


    fn scratch_dir( tag: &str ) -> PathBuf {
        let dir = std::env::temp_dir()
            .join( format!( "focusfm-catalog-{}-{}", tag, std::process::id() ) );
        let _ = fs::remove_dir_all( &dir );
        fs::create_dir_all( &dir ).unwrap();
        dir
    }


    #[test]
    fn test_is_audio_file() {
        assert!( FsTrackCatalog::is_audio_file( Path::new( "song.mp3" ) ) );
        assert!( FsTrackCatalog::is_audio_file( Path::new( "song.FLAC" ) ) );
        assert!( !FsTrackCatalog::is_audio_file( Path::new( "notes.txt" ) ) );
        assert!( !FsTrackCatalog::is_audio_file( Path::new( "noext" ) ) );
    }


    #[test]
    fn test_scan_orders_case_insensitively_and_filters() {
        let dir = scratch_dir( "order" );
        for name in [ "b.mp3", "A.flac", "c.ogg", "readme.txt" ] {
            fs::write( dir.join( name ), b"" ).unwrap();
        }

        let tracks = FsTrackCatalog::new().scan( &dir ).unwrap();
        let names: Vec<&str> = tracks.iter().map( |t| t.name() ).collect();
        assert_eq!( names, vec![ "A", "b", "c" ] );

        let _ = fs::remove_dir_all( &dir );
    }


    #[test]
    fn test_scan_empty_folder_is_ok() {
        let dir = scratch_dir( "empty" );
        let tracks = FsTrackCatalog::new().scan( &dir ).unwrap();
        assert!( tracks.is_empty() );
        let _ = fs::remove_dir_all( &dir );
    }


    #[test]
    fn test_scan_rejects_non_folder() {
        let result = FsTrackCatalog::new().scan( Path::new( "/nonexistent/focusfm-test" ) );
        assert!( matches!( result, Err( CatalogError::InvalidPath( _ ) ) ) );
    }


    #[test]
    fn test_track_name_strips_extension() {
        let track = Track::new( "/music/Morning Coffee.mp3" );
        assert_eq!( track.name(), "Morning Coffee" );
        assert_eq!( track.as_str(), "/music/Morning Coffee.mp3" );
    }
}
