//! Application settings management
//!
//! Persistent settings for the audio folder, volume, session durations,
//! and the last active stream.

use std::fs;
use std::path::PathBuf;

use serde::{ Deserialize, Serialize };

use focusfm_core::SettingsSink;


/// Application settings.
#[derive( Debug, Clone, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Folder scanned for local audio files.
    pub audio_folder: Option<PathBuf>,

    /// Playback volume, 0-100.
    pub volume: u8,

    /// Work session length in minutes.
    pub work_minutes: u32,

    /// Rest session length in minutes.
    pub rest_minutes: u32,

    /// Last active stream id; None means the local folder.
    pub active_stream: Option<String>,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_folder: None,
            volume: 80,
            work_minutes: 25,
            rest_minutes: 5,
            active_stream: None,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "focusfm" ).join( "settings.json" ) )
    }


    /// Loads settings from disk, or returns defaults if not found.
    pub fn load() -> Self {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string( &path ) {
            Ok( contents ) => {
                serde_json::from_str( &contents ).unwrap_or_default()
            }
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    /// Saves settings to disk.
    pub fn save( &self ) {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return,
        };

        if let Some( parent ) = path.parent() {
            if !parent.exists() {
                if let Err( e ) = fs::create_dir_all( parent ) {
                    tracing::warn!( "Failed to create settings directory: {}", e );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( &path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }
}


impl SettingsSink for Settings {
    fn persist_active_stream( &mut self, stream_id: Option<&str> ) {
        self.active_stream = stream_id.map( str::to_string );
        self.save();
    }
}
