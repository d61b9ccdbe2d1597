//! Command-line argument parsing for FocusFM.

use std::path::PathBuf;

use clap::Parser;


/// FocusFM - radio and focus timer in your status bar.
#[derive( Parser, Debug )]
#[command( name = "focusfm" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Folder to scan for local audio files.
    #[arg( short, long )]
    pub folder: Option<PathBuf>,

    /// Stream id to tune to on startup ("local" for the local folder).
    #[arg( short, long )]
    pub stream: Option<String>,

    /// Work session length in minutes.
    #[arg( long )]
    pub work: Option<u32>,

    /// Rest session length in minutes.
    #[arg( long )]
    pub rest: Option<u32>,
}
