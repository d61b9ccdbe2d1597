//! FocusFM CLI - radio and focus timer in a terminal status bar

mod cli;
mod media;
mod settings;
mod status;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{ Duration, Instant };

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{ self, Event, KeyCode, KeyEventKind },
    terminal::{ disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{ Block, Borders, List, ListItem, ListState, Paragraph },
};

use cli::Args;
use media::{ create_shim_player, MediaEvent, ShimPlayer };
use settings::Settings;
use status::{ shared_status, SharedStatus, SharedStatusPresenter };

use focusfm_core::{
    FsTrackCatalog, PlaybackSessionController, TickScheduler, TimerConfig, TimerController,
    STREAMS,
};


type Session =
    PlaybackSessionController<ShimPlayer, FsTrackCatalog, SharedStatusPresenter, Settings>;
type Timer = TimerController<SharedStatusPresenter, WallClockScheduler>;


/// Tick scheduler backed by the main loop's wall clock.
///
/// The loop fires `on_tick` once per elapsed second regardless; the timer
/// ignores ticks while it is not running, so this handle only has to track
/// the armed state for the scheduling contract.
#[derive( Debug, Default )]
struct WallClockScheduler {
    running: bool,
}


impl TickScheduler for WallClockScheduler {
    fn start( &mut self ) {
        self.running = true;
    }


    fn cancel( &mut self ) {
        self.running = false;
    }


    fn is_running( &self ) -> bool {
        self.running
    }
}


/// Application state.
struct App {
    session: Session,
    timer: Timer,
    shared: SharedStatus,
    media_rx: Receiver<MediaEvent>,
    should_quit: bool,

    volume: u8,
    list_state: ListState,
    last_tick: Instant,
}


impl App {
    fn new( args: &Args ) -> Self {
        let settings = Settings::load();

        let folder = args.folder.clone()
            .or_else( || settings.audio_folder.clone() )
            .or_else( dirs::audio_dir )
            .unwrap_or_else( || PathBuf::from( "." ) );

        let work = args.work.unwrap_or( settings.work_minutes );
        let rest = args.rest.unwrap_or( settings.rest_minutes );
        let volume = settings.volume.min( 100 );

        let initial_stream = args.stream.clone().or_else( || settings.active_stream.clone() );

        let shared = shared_status();
        let presenter = SharedStatusPresenter::new( shared.clone() );
        let ( player, media_rx ) = create_shim_player();

        let mut session = PlaybackSessionController::new(
            player,
            FsTrackCatalog::new(),
            presenter.clone(),
            settings,
            folder,
        );
        session.set_volume( volume );
        session.switch_source( initial_stream.as_deref() );

        let timer = TimerController::new(
            presenter,
            WallClockScheduler::default(),
            TimerConfig::new( work, rest ),
        );

        let mut list_state = ListState::default();
        list_state.select( session.current_index() );

        Self {
            session,
            timer,
            shared,
            media_rx,
            should_quit: false,
            volume,
            list_state,
            last_tick: Instant::now(),
        }
    }


    /// Updates app state: media events, the one-second timer tick, and
    /// notice expiry.
    fn tick( &mut self ) {
        while let Ok( event ) = self.media_rx.try_recv() {
            match event {
                MediaEvent::PlayResolved( token, outcome ) => {
                    self.session.on_play_resolved( token, outcome );
                }
                MediaEvent::Played => self.session.on_player_play(),
                MediaEvent::Paused => self.session.on_player_pause(),
            }
        }

        if self.last_tick.elapsed() >= Duration::from_secs( 1 ) {
            self.last_tick = Instant::now();
            self.timer.on_tick();
        }

        let mut snapshot = self.shared.lock().unwrap_or_else( |e| e.into_inner() );
        snapshot.expire_notice();
    }


    fn handle_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) => self.should_quit = true,

            // Playback
            KeyCode::Char( ' ' ) => { let _ = self.session.toggle(); }
            KeyCode::Char( 'n' ) => { let _ = self.session.next(); }
            KeyCode::Char( 'p' ) => { let _ = self.session.previous(); }

            // Timer
            KeyCode::Char( 's' ) => { let _ = self.timer.start(); }
            KeyCode::Char( 'a' ) => { let _ = self.timer.pause(); }
            KeyCode::Char( 'r' ) => { let _ = self.timer.reset(); }

            // Volume
            KeyCode::Char( '+' ) | KeyCode::Char( '=' ) => {
                self.volume = ( self.volume + 5 ).min( 100 );
                self.session.set_volume( self.volume );
            }
            KeyCode::Char( '-' ) => {
                self.volume = self.volume.saturating_sub( 5 );
                self.session.set_volume( self.volume );
            }

            // Source selection: 0 = local folder, 1-9 = stream table
            KeyCode::Char( '0' ) => self.switch_and_reselect( None ),
            KeyCode::Char( c @ '1'..='9' ) => {
                let index = ( c as usize ) - ( '1' as usize );
                if let Some( descriptor ) = STREAMS.get( index ) {
                    self.switch_and_reselect( Some( descriptor.id ) );
                }
            }

            // Playlist selection
            KeyCode::Up => self.move_selection( -1 ),
            KeyCode::Down => self.move_selection( 1 ),
            KeyCode::Enter => {
                if let Some( track ) = self
                    .list_state
                    .selected()
                    .and_then( |i| self.session.playlist().get( i ) )
                    .cloned()
                {
                    let _ = self.session.select_track( &track );
                }
            }

            _ => {}
        }
    }


    fn switch_and_reselect( &mut self, stream_id: Option<&str> ) {
        self.session.switch_source( stream_id );
        self.list_state.select( self.session.current_index() );
    }


    fn move_selection( &mut self, delta: isize ) {
        let len = self.session.playlist().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or( 0 ) as isize;
        let next = ( current + delta ).rem_euclid( len as isize ) as usize;
        self.list_state.select( Some( next ) );
    }
}


fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;

    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;

    let mut app = App::new( &args );

    // Main loop
    loop {
        app.tick();

        terminal.draw( |frame| draw_ui( frame, &mut app ) )?;

        if event::poll( Duration::from_millis( 100 ) )? {
            if let Event::Key( key ) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key( key.code );
                }
            }
        }

        if app.should_quit {
            app.session.shutdown();
            app.timer.shutdown();
            break;
        }
    }

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;

    Ok(())
}


/// Sets up file-based logging; the terminal itself is in raw mode.
fn init_logging() {
    let Some( dir ) = dirs::data_local_dir().map( |d| d.join( "focusfm" ) ) else {
        return;
    };
    if std::fs::create_dir_all( &dir ).is_err() {
        return;
    }
    let Ok( file ) = std::fs::File::create( dir.join( "focusfm.log" ) ) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else( |_| tracing_subscriber::EnvFilter::new( "info" ) );

    tracing_subscriber::fmt()
        .with_env_filter( filter )
        .with_writer( std::sync::Mutex::new( file ) )
        .with_ansi( false )
        .init();
}


/// Draws the main UI.
fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( 2 ),  // Header
            Constraint::Min( 0 ),     // Playlist
            Constraint::Length( 2 ),  // Playback + timer status
            Constraint::Length( 1 ),  // Notice bar
            Constraint::Length( 1 ),  // Help
        ])
        .split( area );

    let header = Paragraph::new( "  FOCUSFM" )
        .style( Style::default().fg( Color::Cyan ).bold() )
        .block( Block::default().borders( Borders::BOTTOM ) );
    frame.render_widget( header, chunks[ 0 ] );

    draw_playlist( frame, app, chunks[ 1 ] );
    draw_status_lines( frame, app, chunks[ 2 ] );
    draw_notice_bar( frame, app, chunks[ 3 ] );

    let help = Paragraph::new(
        " space play/pause | n/p skip | 0-9 source | s/a/r timer | +/- volume | q quit"
    ).style( Style::default().fg( Color::DarkGray ) );
    frame.render_widget( help, chunks[ 4 ] );
}


fn draw_playlist( frame: &mut Frame, app: &mut App, area: Rect ) {
    let playing = app.session.current_index();

    let items: Vec<ListItem> = app
        .session
        .playlist()
        .iter()
        .enumerate()
        .map( |( i, track )| {
            let marker = if Some( i ) == playing { "> " } else { "  " };
            let style = if Some( i ) == playing {
                Style::default().fg( Color::Green )
            } else {
                Style::default()
            };
            ListItem::new( format!( "{}{}", marker, track.name() ) ).style( style )
        })
        .collect();

    let title = if app.session.source().is_remote() {
        " Streams (0 returns to local files) "
    } else {
        " Local files "
    };

    let list = List::new( items )
        .block( Block::default().borders( Borders::ALL ).title( title ) )
        .highlight_style( Style::default().bg( Color::DarkGray ) );

    frame.render_stateful_widget( list, area, &mut app.list_state );
}


fn draw_status_lines( frame: &mut Frame, app: &App, area: Rect ) {
    let snapshot = app.shared.lock().unwrap_or_else( |e| e.into_inner() );

    let lines = vec![
        Line::from( format!( " {}  [vol {}%]", snapshot.playback, app.volume ) ),
        Line::from( format!( " {}", snapshot.timer ) ).style( Style::default().fg( Color::Yellow ) ),
    ];
    frame.render_widget( Paragraph::new( lines ), area );
}


fn draw_notice_bar( frame: &mut Frame, app: &App, area: Rect ) {
    let snapshot = app.shared.lock().unwrap_or_else( |e| e.into_inner() );

    let ( text, style ) = match snapshot.notice {
        Some( ref notice ) => (
            format!( " {}", notice ),
            Style::default().fg( Color::Black ).bg( Color::Yellow ),
        ),
        None => ( String::new(), Style::default() ),
    };
    frame.render_widget( Paragraph::new( text ).style( style ), area );
}
