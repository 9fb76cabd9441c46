//! Terminal application shell: wires stdin, the session and the socket.

use crate::commands::{self, Command, CommandHelp, TileRef};
use crate::render;
use peelgrid_core::storage::{FileStorage, IdentityManager, StorageError, create_identity_manager};
use peelgrid_core::validation::validate_player_name;
use peelgrid_core::{
    ActionError, ApiClient, ApiError, ClientConfig, ConfigError, GameSession, InputError,
    PlatformWebSocket, SyncError, SyncEvent, TileId,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// How long to wait for input before servicing the socket again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid player name: {0}")]
    PlayerName(#[from] InputError),
    #[error("No player name given")]
    NoPlayerName,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Application options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub config_path: Option<PathBuf>,
}

impl AppOptions {
    /// `peelgrid [config.json]`
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        Self {
            config_path: args.into_iter().nth(1).map(PathBuf::from),
        }
    }
}

pub struct App {
    config: ClientConfig,
    session: GameSession,
    socket: PlatformWebSocket,
    identity: IdentityManager<FileStorage>,
    api: ApiClient,
}

impl App {
    pub async fn new(options: AppOptions) -> Result<Self, AppError> {
        let config = ClientConfig::load(options.config_path.as_deref())?;
        log::debug!("Config: {:?}", config);

        let mut identity = match &config.data_dir {
            Some(dir) => IdentityManager::new(Arc::new(FileStorage::new(dir.clone())?)),
            None => create_identity_manager()?,
        };
        let restored = identity.restore().await;

        let player = match (&config.player_name, &restored) {
            (Some(name), _) => name.clone(),
            (None, Some(saved)) => saved.player_id.clone(),
            (None, None) => prompt_player_name()?,
        };
        validate_player_name(&player)?;

        let session = GameSession::new(player.trim(), config.board_size);
        let api = ApiClient::new(config.http_base())?;

        let mut app = Self {
            config,
            session,
            socket: PlatformWebSocket::new(),
            identity,
            api,
        };
        if let Some(game_id) = restored.and_then(|saved| saved.game_id) {
            println!("Last game was {} (use 'join {}' to rejoin)", game_id, game_id);
        }
        app.socket.connect(&app.config.server_url)?;
        Ok(app)
    }

    /// Run until `quit` or end of input.
    pub async fn run(options: AppOptions) -> Result<(), AppError> {
        let mut app = Self::new(options).await?;
        println!("peelgrid: playing as {}", app.session.player_id());
        CommandHelp::print_all();

        let lines = spawn_stdin_reader();
        loop {
            app.pump_socket();
            match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match commands::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => app.execute(command),
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            app.flush_outgoing();
            let _ = io::stdout().flush();
        }

        app.socket.disconnect();
        log::info!("Bye");
        Ok(())
    }

    fn pump_socket(&mut self) {
        let mut changed = false;
        for event in self.socket.poll_events() {
            match event {
                SyncEvent::Connected => println!("Connected to {}", self.config.server_url),
                SyncEvent::Disconnected => println!("Disconnected from server"),
                SyncEvent::Error { message } => println!("Connection error: {}", message),
                SyncEvent::Event(event) => {
                    self.session.handle_event(event);
                    changed = true;
                }
            }
        }
        if changed {
            print!("{}", render::full_view(&self.session));
        }
    }

    fn flush_outgoing(&mut self) {
        for event in self.session.take_outgoing() {
            if let Err(e) = self.socket.send_event(&event) {
                log::error!("Failed to send {}: {}", event.name(), e);
                println!("Could not send {}: {}", event.name(), e);
            }
        }
    }

    fn execute(&mut self, command: Command) {
        if let Err(e) = self.try_execute(command) {
            println!("{}", e);
        }
    }

    fn try_execute(&mut self, command: Command) -> Result<(), ActionError> {
        match command {
            Command::Join { game_id, test_mode } => {
                self.session.join(&game_id, test_mode)?;
                self.remember_identity();
            }
            Command::TestGame { game_id } => {
                self.session.create_test_game(&game_id)?;
                self.remember_identity();
            }
            Command::Start => self.session.start()?,
            Command::Split => self.session.split()?,
            Command::Drag(tile) => {
                let id = self.resolve(tile)?;
                self.session.begin_drag(id)?;
            }
            Command::Drop { row, col } => {
                let committed = self.session.drop_on_cell(row, col)?;
                println!("{} tile(s) moved", committed.len());
                self.show();
            }
            Command::DropOnBench => {
                self.session.drop_on_bench()?;
                self.show();
            }
            Command::Cancel => self.session.cancel_drag(),
            Command::Place { tile, row, col } => {
                let id = self.resolve(tile)?;
                self.session.begin_drag(id)?;
                self.session.drop_on_cell(row, col)?;
                self.show();
            }
            Command::Select(tile) => {
                let id = self.resolve(tile)?;
                self.session.select(id);
            }
            Command::Toggle(tile) => {
                let id = self.resolve(tile)?;
                let selected = self.session.toggle_selection(id);
                println!("{}", if selected { "Selected" } else { "Deselected" });
            }
            Command::SelectAll => self.session.select_all(),
            Command::ClearSelection => self.session.clear_selection(),
            Command::Peel => self.session.peel()?,
            Command::Bananagrams => {
                let words = self.session.bananagrams()?;
                println!("Submitted: {}", words.join(", "));
            }
            Command::Swap(tile) => {
                let id = self.resolve(tile)?;
                let letter = self.session.swap(&id)?;
                println!("Swapped {}", letter);
            }
            Command::Accept(words) => self.session.validate_words(words)?,
            Command::Continue => self.session.continue_game()?,
            Command::Reset => self.session.reset()?,
            Command::Show => self.show(),
            Command::Words => println!("{}", self.session.words().join("\n")),
            Command::Check => {
                let result = self.session.validate();
                match result.error {
                    Some(error) => println!("{}", error),
                    None => println!("Board is ready"),
                }
            }
            Command::Players => {
                for player in self.session.players() {
                    println!(
                        "{} {} tiles{}",
                        player.name,
                        player.tile_count,
                        if player.ready { "" } else { " (waiting)" }
                    );
                }
            }
            Command::Games => self.list_games(),
            Command::Help => CommandHelp::print_all(),
            Command::Quit => {}
        }
        Ok(())
    }

    fn resolve(&self, tile: TileRef) -> Result<TileId, ActionError> {
        match tile {
            TileRef::Bench(index) => self
                .session
                .bench()
                .get(index - 1)
                .map(|t| t.id.clone())
                .ok_or_else(|| ActionError::UnknownTile(TileId::new(format!("b{}", index)))),
            TileRef::Cell { row, col } => self
                .session
                .board()
                .tile_at(row, col)
                .map(|t| t.id.clone())
                .ok_or_else(|| {
                    ActionError::UnknownTile(TileId::new(render::cell(
                        peelgrid_core::Position::new(row, col),
                    )))
                }),
        }
    }

    fn remember_identity(&mut self) {
        let player = self.session.player_id().to_string();
        let game = self.session.game_id().to_string();
        if let Err(e) = pollster::block_on(self.identity.remember(&player, Some(&game))) {
            log::warn!("Could not save identity: {}", e);
        }
    }

    fn list_games(&self) {
        match (self.api.game_names(), self.api.reserved_game_ids()) {
            (Ok(names), Ok(reserved)) => {
                println!("Games: {}", names.join(" "));
                println!("Reserved: {}", reserved.join(" "));
            }
            (Err(e), _) | (_, Err(e)) => println!("Could not list games: {}", e),
        }
    }

    fn show(&self) {
        print!("{}", render::full_view(&self.session));
    }
}

/// Ask for a name on stdin before anything else starts reading it.
fn prompt_player_name() -> Result<String, AppError> {
    print!("Player name: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let name = line.trim().to_string();
    if name.is_empty() {
        return Err(AppError::NoPlayerName);
    }
    Ok(name)
}

/// Forward stdin lines over a channel so the main loop can keep polling the socket.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_args() {
        let options = AppOptions::from_args(["peelgrid".to_string(), "cfg.json".to_string()]);
        assert_eq!(options.config_path, Some(PathBuf::from("cfg.json")));
        assert!(AppOptions::from_args(["peelgrid".to_string()]).config_path.is_none());
    }
}
