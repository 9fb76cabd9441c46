//! Line commands understood by the terminal front end.

use thiserror::Error;

/// How a command names a tile: by bench slot or by board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileRef {
    /// 1-based index into the bench as printed.
    Bench(usize),
    Cell { row: i32, col: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join { game_id: String, test_mode: bool },
    TestGame { game_id: String },
    Start,
    Split,
    Drag(TileRef),
    Drop { row: i32, col: i32 },
    DropOnBench,
    Cancel,
    /// Drag and drop in one step.
    Place { tile: TileRef, row: i32, col: i32 },
    Select(TileRef),
    Toggle(TileRef),
    SelectAll,
    ClearSelection,
    Peel,
    Bananagrams,
    Swap(TileRef),
    Accept(Vec<String>),
    Continue,
    Reset,
    Show,
    Words,
    Check,
    Players,
    Games,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Bad tile reference '{0}': use b<N> for the bench or <row>,<col> for the board")]
    TileRef(String),
    #[error("Bad cell '{0}': use <row>,<col>")]
    Cell(String),
}

/// A command and its one-line description.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(usage: &'static str, description: &'static str) -> Self {
        Self { usage, description }
    }

    pub fn all() -> Vec<CommandHelp> {
        vec![
            Self::new("join <game> [test]", "Join a game by its 4-digit id"),
            Self::new("test <game>", "Create a small test game and join it"),
            Self::new("start", "Start the game"),
            Self::new("split", "Deal the starting tiles"),
            Self::new("drag <tile>", "Pick up a tile (b<N> or <row>,<col>)"),
            Self::new("drop <row>,<col>", "Drop the dragged tile (and selection) on a cell"),
            Self::new("bench", "Drop the dragged tile back on the bench"),
            Self::new("cancel", "Cancel the current drag"),
            Self::new("place <tile> <row>,<col>", "Drag and drop in one step"),
            Self::new("select <tile>", "Add a tile to the selection"),
            Self::new("toggle <tile>", "Toggle a tile in the selection"),
            Self::new("all", "Select every tile"),
            Self::new("clear", "Clear the selection"),
            Self::new("peel", "Take a new tile once the board is complete"),
            Self::new("bananagrams", "Claim the win"),
            Self::new("swap <tile>", "Trade a tile for three from the bag"),
            Self::new("accept <word>...", "Report the words you accept in a review"),
            Self::new("continue", "Resume play after a rejected claim"),
            Self::new("reset", "Reset the game"),
            Self::new("show", "Print the board and bench"),
            Self::new("words", "List words on the board"),
            Self::new("check", "Check the board locally"),
            Self::new("players", "List players"),
            Self::new("games", "List known and reserved game ids"),
            Self::new("help", "Show this list"),
            Self::new("quit", "Leave"),
        ]
    }

    pub fn print_all() {
        println!("\n=== Commands ===");
        for help in Self::all() {
            println!("  {:26} {}", help.usage, help.description);
        }
        println!();
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("join", [game]) => Command::Join { game_id: game.to_string(), test_mode: false },
        ("join", [game, "test"]) => Command::Join { game_id: game.to_string(), test_mode: true },
        ("join", _) => return Err(ParseError::Usage("join <game> [test]")),
        ("test", [game]) => Command::TestGame { game_id: game.to_string() },
        ("test", _) => return Err(ParseError::Usage("test <game>")),
        ("start", []) => Command::Start,
        ("split", []) => Command::Split,
        ("drag", [tile]) => Command::Drag(parse_tile(tile)?),
        ("drag", _) => return Err(ParseError::Usage("drag <tile>")),
        ("drop", [cell]) => {
            let (row, col) = parse_cell(cell)?;
            Command::Drop { row, col }
        }
        ("drop", _) => return Err(ParseError::Usage("drop <row>,<col>")),
        ("bench", []) => Command::DropOnBench,
        ("cancel", []) => Command::Cancel,
        ("place", [tile, cell]) => {
            let tile = parse_tile(tile)?;
            let (row, col) = parse_cell(cell)?;
            Command::Place { tile, row, col }
        }
        ("place", _) => return Err(ParseError::Usage("place <tile> <row>,<col>")),
        ("select", [tile]) => Command::Select(parse_tile(tile)?),
        ("toggle", [tile]) => Command::Toggle(parse_tile(tile)?),
        ("all", []) => Command::SelectAll,
        ("clear", []) => Command::ClearSelection,
        ("peel", []) => Command::Peel,
        ("bananagrams", []) | ("bg", []) => Command::Bananagrams,
        ("swap", [tile]) => Command::Swap(parse_tile(tile)?),
        ("accept", words) => Command::Accept(words.iter().map(|w| w.to_ascii_uppercase()).collect()),
        ("continue", []) => Command::Continue,
        ("reset", []) => Command::Reset,
        ("show", []) => Command::Show,
        ("words", []) => Command::Words,
        ("check", []) => Command::Check,
        ("players", []) => Command::Players,
        ("games", []) => Command::Games,
        ("help", _) | ("?", _) => Command::Help,
        ("quit", []) | ("exit", []) => Command::Quit,
        (other, _) => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_tile(text: &str) -> Result<TileRef, ParseError> {
    if let Some(index) = text.strip_prefix(['b', 'B']) {
        return match index.parse::<usize>() {
            Ok(i) if i > 0 => Ok(TileRef::Bench(i)),
            _ => Err(ParseError::TileRef(text.to_string())),
        };
    }
    let (row, col) = parse_cell(text).map_err(|_| ParseError::TileRef(text.to_string()))?;
    Ok(TileRef::Cell { row, col })
}

fn parse_cell(text: &str) -> Result<(i32, i32), ParseError> {
    let (row, col) = text
        .split_once(',')
        .ok_or_else(|| ParseError::Cell(text.to_string()))?;
    match (row.trim().parse(), col.trim().parse()) {
        (Ok(row), Ok(col)) => Ok((row, col)),
        _ => Err(ParseError::Cell(text.to_string())),
    }
}
