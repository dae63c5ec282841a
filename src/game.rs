use std::collections::HashMap;
use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank, Square};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    /// The rules engine rejected a move. The caller is expected to drop the
    /// move, not to retry with another one in the same turn.
    #[error("move {0} rejected as illegal")]
    IllegalMove(String),
}

/// A legal move enriched with everything the scorer pattern-matches on:
/// the mover, the victim (en passant included), a castling flag and the SAN
/// string used for logging and the move list.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub mv: ChessMove,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub is_castling: bool,
    pub san: String,
}

/// Running game the opponent plays in.
///
/// Thin wrapper over the `chess` crate: it owns the board history (for
/// undo), the repetition table and the fifty-move clock. Legality and
/// check/mate questions are answered by the `chess` crate itself.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Every position seen so far; the last entry is the current one.
    boards: Vec<Board>,
    /// Plies since the last capture or pawn move, parallel to `boards`.
    halfmove_clocks: Vec<u16>,
    /// How many times each position hash occurred, for threefold detection.
    seen_positions: HashMap<u64, usize>,
}

impl GameState {
    pub fn new() -> Self {
        Self::start(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let board = Board::from_str(fen).map_err(|e| EngineError::InvalidFen(e.to_string()))?;
        Ok(Self::start(board))
    }

    fn start(board: Board) -> Self {
        let mut seen_positions = HashMap::with_capacity(128);
        seen_positions.insert(board.get_hash(), 1);
        Self {
            boards: vec![board],
            halfmove_clocks: vec![0],
            seen_positions,
        }
    }

    /// Current position. `chess::Board` is `Copy`, so this hands out a
    /// snapshot the caller can freely make trial moves on.
    pub fn current(&self) -> Board {
        self.boards[self.boards.len() - 1]
    }

    pub fn side_to_move(&self) -> Color {
        self.current().side_to_move()
    }

    /// Plies played since this state was created.
    pub fn num_moves(&self) -> u16 {
        (self.boards.len() - 1) as u16
    }

    pub fn fen(&self) -> String {
        self.current().to_string()
    }

    pub fn is_check(&self) -> bool {
        self.current().checkers().popcnt() > 0
    }

    pub fn is_checkmate(&self) -> bool {
        self.current().status() == BoardStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.current().status() == BoardStatus::Stalemate
    }

    fn halfmove_clock(&self) -> u16 {
        self.halfmove_clocks[self.halfmove_clocks.len() - 1]
    }

    /// Fifty-move rule or threefold repetition.
    pub fn can_draw(&self) -> bool {
        self.halfmove_clock() >= 100
            || self.seen_positions.values().any(|&count| count >= 3)
    }

    pub fn is_game_over(&self) -> bool {
        self.current().status() != BoardStatus::Ongoing || self.can_draw()
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<MoveRecord> {
        let board = self.current();
        let mut records = Vec::with_capacity(32);
        for mv in MoveGen::new_legal(&board) {
            if let Some(record) = Self::build_record(&board, mv) {
                records.push(record);
            }
        }
        records
    }

    /// Legal moves starting from one square.
    pub fn legal_moves_from(&self, from: Square) -> Vec<MoveRecord> {
        self.legal_moves()
            .into_iter()
            .filter(|record| record.mv.get_source() == from)
            .collect()
    }

    /// Apply a move after re-validating it against the rules engine.
    pub fn try_make_move(&mut self, record: &MoveRecord) -> Result<(), EngineError> {
        let board = self.current();
        if !board.legal(record.mv) {
            return Err(EngineError::IllegalMove(record.san.clone()));
        }

        let after = board.make_move_new(record.mv);
        let clock = if record.captured.is_some() || record.piece == Piece::Pawn {
            0
        } else {
            self.halfmove_clock() + 1
        };
        self.boards.push(after);
        self.halfmove_clocks.push(clock);
        *self.seen_positions.entry(after.get_hash()).or_insert(0) += 1;
        Ok(())
    }

    /// Undo the most recently applied move. Returns false at the root.
    pub fn undo_last(&mut self) -> bool {
        if self.boards.len() <= 1 {
            return false;
        }
        if let Some(undone) = self.boards.pop() {
            if let Some(count) = self.seen_positions.get_mut(&undone.get_hash()) {
                *count = count.saturating_sub(1);
            }
        }
        self.halfmove_clocks.pop();
        true
    }

    /// Whether playing `record` (yielding `after`) ends the game drawn:
    /// stalemate, third repetition, or the fifty-move rule.
    pub fn would_draw(&self, record: &MoveRecord, after: &Board) -> bool {
        if after.status() == BoardStatus::Stalemate {
            return true;
        }
        if self.seen_count(after.get_hash()) + 1 >= 3 {
            return true;
        }
        let progress = record.captured.is_some() || record.piece == Piece::Pawn;
        !progress && self.halfmove_clock() + 1 >= 100
    }

    fn seen_count(&self, hash: u64) -> usize {
        self.seen_positions.get(&hash).copied().unwrap_or(0)
    }

    fn build_record(board: &Board, mv: ChessMove) -> Option<MoveRecord> {
        let source = mv.get_source();
        let dest = mv.get_dest();
        let piece = board.piece_on(source)?;

        let captured = match board.piece_on(dest) {
            Some(victim) => Some(victim),
            // Pawn moving diagonally onto an empty square is en passant.
            None if piece == Piece::Pawn && source.get_file() != dest.get_file() => {
                Some(Piece::Pawn)
            }
            None => None,
        };
        let is_castling = piece == Piece::King
            && (source.get_file().to_index() as i32 - dest.get_file().to_index() as i32).abs() == 2;
        let san = san_for(board, mv, piece, captured, is_castling);

        Some(MoveRecord {
            mv,
            piece,
            captured,
            is_castling,
            san,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard Algebraic Notation for a legal move.
fn san_for(
    board: &Board,
    mv: ChessMove,
    piece: Piece,
    captured: Option<Piece>,
    is_castling: bool,
) -> String {
    let source = mv.get_source();
    let dest = mv.get_dest();

    let mut san = if is_castling {
        if dest.get_file() == File::G {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else if piece == Piece::Pawn {
        let mut s = String::new();
        if captured.is_some() {
            s.push(file_char(source.get_file()));
            s.push('x');
        }
        s.push_str(&dest.to_string());
        if let Some(promotion) = mv.get_promotion() {
            s.push('=');
            s.push(piece_letter(promotion));
        }
        s
    } else {
        let mut s = String::new();
        s.push(piece_letter(piece));
        s.push_str(&disambiguation(board, mv, piece));
        if captured.is_some() {
            s.push('x');
        }
        s.push_str(&dest.to_string());
        s
    };

    let after = board.make_move_new(mv);
    if after.status() == BoardStatus::Checkmate {
        san.push('#');
    } else if after.checkers().popcnt() > 0 {
        san.push('+');
    }
    san
}

/// File and/or rank of the source square when another piece of the same type
/// could also reach the destination.
fn disambiguation(board: &Board, mv: ChessMove, piece: Piece) -> String {
    let source = mv.get_source();
    let dest = mv.get_dest();

    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|m| {
            m.get_dest() == dest
                && m.get_source() != source
                && board.piece_on(m.get_source()) == Some(piece)
        })
        .map(|m| m.get_source())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|sq| sq.get_file() == source.get_file());
    let shares_rank = rivals.iter().any(|sq| sq.get_rank() == source.get_rank());

    if !shares_file {
        file_char(source.get_file()).to_string()
    } else if !shares_rank {
        rank_char(source.get_rank()).to_string()
    } else {
        format!("{}{}", file_char(source.get_file()), rank_char(source.get_rank()))
    }
}

#[inline]
fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

#[inline]
fn file_char(file: File) -> char {
    (b'a' + file.to_index() as u8) as char
}

#[inline]
fn rank_char(rank: Rank) -> char {
    (b'1' + rank.to_index() as u8) as char
}
