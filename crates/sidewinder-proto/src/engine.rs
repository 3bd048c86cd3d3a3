//! The protocol loop: read request lines, answer with move decisions.
//!
//! One JSON request per line on the reader, one JSON response per line on
//! the writer. A thin HTTP shim (or the test harness) drives this loop; the
//! engine itself never touches a socket.

use std::io::{BufRead, Write};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use sidewinder_core::{legal_moves, Board, GameMode, Move};
use sidewinder_engine::{fallback_move, select_move, Engine, SessionKey};

use crate::error::ProtoError;
use crate::wire::{
    AckResponse, ErrorResponse, InfoResponse, MoveResponse, Request, TurnData,
};

/// Static personalization served on `info`.
const INFO: InfoResponse = InfoResponse {
    apiversion: "1",
    author: "sidewinder",
    color: "#c77d2e",
    head: "pixel",
    tail: "pixel",
    version: env!("CARGO_PKG_VERSION"),
};

/// Handles protocol requests against one evaluation engine.
pub struct Handler {
    engine: Engine,
}

impl Handler {
    /// Wrap an engine.
    pub fn new(engine: Engine) -> Handler {
        Handler { engine }
    }

    /// Run the blocking request loop until the reader closes.
    ///
    /// Request-level failures (bad JSON, invalid boards) are answered with
    /// an error object and the loop continues; only I/O errors end it.
    pub fn run(&self, input: impl BufRead, mut output: impl Write) -> Result<(), ProtoError> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            writeln!(output, "{response}")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Serve one request line, never failing: errors become error replies.
    pub fn handle_line(&self, line: &str) -> String {
        match self.dispatch(line) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request failed");
                serde_json::to_string(&ErrorResponse {
                    error: e.to_string(),
                })
                .unwrap_or_else(|_| String::from("{\"error\":\"internal\"}"))
            }
        }
    }

    fn dispatch(&self, line: &str) -> Result<String, ProtoError> {
        let request: Request = serde_json::from_str(line)?;
        match request {
            Request::Info => Ok(serde_json::to_string(&INFO)?),
            Request::Start(data) => self.handle_start(&data),
            Request::Move(data) => self.handle_move(&data),
            Request::End(data) => self.handle_end(&data),
        }
    }

    fn handle_start(&self, data: &TurnData) -> Result<String, ProtoError> {
        let board = validated_board(data)?;
        let key = session_key(data);

        let tracked = match data.mode() {
            Some(mode) => self
                .engine
                .start_session(key, mode, &board, &data.you.id),
            None => false,
        };
        info!(game_id = %data.game.id, tracked, "game start");

        Ok(serde_json::to_string(&AckResponse { status: "ok" })?)
    }

    fn handle_move(&self, data: &TurnData) -> Result<String, ProtoError> {
        let board = validated_board(data)?;
        let key = session_key(data);
        let mode = data.mode();
        // Unknown rulesets still get legality and fallback service under
        // standard geometry; only the evaluator path needs the real mode.
        let geometry = mode.unwrap_or(GameMode::Standard);

        let legal = legal_moves(geometry, &board, &data.you.id);
        let mut rng = rand::thread_rng();

        let chosen = self.choose(&key, mode, geometry, &board, &data.you.id, &legal, &mut rng);

        info!(
            game_id = %data.game.id,
            turn = data.turn,
            mv = %chosen,
            options = legal.len(),
            "move"
        );

        Ok(serde_json::to_string(&MoveResponse {
            mv: chosen.as_str(),
            shout: shout_for(chosen, &mut rng),
        })?)
    }

    fn handle_end(&self, data: &TurnData) -> Result<String, ProtoError> {
        self.engine.end_session(&session_key(data));
        info!(game_id = %data.game.id, "game end");
        Ok(serde_json::to_string(&AckResponse { status: "ok" })?)
    }

    /// The per-turn policy: a forced move is taken as-is; otherwise the
    /// evaluator ranks the options and the best legal one wins; any gap in
    /// the neural path drops to the flood-fill picker.
    #[allow(clippy::too_many_arguments)]
    fn choose<R: Rng>(
        &self,
        key: &SessionKey,
        mode: Option<GameMode>,
        geometry: GameMode,
        board: &Board,
        viewer_id: &str,
        legal: &[Move],
        rng: &mut R,
    ) -> Move {
        if legal.len() == 1 {
            return legal[0];
        }

        let ranked = mode
            .and_then(|m| self.engine.rank(key, m, board, viewer_id))
            .and_then(|scores| select_move(scores, legal));

        match ranked {
            Some(mv) => mv,
            None => fallback_move(geometry, board, viewer_id, legal, rng),
        }
    }
}

/// Convert and structurally validate the wire board.
fn validated_board(data: &TurnData) -> Result<Board, ProtoError> {
    let board = data.to_board();
    board.validate()?;
    Ok(board)
}

/// Session key for a request: one entry per (game, snake) participation.
fn session_key(data: &TurnData) -> SessionKey {
    SessionKey::new(data.game.id.clone(), data.you.id.clone())
}

/// Pick a shout to accompany a move.
fn shout_for<R: Rng>(mv: Move, rng: &mut R) -> String {
    let canned = [
        String::from("why are we shouting??"),
        String::from("I'm not really sure..."),
        format!("I guess I'll go {mv} then."),
    ];
    canned
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| String::from("..."))
}
