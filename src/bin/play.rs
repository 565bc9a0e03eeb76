use std::io::{self, BufRead, Write};

use hotseat_chess::config::SessionConfig;
use hotseat_chess::error::ChessError;
use hotseat_chess::moves::Move;
use hotseat_chess::session::{Session, SessionEvent};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const HELP: &str = "commands: <move> (e.g. e2e4), undo, redo, reset, show, help, quit";

struct Options {
    config: Option<String>,
    json: bool,
}

fn parse_args() -> Options {
    let mut options = Options {
        config: None,
        json: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => options.config = args.next(),
            "--json" => options.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    options
}

fn render(out: &mut impl Write, session: &Session, json: bool) -> Result<(), ChessError> {
    if json {
        serde_json::to_writer(&mut *out, &session.view())?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "{}", session.board())?;
    if let Some(last) = session.last_move() {
        writeln!(out, "last move: {last}")?;
    }
    if session.is_game_over() {
        writeln!(out, "{}", session.status())?;
    } else if session.view().in_check {
        writeln!(out, "{} to move (in check)", session.turn())?;
    } else {
        writeln!(out, "{} to move", session.turn())?;
    }
    Ok(())
}

fn main() -> Result<(), ChessError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let options = parse_args();
    let config = match &options.config {
        Some(path) => SessionConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    let mut session = Session::with_config(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &session, options.json)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let events = match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            "show" => vec![SessionEvent::StateChanged],
            "undo" => session.undo(),
            "redo" => session.redo(),
            "reset" => session.reset(),
            text => match Move::from_uci(text) {
                Ok(_) if session.is_game_over() => {
                    writeln!(out, "{}; undo or reset to keep playing", session.status())?;
                    continue;
                }
                Ok(mv) => {
                    let before = session.current_index();
                    let events = session.play(mv);
                    if session.current_index() == before {
                        writeln!(out, "illegal move: {mv}")?;
                        continue;
                    }
                    events
                }
                Err(e) => {
                    writeln!(out, "{e}; {HELP}")?;
                    continue;
                }
            },
        };

        if events.is_empty() {
            writeln!(out, "nothing to do")?;
            continue;
        }
        render(&mut out, &session, options.json)?;
        out.flush()?;
    }
    Ok(())
}
