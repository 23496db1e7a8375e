use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use lattice_core::{update, AppState, Msg};
use lattice_logging::{lattice_debug, lattice_info};

use crate::commands::{parse_command, Command, HELP};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::{render, render_legend};

/// Everything the main loop reacts to.
pub enum Input {
    Msg(Msg),
    Status,
    Quit,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    lattice_engine::ensure_output_dir(&config.download_dir)?;
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config.api_settings(), &config.download_dir, input_tx.clone())?;

    lattice_info!(
        "Lattice Lab started api={} downloads={:?}",
        config.api_url,
        config.download_dir
    );
    println!("{HELP}");

    thread::spawn(move || read_commands(input_tx));

    let mut state = AppState::new();
    print!("{}", render(&state.view()));
    let _ = io::stdout().flush();

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => {
                lattice_debug!("Dispatching {:?}", msg);
                let (next, effects) = update(state, msg);
                state = next;
                runner.enqueue(effects);
                if state.consume_dirty() {
                    print!("{}", render(&state.view()));
                    let _ = io::stdout().flush();
                }
            }
            Input::Status => {
                let view = state.view();
                print!("{}{}", render(&view), render_legend(&view));
                let _ = io::stdout().flush();
            }
            Input::Quit => break,
        }
    }
    lattice_info!("Lattice Lab stopped");
    Ok(())
}

fn read_commands(input_tx: mpsc::Sender<Input>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let input = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Msg(msg))) => Input::Msg(msg),
            Ok(Some(Command::Status)) => Input::Status,
            Ok(Some(Command::Help)) => {
                println!("{HELP}");
                continue;
            }
            Ok(Some(Command::Quit)) => Input::Quit,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if input_tx.send(input).is_err() {
            return;
        }
    }
    let _ = input_tx.send(Input::Quit);
}
