use std::{fs::File, io, process::exit};

use clap::Parser;
use env_logger::{Env, Target};

use rectilinear_snake::config::Args;
use rectilinear_snake::{game, term};

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Error opening log file: {}", e);
        exit(1);
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(args: &Args) -> term::Result<()> {
    let mut game = game::SnakeGame::new(args.game_config())?;

    // The terminal has to be given back even when the game fails
    let res = game.initialize().and_then(|()| game.play());
    first_error(res, game.restore())
}

/// The game's own failure wins over a failed restore, which only gets logged.
fn first_error(res: term::Result<()>, restored: term::Result<()>) -> term::Result<()> {
    match (res, restored) {
        (Err(e), Err(restore_err)) => {
            log::error!("could not restore the terminal: {}", restore_err);
            Err(e)
        }
        (res, restored) => res.and(restored),
    }
}

/// Logs go to a file since the game owns the screen. Without one, logging
/// stays off.
fn init_logging(args: &Args) -> io::Result<()> {
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .target(Target::Pipe(Box::new(file)))
            .init();
        log::info!("logging to {}", path.display());
    }
    Ok(())
}
