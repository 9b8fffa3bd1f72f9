use std::{env, process::ExitCode};

use audio_engine::MidiPlayer;
use log::info;
use piano_roll::{
    Error, Result,
    cli::{self, Args, Command},
    driver::{AnimationDriver, Outcome, RenderMode},
    midi, playback,
    terminal::Terminal,
};

fn run(args: Args) -> Result<Outcome> {
    let Args { path, options } = args;
    let song = midi::load(&path)?;
    info!(
        "{}: {} notes, {:.2}s at {:.0} bpm",
        path.display(),
        song.notes().len(),
        song.duration(),
        song.bpm()
    );

    if !options.play {
        let music = options.music;
        let mut driver = AnimationDriver::new(song, options);
        let mut terminal = Terminal::inline();
        let rendered = driver.run(RenderMode::Static, &mut terminal)?;
        if !music {
            return Ok(rendered);
        }
        let Some(player) = playback::open_player(driver.song(), MidiPlayer::open) else {
            return Ok(rendered);
        };
        terminal.listen_for_keys().map_err(Error::Terminal)?;
        return playback::play_to_end(player, &mut terminal);
    }

    let clock = playback::clock_for(&song, options.music, MidiPlayer::open);
    let mut driver = AnimationDriver::new(song, options);
    let mut terminal = Terminal::fullscreen().map_err(Error::Terminal)?;
    driver.run(
        RenderMode::Animated {
            clock: Box::new(clock),
        },
        &mut terminal,
    )
}

#[expect(clippy::print_stdout, clippy::print_stderr)]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let command = match cli::parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("piano_roll: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    match command {
        Command::Help => {
            println!("{}", cli::USAGE);
            ExitCode::SUCCESS
        }
        Command::Render(args) => match run(args) {
            Ok(outcome) => {
                info!("done: {outcome:?}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("piano_roll: {e}");
                ExitCode::from(e.exit_code())
            }
        },
    }
}
