use std::path::PathBuf;

use transport::Resolution;

use crate::{
    error::{Error, Result},
    options::DisplayOptions,
};

pub const USAGE: &str = "\
usage: piano_roll <file-path> [-c|--color] [-b|--border] [-k|--keyboard] [-m|--music] [-p|--play] [-r|--resolution N]

Display a piano roll from a MIDI file and optionally play music.

  -p, --play            animate the piano roll as it scrolls through the notes
  -k, --keyboard        draw a keyboard beside the pitch lanes
  -c, --color           color notes by pitch class
  -b, --border          draw a border around the piano roll
  -m, --music           play the file alongside the animation
  -r, --resolution N    time steps per second, an even number from 2 to 100 (default 10)
  -h, --help            print this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub path: PathBuf,
    pub options: DisplayOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Render(Args),
    Help,
}

fn usage(message: impl Into<String>) -> Error {
    Error::Usage(format!("{}\n\n{USAGE}", message.into()))
}

fn resolution(value: Option<String>) -> Result<Resolution> {
    let value = value.ok_or_else(|| usage("option -r/--resolution needs a value"))?;
    let steps: i64 = value
        .parse()
        .map_err(|_| usage(format!("resolution must be an integer, got '{value}'")))?;
    Ok(Resolution::new(steps)?)
}

/// Parse the arguments after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut args = args.into_iter();
    let mut options = DisplayOptions::default();
    let mut path = None;

    while let Some(arg) = args.next() {
        if let Some(long) = arg.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_owned())),
                None => (long, None),
            };
            match name {
                "play" => options.play = true,
                "keyboard" => options.keyboard = true,
                "color" => options.color = true,
                "border" => options.border = true,
                "music" => options.music = true,
                "resolution" => {
                    options.resolution = resolution(inline_value.or_else(|| args.next()))?;
                }
                "help" => return Ok(Command::Help),
                _ => return Err(usage(format!("unknown option '--{name}'"))),
            }
        } else if let Some(flags) = arg.strip_prefix('-').filter(|flags| !flags.is_empty()) {
            // short flags may be clustered, as in `-pkc` or `-r8`
            for (at, flag) in flags.char_indices() {
                match flag {
                    'p' => options.play = true,
                    'k' => options.keyboard = true,
                    'c' => options.color = true,
                    'b' => options.border = true,
                    'm' => options.music = true,
                    'r' => {
                        let rest = &flags[at + 1..];
                        let value = if rest.is_empty() {
                            args.next()
                        } else {
                            Some(rest.trim_start_matches('=').to_owned())
                        };
                        options.resolution = resolution(value)?;
                        break;
                    }
                    'h' => return Ok(Command::Help),
                    _ => return Err(usage(format!("unknown option '-{flag}'"))),
                }
            }
        } else if path.is_none() {
            path = Some(PathBuf::from(arg));
        } else {
            return Err(usage(format!("unexpected argument '{arg}'")));
        }
    }

    let path = path.ok_or_else(|| usage("missing MIDI file path"))?;
    Ok(Command::Render(Args { path, options }))
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        parse_args(args.iter().map(|arg| (*arg).to_owned()))
    }

    fn options(args: &[&str]) -> DisplayOptions {
        match parse(args).unwrap() {
            Command::Render(args) => args.options,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_defaults() {
        let Command::Render(args) = parse(&["song.mid"]).unwrap() else {
            panic!("expected render");
        };
        assert_eq!(args.path, PathBuf::from("song.mid"));
        assert_eq!(args.options, DisplayOptions::default());
        assert_eq!(args.options.resolution.get(), 10);
    }

    #[test]
    fn test_long_and_short_flags() {
        let long = options(&["--play", "song.mid", "--keyboard", "--color", "--border", "--music"]);
        let short = options(&["-p", "song.mid", "-k", "-c", "-b", "-m"]);
        let clustered = options(&["-pkcbm", "song.mid"]);

        assert!(long.play && long.keyboard && long.color && long.border && long.music);
        assert_eq!(long, short);
        assert_eq!(long, clustered);
    }

    #[test]
    fn test_resolution_forms() {
        for args in [
            vec!["song.mid", "-r", "4"],
            vec!["song.mid", "-r4"],
            vec!["song.mid", "--resolution", "4"],
            vec!["song.mid", "--resolution=4"],
            vec!["-pr", "4", "song.mid"],
        ] {
            assert_eq!(options(&args).resolution.get(), 4, "{args:?}");
        }
    }

    #[test]
    fn test_invalid_resolutions() {
        for bad in ["7", "0", "-2", "102", "2000000000"] {
            assert!(
                matches!(
                    parse(&["song.mid", "--resolution", bad]),
                    Err(Error::InvalidResolution(_))
                ),
                "resolution {bad}"
            );
        }
        assert!(matches!(parse(&["song.mid", "-r", "ten"]), Err(Error::Usage(_))));
        assert!(matches!(parse(&["song.mid", "-r"]), Err(Error::Usage(_))));
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(parse(&[]), Err(Error::Usage(_))));
        assert!(matches!(parse(&["a.mid", "b.mid"]), Err(Error::Usage(_))));
        assert!(matches!(parse(&["a.mid", "-x"]), Err(Error::Usage(_))));
        assert!(matches!(parse(&["a.mid", "--loud"]), Err(Error::Usage(_))));
        assert_eq!(parse(&["a.mid", "--loud"]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["song.mid", "--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_lone_dash_is_a_path() {
        let Command::Render(args) = parse(&["-"]).unwrap() else {
            panic!("expected render");
        };
        assert_eq!(args.path, PathBuf::from("-"));
    }
}
