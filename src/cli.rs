// File: ./src/cli.rs
//! Command-line parsing and help text shared by the binary.
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build lookups, enhance, split, validate, report.
    Run,
    /// Split an existing enhanced calendar.
    Split,
    /// Check a calendar file; the enhanced one when no path is given.
    Validate(Option<PathBuf>),
    /// Write a default `shichen.toml`.
    Init,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub root: Option<PathBuf>,
    pub markers_only: bool,
    pub verbose: bool,
}

/// Parses the arguments following the binary name.
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut command = None;
    let mut root = None;
    let mut markers_only = false;
    let mut verbose = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => command = Some(Command::Help),
            "-r" | "--root" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a directory", arg))?;
                root = Some(PathBuf::from(value));
            }
            "--markers-only" => markers_only = true,
            "-v" | "--verbose" => verbose = true,
            "run" | "split" | "validate" | "init" if command.is_none() => {
                command = Some(match arg.as_str() {
                    "run" => Command::Run,
                    "split" => Command::Split,
                    "init" => Command::Init,
                    _ => Command::Validate(None),
                });
            }
            other if other.starts_with('-') => anyhow::bail!("Unknown option: {}", other),
            other => match &mut command {
                Some(Command::Validate(path @ None)) => *path = Some(PathBuf::from(other)),
                _ => anyhow::bail!("Unexpected argument: {}", other),
            },
        }
    }

    Ok(Invocation {
        command: command.unwrap_or(Command::Run),
        root,
        markers_only,
        verbose,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Shichen v{} - Mark two-hour stem-branch events as auspicious or inauspicious",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [run] [--root <path>] [--markers-only]", binary_name);
    println!("    {} split [--root <path>]", binary_name);
    println!("    {} validate [file.ics] [--root <path>]", binary_name);
    println!("    {} init [--root <path>]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("COMMANDS:");
    println!("    run               Enhance the hour calendar and split it (default)");
    println!("    split             Split an existing enhanced calendar by 吉/凶");
    println!("    validate          Check BEGIN/END balance of a calendar file");
    println!("    init              Write a default shichen.toml to the working directory");
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Working directory holding the calendars.");
    println!("    --markers-only        Only add 吉/凶 markers, skip Pengzu taboos.");
    println!("    -v, --verbose         Debug logging.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("FILES (working directory, override in shichen.toml):");
    println!("    good_bad_time.ics                 Daily 吉/凶 per hour");
    println!("    pengzu_100_taboos.ics             Daily Pengzu taboos");
    println!("    cal_trunkBranch.ics               Two-hour stem-branch events");
    println!("    cal_trunkBranch_enhanced.ics      Output: all events, annotated");
    println!("    cal_trunkBranch_auspicious.ics    Output: 吉 events");
    println!("    cal_trunkBranch_inauspicious.ics  Output: 凶 events");
    println!("    enhancement_log.txt               Output: run report");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults_to_run() {
        let inv = parse(&[]).unwrap();
        assert_eq!(inv.command, Command::Run);
        assert_eq!(inv.root, None);
        assert!(!inv.markers_only);
        assert!(!inv.verbose);
    }

    #[test]
    fn test_flags_and_commands() {
        let inv = parse(&["split", "--root", "/tmp/cal", "-v"]).unwrap();
        assert_eq!(inv.command, Command::Split);
        assert_eq!(inv.root, Some(PathBuf::from("/tmp/cal")));
        assert!(inv.verbose);

        let inv = parse(&["--markers-only", "run"]).unwrap();
        assert_eq!(inv.command, Command::Run);
        assert!(inv.markers_only);

        assert_eq!(parse(&["-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["init"]).unwrap().command, Command::Init);
    }

    #[test]
    fn test_validate_takes_optional_file() {
        assert_eq!(
            parse(&["validate"]).unwrap().command,
            Command::Validate(None)
        );
        assert_eq!(
            parse(&["validate", "out.ics"]).unwrap().command,
            Command::Validate(Some(PathBuf::from("out.ics")))
        );
        assert!(parse(&["validate", "a.ics", "b.ics"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_input() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--root"]).is_err());
        assert!(parse(&["run", "extra"]).is_err());
    }
}
