use anyhow::Result;
use log::LevelFilter;
use shichen::calendar;
use shichen::cli::{self, Command};
use shichen::config::Config;
use shichen::context::{AppContext, StandardContext};
use shichen::controller::Pipeline;
use shichen::model::EnrichMode;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::env;

fn main() -> Result<()> {
    let mut args = env::args();
    let binary_name = args.next().unwrap_or_else(|| "shichen".to_string());
    let invocation = cli::parse_args(args)?;

    if invocation.command == Command::Help {
        cli::print_help(&binary_name);
        return Ok(());
    }

    let ctx = StandardContext::new(invocation.root.clone());
    let mut config = Config::load(&ctx)?;
    if invocation.markers_only {
        config.mode = EnrichMode::MarkersOnly;
    }

    let level = if invocation.verbose {
        LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    init_logging(level);

    let pipeline = Pipeline::new(&ctx, &config);
    match invocation.command {
        Command::Run => {
            let report = pipeline.run()?;
            println!();
            print!("{}", report.render(config.max_warnings_shown));
        }
        Command::Split => {
            let summary = pipeline.split()?;
            println!();
            print!("{}", summary.render());
        }
        Command::Validate(file) => {
            let (path, checks) = pipeline.validate_file(file.as_deref())?;
            println!("Validation of {}:", path.display());
            for check in &checks {
                let status = if check.passed { "PASS" } else { "FAIL" };
                println!("  {}: {}", check.name, status);
            }
            if !calendar::all_passed(&checks) {
                anyhow::bail!("{} is not a well-formed calendar", path.display());
            }
        }
        Command::Init => {
            let path = ctx.get_local_config_path()?;
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            Config::default().save(&ctx)?;
            println!("Wrote {}", path.display());
        }
        Command::Help => cli::print_help(&binary_name),
    }

    Ok(())
}

fn init_logging(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Only fails if a logger is already set.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}
