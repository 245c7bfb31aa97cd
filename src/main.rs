use std::process;

use anyhow::{self, Context};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use bandunfold::interfaces::cli::{log_heading, Cli};
use bandunfold::interfaces::input::Input;
use bandunfold::interfaces::InputHandle;

/// Sets up the `bandunfold-output` logger on standard output (and the log file, if any) and the
/// diagnostic root logger on standard error.
fn init_logging(cli: &Cli) -> Result<log4rs::Handle, anyhow::Error> {
    let output = ConsoleAppender::builder()
        .target(Target::Stdout)
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    let diagnostics = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l:<5})} {t} - {m}{n}")))
        .build();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = Config::builder()
        .appender(Appender::builder().build("output", Box::new(output)))
        .appender(Appender::builder().build("diagnostics", Box::new(diagnostics)));
    let mut output_appenders = vec!["output"];
    if let Some(log_file) = cli.log_file.as_ref() {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .append(false)
            .build(log_file)
            .with_context(|| format!("Unable to open `{}` for logging", log_file.display()))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        output_appenders.push("file");
    }
    let config = builder
        .logger(
            Logger::builder()
                .appenders(output_appenders)
                .additive(false)
                .build("bandunfold-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("diagnostics").build(level))?;
    Ok(log4rs::init_config(config)?)
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
    log_heading();

    let input = match Input::from_cli(&cli) {
        Ok(input) => input,
        Err(err) => {
            log::error!("{err:#}");
            process::exit(1);
        }
    };
    // Errors are logged by the handler.
    if input.handle().is_err() {
        process::exit(1);
    }
}
