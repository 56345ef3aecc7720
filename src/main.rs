use std::{
    fs::{read_to_string, File},
    io::{self, BufWriter},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use log::{error, info, LevelFilter};
use vgoc::{
    compiler::emitter::{Emitter, TextEmitter},
    display_error,
    driver::{compile_source, Cli},
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let file_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.to_string_lossy().into_owned());

    let source = match read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read {}: {}", cli.input.display(), err);
            return ExitCode::from(3);
        }
    };

    let start = Instant::now();
    let output = match compile_source(&source, &file_name, &cli.options()) {
        Ok(output) => output,
        Err(diagnostics) => {
            for error in diagnostics.iter() {
                display_error(error, &source);
            }
            return ExitCode::from(diagnostics.exit_code() as u8);
        }
    };
    info!("Total time: {:?}", start.elapsed());

    if cli.dump_symbols {
        eprintln!("{}", output.scopes);
    }

    let written = match &cli.output {
        Some(path) => File::create(path)
            .and_then(|file| TextEmitter::new(BufWriter::new(file)).emit(&output.operations, &file_name)),
        None => TextEmitter::new(io::stdout().lock()).emit(&output.operations, &file_name),
    };
    if let Err(err) = written {
        error!("failed to write output: {}", err);
        return ExitCode::from(4);
    }

    ExitCode::SUCCESS
}
