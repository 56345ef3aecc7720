//! Compilation pipeline and command-line configuration.
//!
//! Runs the four passes in order. A pass only runs when every earlier
//! pass finished without diagnostics.

use std::{path::PathBuf, rc::Rc, time::Instant};

use clap::Parser as CliParser;
use log::{debug, info};

use crate::{
    ast::ast::Program,
    compiler::{compiler::generate, operation::Operation},
    errors::errors::Diagnostics,
    labels::{labeler::assign_labels, location::RegionCounters},
    lexer::lexer::tokenize,
    parser::parser::parse,
    resolver::resolver::resolve,
    symbols::symbol_table::ScopeTree,
    type_checker::type_checker::type_check,
};

/// CLI interface using clap
#[derive(CliParser, Debug)]
#[clap(name = "vgoc", about = "Middle end for a subset of Go")]
pub struct Cli {
    /// Input source file
    #[clap(value_parser)]
    pub input: PathBuf,

    /// Write the instruction listing here instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Stop each pass at its first error
    #[clap(long)]
    pub fail_fast: bool,

    /// Print the scope tree after labeling
    #[clap(long)]
    pub dump_symbols: bool,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            fail_fast: self.fail_fast,
            dump_symbols: self.dump_symbols,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Report only the first error of a pass instead of collecting them
    pub fail_fast: bool,
    pub dump_symbols: bool,
}

/// Everything a successful compilation produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub operations: Vec<Operation>,
    pub scopes: ScopeTree,
    pub counters: RegionCounters,
}

/// Runs resolution, type checking, labeling and code generation.
pub fn compile_program(program: &mut Program, options: &CompileOptions) -> Result<CompileOutput, Diagnostics> {
    let start = Instant::now();
    let mut scopes = resolve(program, options)?;
    info!("Resolved in {:?}", start.elapsed());

    let start = Instant::now();
    type_check(program, &scopes, options)?;
    info!("Type checked in {:?}", start.elapsed());

    let start = Instant::now();
    let counters = assign_labels(program, &mut scopes)?;
    info!("Labeled in {:?}", start.elapsed());

    let start = Instant::now();
    let operations = generate(program, &scopes)?;
    info!("Generated in {:?}", start.elapsed());

    debug!("{} instructions for {}", operations.len(), program.file);
    Ok(CompileOutput {
        operations,
        scopes,
        counters,
    })
}

/// Tokenizes, parses and compiles `source`, naming it `file` in diagnostics.
pub fn compile_source(source: &str, file: &str, options: &CompileOptions) -> Result<CompileOutput, Diagnostics> {
    let start = Instant::now();
    let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
    info!("Tokenized in {:?}", start.elapsed());

    let start = Instant::now();
    let mut program = parse(tokens, Rc::new(file.to_string()))?;
    info!("Parsed in {:?}", start.elapsed());

    compile_program(&mut program, options)
}
