// Copyright (c) 2016-2020 Fabian Schuiki

//! A compiler front end for a Pascal subset.

#[macro_use]
extern crate log;

use anyhow::{anyhow, Context};
use clap::{App, Arg, ArgMatches};
use pasc::errors::DiagCollector;
use pasc::source::get_source_manager;
use pasc::syntax::lexer::Lexer;
use pasc::syntax::pascal;
use pasc::{Session, Verbosity};

fn main() -> anyhow::Result<()> {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("A compiler front end for a Pascal subset.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all log output"),
        )
        .arg(
            Arg::with_name("verbosity-opts")
                .short("V")
                .help("Print internal compiler state")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .possible_values(&["tokens", "sets", "table", "ast"]),
        )
        .arg(
            Arg::with_name("check")
                .long("check")
                .help("Only report diagnostics, print nothing else"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The input files to compile")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger. `RUST_LOG` refines the level picked here.
    let level = if matches.is_present("quiet") {
        log::LevelFilter::Off
    } else {
        match matches.occurrences_of("verbosity") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    // Configure the session.
    let mut session = Session::new();
    session.opts.check_only = matches.is_present("check");
    for v in matches
        .values_of("verbosity-opts")
        .into_iter()
        .flat_map(|v| v)
    {
        session.opts.verbosity |= match v {
            "tokens" => Verbosity::TOKENS,
            "sets" => Verbosity::SETS,
            "table" => Verbosity::TABLE,
            "ast" => Verbosity::AST,
            _ => unreachable!(),
        };
    }

    if !compile(&session, &matches)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Parse every input file. Returns whether all files parsed without errors.
fn compile(sess: &Session, matches: &ArgMatches) -> anyhow::Result<bool> {
    let dump = |verb| !sess.opts.check_only && sess.has_verbosity(verb);
    let parser = pascal::parser()?;

    if dump(Verbosity::SETS) {
        println!("{}", parser.grammar());
        println!("{}", parser.analysis());
    }
    if dump(Verbosity::TABLE) {
        println!("{}", parser.table().display(parser.grammar()));
        parser.report_collisions(sess);
    }

    let mut failed = false;
    for filename in matches.values_of("INPUT").into_iter().flat_map(|v| v) {
        let source = get_source_manager()
            .open(filename)
            .ok_or_else(|| anyhow!("unable to open input file `{}`", filename))?;

        if dump(Verbosity::TOKENS) {
            // Scanner diagnostics are reported by the parse below.
            let ignored = DiagCollector::new();
            for token in Lexer::new(source, &ignored).collect_tokens() {
                println!("{:?} {:?}", token.span, token);
            }
        }

        let parsed = pascal::parse(source, sess)
            .with_context(|| format!("failed to parse `{}`", filename))?;
        debug!(
            "Parsed {}: {} syntax errors, {} error markers",
            filename,
            parsed.syntax_errors,
            parsed.error_count()
        );
        if parsed.exhausted {
            warn!("Recovery in {} consumed the rest of the input", filename);
            failed = true;
        }
        if dump(Verbosity::AST) {
            match parsed.program {
                Ok(ref program) => println!("{:#?}", program),
                Err(ref marker) => println!("{}", marker),
            }
        }
    }

    Ok(!failed && !sess.failed())
}
