
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate regex;
extern crate term_grid;
extern crate thiserror;

pub mod parse;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::File;
use std::io::{Read, Write};

use parse::parser::Parser;
use parse::scanner::Scanner;

// Exit codes shared with the rest of the toolchain. Lexical and
// syntactic failures use the parse module's own class (21).
const ERROR_PARAM: i32 = 10;
const ERROR_FILE_IN: i32 = 11;
const ERROR_FILE_OUT: i32 = 12;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tStats: {}\n\tOutfile: {}\n\tInfile: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.value_of("stats").unwrap_or("None"),
        args.value_of("output").unwrap_or("STDOUT"),
        args.value_of("INPUT").unwrap_or("STDIN")
    );

    // The stats flags only make sense together.
    if args.value_of("stats").is_none() && (args.is_present("loc") || args.is_present("comments")) {
        error!("fatal: --loc and --comments require --stats");
        std::process::exit(ERROR_PARAM);
    }
    if args.value_of("stats").is_some() && !args.is_present("loc") && !args.is_present("comments") {
        error!("fatal: --stats requires at least one of --loc or --comments");
        std::process::exit(ERROR_PARAM);
    }

    let source = read_source(&args);

    let mut parser = Parser::new(Scanner::new(&source));
    let program = match parser.run() {
        Ok(program) => program,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(err.exit_code());
        }
    };

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for ins in program.instructions.iter() {
            grid.add(Cell::from(format!("{}:", ins.order)));
            grid.add(Cell::from(ins.opcode.to_string()));
            grid.add(Cell::from(
                ins.operands.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(" ")
            ));
        }

        println!("{}", grid.fit_into_columns(3));
    }

    if let Some(path) = args.value_of("stats") {
        let mut content = String::new();
        if args.is_present("loc") {
            content.push_str(&format!("{}\n", parser.instruction_count()));
        }
        if args.is_present("comments") {
            content.push_str(&format!("{}\n", parser.comment_count()));
        }

        if let Err(err) = std::fs::write(path, content) {
            error!("fatal: unable to write stats file `{}`: {}", path, err);
            std::process::exit(ERROR_FILE_OUT);
        }
    }

    let xml = program.to_xml();
    match args.value_of("output") {
        Some(path) => {
            let mut ofile = match File::create(path) {
                Err(err) => {
                    error!("fatal: unable to open output file `{}`: {}", path, err);
                    std::process::exit(ERROR_FILE_OUT);
                },
                Ok(file) => file,
            };
            if let Err(err) = ofile.write_all(xml.as_bytes()) {
                error!("fatal: unable to write to output file `{}`: {}", path, err);
                std::process::exit(ERROR_FILE_OUT);
            }
        }
        None => print!("{}", xml),
    }
}

/// Reads the whole source, from the input file when one was given and from
/// STDIN otherwise.
fn read_source(args: &ArgMatches) -> String {
    let mut source = String::new();

    match args.value_of("INPUT") {
        Some(path) => {
            let mut ifile = match File::open(path) {
                Err(err) => {
                    error!("fatal: unable to open input file `{}`: {}", path, err);
                    std::process::exit(ERROR_FILE_IN);
                },
                Ok(file) => file,
            };
            if let Err(err) = ifile.read_to_string(&mut source) {
                error!("fatal: unable to read input file `{}`: {}", path, err);
                std::process::exit(ERROR_FILE_IN);
            }
        }
        None => {
            if let Err(err) = std::io::stdin().read_to_string(&mut source) {
                error!("fatal: unable to read STDIN: {}", err);
                std::process::exit(ERROR_FILE_IN);
            }
        }
    }

    source
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use; reads STDIN when omitted")
            .required(false)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write the XML to an outfile instead of STDOUT"))
        .arg(Arg::with_name("stats")
            .long("stats")
            .takes_value(true)
            .help("write parse statistics to the given file"))
        .arg(Arg::with_name("loc")
            .long("loc")
            .takes_value(false)
            .help("include the instruction count in the stats file"))
        .arg(Arg::with_name("comments")
            .long("comments")
            .takes_value(false)
            .help("include the comment count in the stats file"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the parsed instruction listing to STDOUT"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        // Diagnostics go to stderr; STDOUT carries only the XML.
        .chain(std::io::stderr())
        .apply().ok();
}
