//! Punto de entrada ("driver").
//!
//! Genera una de las rutinas de [`onehash::library`] sobre los registros
//! indicados y la escribe como texto 1#.

use anyhow::Context;
use clap::{crate_version, Arg, Command};
use onehash::{
    builder::{Builder, DEFAULT_TEMP_BASE},
    encode::{assemble, EncodeOptions},
    ir::Reg,
    library::Routine,
};

use std::{
    fs::File,
    io::{BufWriter, Write},
    str::FromStr,
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("onehash")
        .version(crate_version!())
        .about("1# program generator")
        .arg(
            Arg::new("routine")
                .required(true)
                .value_name("PROGRAM")
                .possible_values(["move", "copy", "clear", "swap", "reverse"])
                .help("Routine to generate"),
        )
        .arg(
            Arg::new("registers")
                .required(true)
                .takes_value(true)
                .multiple_values(true)
                .value_name("REGISTER")
                .help("Operand registers, numbered from 1"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .default_value("-")
                .value_name("FILE")
                .help("Output file ('-' for stdout)"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Write the whole program on a single line"),
        )
        .arg(
            Arg::new("no-comments")
                .long("no-comments")
                .help("Omit comment lines"),
        )
        .arg(
            Arg::new("temps")
                .long("temps")
                .takes_value(true)
                .value_name("N")
                .help("First register used for temporaries"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .takes_value(true)
                .default_value("warn")
                .value_name("LEVEL")
                .help("Log filter, in RUST_LOG syntax"),
        )
        .get_matches();

    // La salida estándar puede ser el programa mismo
    tracing_subscriber::fmt()
        .with_env_filter(args.value_of("log-level").unwrap())
        .with_writer(std::io::stderr)
        .init();

    // Se extraen argumentos necesarios
    let routine = args.value_of("routine").unwrap();
    let routine = Routine::from_str(routine).expect("main.rs allowed a bad routine");

    let registers = args
        .values_of("registers")
        .unwrap()
        .map(|register| {
            register
                .parse()
                .map(Reg)
                .with_context(|| format!("Bad register number: {}", register))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let temps = match args.value_of("temps") {
        Some(temps) => temps
            .parse()
            .with_context(|| format!("Bad register number: {}", temps))?,
        None => DEFAULT_TEMP_BASE,
    };

    let mut options = EncodeOptions::COMMENTS;
    if args.is_present("no-comments") {
        options.remove(EncodeOptions::COMMENTS);
    }

    if args.is_present("compact") {
        options |= EncodeOptions::COMPACT;
    }

    let mut builder = Builder::with_temps(temps);
    routine
        .build(&mut builder, &registers)
        .with_context(|| format!("Failed to generate `{}`", routine))?;

    let code = builder.finish();
    match args.value_of("output").unwrap() {
        "-" => {
            let stdout = std::io::stdout();
            assemble(&code, options, &mut stdout.lock()).context("Failed to emit to stdout")?;
        }

        path => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            let mut file = BufWriter::new(file);
            assemble(&code, options, &mut file)
                .and_then(|()| file.flush().map_err(Into::into))
                .with_context(|| format!("Failed to emit to file: {}", path))?;
        }
    };

    Ok(())
}
