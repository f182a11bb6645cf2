//! This is the command line tool that reads an input file (or stdin) and
//! either compresses or decompresses it with brotli.

extern crate clap;
extern crate env_logger;
extern crate log;

use anyhow::{anyhow, Context};
use bro::adaptive::AdaptiveDecompressor;
use bro::{Binding, CompressionParameters, Mode};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use std::fs::{self, File};
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

/// The settings collected from the command line.
#[derive(Debug)]
struct Options {
    decompress: bool,
    force: bool,
    transform: bool,
    mode: Mode,
    input: Option<String>,
    output: Option<String>,
    /// The expected decompressed length, if known.
    length: Option<usize>,
    /// The largest buffer to try when the length is unknown.
    bufsize: usize,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Self {
        let mode = match matches
            .get_one::<String>("mode")
            .map(|m| m.to_lowercase())
            .as_deref()
        {
            Some("font") => Mode::Font,
            _ => Mode::Text,
        };
        Self {
            decompress: matches.get_flag("decompress"),
            force: matches.get_flag("force"),
            transform: matches.get_flag("transform"),
            mode,
            input: matches.get_one::<String>("input").cloned(),
            output: matches.get_one::<String>("output").cloned(),
            length: matches.get_one::<usize>("length").copied(),
            bufsize: matches
                .get_one::<usize>("bufsize")
                .copied()
                .unwrap_or(bro::Config::global().growth.max_size),
        }
    }
}

fn command() -> Command {
    Command::new("bro")
        .version(bro::version())
        .about("Compression/decompression utility using the Brotli algorithm")
        .arg(
            Arg::new("decompress")
                .short('d')
                .long("decompress")
                .help("Decompress the input instead of compressing it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Path of the input file (default: stdin)")
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the output file (default: stdout)")
                .num_args(1),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite the output file if it exists")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("The kind of data being compressed")
                .value_parser(["text", "font"])
                .ignore_case(true)
                .num_args(1),
        )
        .arg(
            Arg::new("transform")
                .short('t')
                .long("transform")
                .help("Accepted for compatibility, has no effect")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("length")
                .short('l')
                .long("length")
                .value_name("BYTES")
                .help("The expected decompressed length")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            Arg::new("bufsize")
                .short('b')
                .long("bufsize")
                .value_name("BYTES")
                .help("Largest buffer to try when the length is unknown")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
}

/// Print the usage line and exit with an error.
fn usage() -> ! {
    eprintln!("{}", command().render_usage());
    process::exit(1);
}

fn read_input(options: &Options) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    match &options.input {
        Some(path) => {
            File::open(path)
                .and_then(|mut f| f.read_to_end(&mut data))
                .with_context(|| format!("Can't read {}", path))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .context("Can't read stdin")?;
        }
    }
    Ok(data)
}

fn write_output(options: &Options, data: &[u8]) -> anyhow::Result<()> {
    match &options.output {
        Some(path) => {
            let mut f = File::create(path)
                .with_context(|| format!("Can't create {}", path))?;
            if let Err(e) = f.write_all(data).and_then(|_| f.flush()) {
                drop(f);
                // Don't leave a truncated file behind.
                if Path::new(path).is_file() {
                    let _ = fs::remove_file(path);
                }
                return Err(e)
                    .with_context(|| format!("Unable to write {}", path));
            }
            log::info!("Wrote {}.", path);
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(data).context("Unable to write stdout")?;
            out.flush().context("Unable to write stdout")?;
        }
    }
    Ok(())
}

fn process_buffer(options: &Options, input: &[u8]) -> bro::Result<Vec<u8>> {
    let binding = Binding::new();

    if options.decompress {
        let strategy =
            AdaptiveDecompressor::new(&binding).with_max_size(options.bufsize);
        let recovered = strategy.run(input, options.length)?;
        log::info!(
            "Decompressed from {} to {} bytes in {} attempt(s).",
            input.len(),
            recovered.data.len(),
            recovered.attempts
        );
        return Ok(recovered.data);
    }

    if options.transform {
        log::warn!("The transform flag is ignored by this codec");
    }
    let params = CompressionParameters::default().with_mode(options.mode);
    let compressed = binding.compress(input, &params)?;
    log::info!(
        "Compressed from {} to {} bytes.",
        input.len(),
        compressed.len()
    );
    if !compressed.is_empty() {
        log::info!(
            "Compression ratio is {:.4}x.",
            input.len() as f64 / compressed.len() as f64
        );
    }
    Ok(compressed)
}

fn run(options: &Options) -> anyhow::Result<()> {
    if let Some(path) = &options.input {
        if !Path::new(path).is_file() {
            return Err(anyhow!("file \"{}\" not found", path));
        }
    } else if io::stdin().is_terminal() {
        // Interactive console with nothing redirected.
        usage();
    }

    if let Some(path) = &options.output {
        if Path::new(path).is_file() && !options.force {
            return Err(anyhow!("output file exists"));
        }
    }

    let input = read_input(options)?;
    let _timer = Timer::new();

    let output = process_buffer(options, &input).map_err(|e| {
        let source = options.input.as_deref().unwrap_or("stdin");
        anyhow!("[ERROR] {}: {}", e, source)
    })?;

    write_output(options, &output)
}

fn main() {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        // Help and version requests exit successfully.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };
    env_logger::builder().format_timestamp(None).init();

    let options = Options::from_matches(&matches);
    log::debug!("{:?}", options);

    if let Err(e) = run(&options) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}
