use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use ipsnect::{BinarySource, RenderError, ReportOptions};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

/// Inspect the contents of IPS files, the binary patching format
#[derive(Parser)]
#[command(
    name = "ipsnect",
    version,
    about,
    long_about = "The ipsnect utility allows you to inspect the contents of IPS files, \
                  the binary patching format.\n\
                  You can also use it to see exactly how it will modify a specific binary file.",
    disable_version_flag = true
)]
struct Cli {
    /// IPS patch file
    ips: PathBuf,

    /// Binary file to compare against
    bin: Option<PathBuf>,

    /// Number of bytes of context to show before each hunk
    #[arg(short = 'a', long = "before", value_name = "BYTES")]
    before: Option<usize>,

    /// Number of bytes of context to show after each hunk
    #[arg(short = 'b', long = "after", value_name = "BYTES")]
    after: Option<usize>,

    /// Number of bytes of context to show around each hunk
    #[arg(short = 'c', long = "context", value_name = "BYTES")]
    context: Option<usize>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log parsing and rendering details to stderr
    #[arg(long)]
    verbose: bool,

    /// Show the version number
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Resolve context sizes. When `-c` and `-a`/`-b` both set a side, the
    /// one given first on the command line wins.
    fn report_options(&self, matches: &ArgMatches) -> ReportOptions {
        ReportOptions {
            pre_context: first_given(matches, "before", self.before, self.context),
            post_context: first_given(matches, "after", self.after, self.context),
        }
    }
}

fn first_given(
    matches: &ArgMatches,
    id: &str,
    side: Option<usize>,
    context: Option<usize>,
) -> usize {
    match (side, context) {
        (Some(side), Some(context)) => {
            if matches.index_of(id) < matches.index_of("context") {
                side
            } else {
                context
            }
        }
        (side, context) => side.or(context).unwrap_or(0),
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let patch_file = match File::open(&cli.ips) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error reading '{}': {}", cli.ips.display(), e);
            process::exit(1);
        }
    };

    let patch = match ipsnect::parse_patch(BufReader::new(patch_file)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", cli.ips.display(), e);
            process::exit(1);
        }
    };
    log::info!(
        "parsed {} hunks from '{}'",
        patch.hunks.len(),
        cli.ips.display()
    );

    let mut original = match &cli.bin {
        Some(path) => match File::open(path) {
            Ok(f) => Some(BufReader::new(f)),
            Err(e) => {
                let err = RenderError::StreamUnavailable {
                    reason: e.to_string(),
                };
                eprintln!("Error opening '{}': {}", path.display(), err);
                process::exit(1);
            }
        },
        None => None,
    };

    let options = cli.report_options(&matches);

    let result = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(f) => write_report(&patch, BufWriter::new(f), original.as_mut(), &options),
            Err(e) => {
                eprintln!("Error writing '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => write_report(&patch, io::stdout().lock(), original.as_mut(), &options),
    };

    if let Err(e) = result {
        match (&e, &cli.bin) {
            (RenderError::StreamUnavailable { .. }, Some(path)) => {
                eprintln!("Error reading '{}': {}", path.display(), e)
            }
            _ => eprintln!("Error: {e}"),
        }
        process::exit(1);
    }
}

fn write_report<W: Write>(
    patch: &ipsnect::PatchFile,
    mut out: W,
    original: Option<&mut BufReader<File>>,
    options: &ReportOptions,
) -> Result<(), RenderError> {
    let original = original.map(|f| f as &mut dyn BinarySource);
    ipsnect::render_report(patch, &mut out, original, options)?;
    out.flush()?;
    Ok(())
}
