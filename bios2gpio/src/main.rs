use bios2gpio::calibrate::calibrate;
use bios2gpio::detector::{detect_tables, TableCandidate};
use bios2gpio::reference::ReferenceHeader;
use bios2gpio::{extractor, modules, report};
use bios2gpio::{Error, ErrorKind, Result};
use clap::Parser;
use extractor_bridge::{VolumeUnpacker, WorkDir};
use log::{error, info, warn};
use pad_types::{alderlake, PlatformProfile};
use std::path::PathBuf;

/// Extract GPIO pad configuration tables from vendor BIOS images.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Target platform profile
    #[arg(long, default_value = "alderlake")]
    platform: String,
    /// Vendor BIOS image (full SPI dump, descriptor-formatted)
    #[arg(short, long)]
    input: PathBuf,
    /// Write a coreboot gpio.h to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write the machine-readable report to this path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Working directory for extraction (temporary if omitted)
    #[arg(short, long)]
    work_dir: Option<PathBuf>,
    /// Minimum run length the VGPIO scan considers
    #[arg(long, default_value_t = 10)]
    min_entries: usize,
    /// Reference gpio.h used to score candidate tables
    #[arg(long)]
    calibrate_with: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if args.verbose { "debug" } else { "info" },
    ))
    .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

fn lookup_profile(tag: &str) -> Result<PlatformProfile> {
    match tag {
        "alderlake" => Ok(alderlake::profile()),
        other => Err(ErrorKind::UnsupportedPlatform(other.to_string()).into()),
    }
}

fn run(args: &Args) -> Result<()> {
    let profile = lookup_profile(&args.platform)?;

    if !args.input.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", args.input.display()),
        )
        .into());
    }

    info!(
        "bios2gpio - extracting GPIO configuration from {:?} (platform '{}')",
        args.input, profile.name
    );

    let work_dir = WorkDir::new(args.work_dir.as_deref())?;

    // stage A: region extraction
    let region = extractor::extract_bios_region(&args.input, &profile, work_dir.path())?;

    // stage B: module enumeration; a missing unpacker degrades to the raw
    // region span
    let dump_root = match VolumeUnpacker::locate() {
        Some(unpacker) => match unpacker.unpack(&region.path) {
            Ok(root) => Some(root),
            Err(e) => {
                warn!("Volume unpack failed ({}); scanning the raw region only", e);
                None
            }
        },
        None => None,
    };
    let spans = modules::enumerate_spans(region.data, dump_root.as_deref(), &profile)?;

    // stage C+D: detection with semantic validation
    let mut candidates: Vec<TableCandidate> = Vec::new();
    for span in &spans {
        candidates.extend(detect_tables(&span.name, &span.data, &profile, args.min_entries));
    }
    info!("Detection produced {} candidate table(s)", candidates.len());

    // stage E: calibration and selection
    let reference = match &args.calibrate_with {
        Some(path) => Some(ReferenceHeader::parse_file(path)?),
        None => None,
    };
    let selection = calibrate(candidates, &profile, reference.as_ref());

    if !selection.has_physical() {
        // partial results are still emitted; the condition is reported but
        // does not fail the invocation
        error!("{}", Error::from(ErrorKind::NoPhysicalTableFound));
    }

    let source = args.input.display().to_string();
    let report = report::build_report(&source, &profile, &selection);
    for table in &report.tables {
        info!(
            "{}: {} entries of {} bytes at {} in '{}'",
            table.classification, table.entry_count, table.entry_size, table.offset, table.span
        );
    }

    if let Some(path) = &args.json {
        report::write_json(&report, path)?;
    }
    if let Some(path) = &args.output {
        report::write_coreboot_header(&source, &profile, &selection, path)?;
    }

    Ok(())
}
