//! squitter: decode Mode S extended squitters and measure position distances.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use comfy_table::{Cell, Table};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use squitter_core::{hex_encode, icao_to_string, DecodedReply, ModeSReply, Position, Reply};

mod config;
mod error;

use crate::config::Config;
use crate::error::CliError;

const METERS_PER_NM: f64 = 1852.0;

#[derive(Parser)]
#[command(name = "squitter", version, about = "Mode S extended squitter decoder")]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.squitter/config.yaml)
    #[arg(long, env = "SQUITTER_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode hex frames and print their extended squitter fields
    Decode {
        /// Hex frames; read from --file or stdin when omitted
        frames: Vec<String>,

        /// File containing hex frames, one per line ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Emit one JSON object per frame instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Distance between two positions given as LAT,LON[,ALT_FT]
    Distance {
        /// Target position
        #[arg(long, allow_hyphen_values = true)]
        to: String,

        /// Origin position (default: configured receiver)
        #[arg(long, allow_hyphen_values = true)]
        from: Option<String>,
    },

    /// Show the configuration, or store the receiver position
    Config {
        /// Receiver position to store
        #[arg(
            long,
            num_args = 2..=3,
            value_names = ["LAT", "LON", "ALT_FT"],
            allow_negative_numbers = true
        )]
        set_receiver: Option<Vec<f64>>,

        /// Receiver name to store alongside the position
        #[arg(long, requires = "set_receiver")]
        name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(config::default_config_file);
    let config = config::load_config(&config_path);
    debug!(path = %config_path.display(), "loaded config");

    let result = match cli.command {
        Commands::Decode { frames, file, json } => cmd_decode(frames, file, json),
        Commands::Distance { to, from } => cmd_distance(&to, from.as_deref(), &config),
        Commands::Config { set_receiver, name } => {
            cmd_config(config, &config_path, set_receiver, name)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum FrameStatus {
    Decoded,
    Skipped,
    Invalid,
}

/// One output line of `squitter decode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct FrameRow {
    frame: String,
    status: FrameStatus,
    df: Option<u8>,
    icao: Option<String>,
    capability: Option<u8>,
    type_code: Option<u8>,
    me: Option<String>,
    crc_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FrameRow {
    fn new(frame: &str, status: FrameStatus) -> Self {
        FrameRow {
            frame: frame.to_uppercase(),
            status,
            df: None,
            icao: None,
            capability: None,
            type_code: None,
            me: None,
            crc_ok: None,
            error: None,
        }
    }
}

/// Strip AVR framing (`*...;`, `@<timestamp>...;`) and trailing `;ts` fields.
///
/// Returns `None` for blank lines and `#` comments.
fn clean_frame(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.split_once(';').map_or(line, |(hex, _)| hex);
    let line = match line.strip_prefix('@') {
        // 48-bit receiver timestamp precedes the frame
        Some(rest) => rest.get(12..)?,
        None => line.strip_prefix('*').unwrap_or(line),
    };

    let line = line.trim();
    (!line.is_empty()).then_some(line)
}

fn decode_frame(hex: &str) -> FrameRow {
    let reply = match ModeSReply::from_hex(hex) {
        Ok(reply) => reply,
        Err(e) => {
            debug!(frame = hex, error = %e, "invalid frame");
            let mut row = FrameRow::new(hex, FrameStatus::Invalid);
            row.error = Some(e.to_string());
            return row;
        }
    };

    let crc_ok = reply.check_parity();
    let df = reply.downlink_format();

    match DecodedReply::from(reply) {
        DecodedReply::ExtendedSquitter(es) => {
            let mut row = FrameRow::new(hex, FrameStatus::Decoded);
            row.df = Some(df);
            row.icao = Some(icao_to_string(&es.address()));
            row.capability = Some(es.capability());
            row.type_code = Some(es.format_type_code());
            row.me = Some(hex_encode(es.message()));
            row.crc_ok = Some(crc_ok);
            row
        }
        DecodedReply::Other(other) => {
            let mut row = FrameRow::new(hex, FrameStatus::Skipped);
            row.df = Some(df);
            row.error = Some(format!("{} (DF{df})", other.df_name()));
            row
        }
    }
}

fn read_input(frames: Vec<String>, file: Option<PathBuf>) -> Result<Vec<String>, CliError> {
    if !frames.is_empty() {
        return Ok(frames);
    }
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                CliError::Io(io::Error::new(e.kind(), format!("{}: {e}", path.display())))
            })?;
            Ok(text.lines().map(String::from).collect())
        }
        _ => Ok(io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?),
    }
}

fn cmd_decode(frames: Vec<String>, file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let lines = read_input(frames, file)?;
    let rows: Vec<FrameRow> = lines
        .iter()
        .filter_map(|line| clean_frame(line))
        .map(decode_frame)
        .collect();

    if json {
        for row in &rows {
            match serde_json::to_string(row) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("Error: cannot serialize {}: {e}", row.frame),
            }
        }
    } else {
        println!("{}", render_table(&rows));
    }

    let count = |status: FrameStatus| rows.iter().filter(|r| r.status == status).count();
    let (decoded, skipped, invalid) = (
        count(FrameStatus::Decoded),
        count(FrameStatus::Skipped),
        count(FrameStatus::Invalid),
    );
    info!(decoded, skipped, invalid, "decode finished");
    eprintln!(
        "{} frames: {decoded} decoded, {skipped} skipped, {invalid} invalid",
        rows.len()
    );
    Ok(())
}

fn render_table(rows: &[FrameRow]) -> Table {
    fn opt<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|v| v.to_string()).unwrap_or("-".into())
    }

    let mut table = Table::new();
    table.set_header(vec!["Frame", "DF", "ICAO", "CA", "TC", "ME", "CRC", "Note"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.frame),
            Cell::new(opt(&row.df)),
            Cell::new(opt(&row.icao)),
            Cell::new(opt(&row.capability)),
            Cell::new(opt(&row.type_code)),
            Cell::new(opt(&row.me)),
            Cell::new(match row.crc_ok {
                Some(true) => "ok",
                Some(false) => "FAIL",
                None => "-",
            }),
            Cell::new(row.error.as_deref().unwrap_or("")),
        ]);
    }
    table
}

// ---------------------------------------------------------------------------
// distance
// ---------------------------------------------------------------------------

/// Parse `LAT,LON` or `LAT,LON,ALT_FT`.
fn parse_point(text: &str) -> Result<Position, CliError> {
    let invalid = || CliError::InvalidPoint(text.to_string());

    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    let (lat, lon, alt) = match values.as_slice() {
        [lat, lon] => (*lat, *lon, None),
        [lat, lon, alt] => (*lat, *lon, Some(*alt)),
        _ => return Err(invalid()),
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok(Position::from_parts(Some(lon), Some(lat), alt))
}

fn format_distance(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format!(
            "{m:.1} m ({:.3} km, {:.2} nm)",
            m / 1000.0,
            m / METERS_PER_NM
        ),
        None => "n/a".into(),
    }
}

fn cmd_distance(to: &str, from: Option<&str>, config: &Config) -> Result<(), CliError> {
    let target = parse_point(to)?;
    let origin = match from {
        Some(text) => parse_point(text)?,
        None => config.receiver.position().ok_or(CliError::NoOrigin)?,
    };

    println!("From:          {origin}");
    println!("To:            {target}");
    println!("Great-circle:  {}", format_distance(origin.haversine(&target)));
    println!(
        "3D (WGS84):    {}",
        format_distance(origin.wgs84_distance_3d(&target))
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config(
    mut config: Config,
    path: &Path,
    set_receiver: Option<Vec<f64>>,
    name: Option<String>,
) -> Result<(), CliError> {
    if let Some(values) = set_receiver {
        let text = values
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let position = parse_point(&text)?;

        config.receiver.lat = position.latitude();
        config.receiver.lon = position.longitude();
        config.receiver.alt_ft = position.altitude();
        if let Some(name) = name {
            config.receiver.name = name;
        }
        config::save_config(&config, path)?;
        println!("Saved {}", path.display());
    }

    let receiver = &config.receiver;
    let show = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or("-".into());
    println!("Config:    {}", path.display());
    println!("Receiver:  {}", receiver.name);
    println!("  lat:     {}", show(receiver.lat));
    println!("  lon:     {}", show(receiver.lon));
    println!("  alt_ft:  {}", show(receiver.alt_ft));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
