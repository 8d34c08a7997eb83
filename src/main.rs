use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use pb2int16::quant::DEFAULT_FIXED_POINT_POS;
use pb2int16::{convert, ConvertOptions, QuantParams, Rounding};
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "Usage: pb2int16 file.pb file.raw [scale]";

#[derive(Parser, Debug)]
#[command(name = "pb2int16", author, version, about = "Convert a serialized tensor into a raw fixed-point int16 buffer", long_about = None)]
struct Args {
    /// Serialized TensorProto (.pb) to read
    input: PathBuf,

    /// Raw int16 file to create
    output: PathBuf,

    /// Extra multiplier applied on top of the fixed-point scaling
    #[arg(default_value_t = 1.0, allow_negative_numbers = true)]
    scale: f64,

    /// Fractional bits of the output format (8 => values * 256)
    #[arg(long, default_value_t = DEFAULT_FIXED_POINT_POS)]
    fixed_point_pos: u8,

    /// How scaled values are rounded before narrowing
    #[arg(long, value_enum, default_value = "truncate")]
    rounding: Rounding,

    /// Fail instead of clamping values outside the int16 range
    #[arg(long)]
    strict: bool,

    /// Write a JSON summary of the conversion here
    #[arg(long)]
    report: Option<PathBuf>,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(a) => a,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprint!("{}", e);
                eprintln!("{}", USAGE);
                std::process::exit(1);
            }
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args();

    let opts = ConvertOptions {
        params: QuantParams { scale: args.scale, fixed_point_pos: args.fixed_point_pos, rounding: args.rounding },
        strict: args.strict,
    };
    let report = convert(&args.input, &args.output, &opts)?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        fs::write(path, json).with_context(|| format!("write report: {}", path.display()))?;
    }
    println!("created {}", args.output.display());
    Ok(())
}
