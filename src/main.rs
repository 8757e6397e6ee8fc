// src/main.rs
// ============================================================================
// SPIKE-CONVERT CLI
// ============================================================================
//
// Uso:
//   spike-convert info recording.bin -f 2d
//   spike-convert convert in.bin -f 2d -t 3d -o out.bin
//   spike-convert batch ./NMNIST/Train -f 2d -t 3d -o ./NMNIST3d
//   spike-convert to-tensor in.bin -f 2d -s 1.0 -o spikes.safetensors --shape 2,34,34,350
//   spike-convert from-tensor spikes.safetensors -s 1.0 -t 2d -o out.bin
//
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use spike_convert::{
    builder, parse_shape,
    safetensor::{self, SafetensorFile},
    spikefile, tensor, Dimensionality, RecordFormat, SpikeEventSet,
};

#[derive(Parser, Debug)]
#[command(name = "spike-convert")]
#[command(about = "Convert AER spike files between binary formats and dense tensors")]
#[command(version)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a spike file
    Info {
        file: PathBuf,

        /// Record format (1d, 2d, 3d, summary)
        #[arg(short, long, value_parser = parse_format)]
        format: RecordFormat,

        /// Print event statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a spike file into another record format
    ///
    /// Polarities/channels are shifted so the lowest one becomes 0, even when
    /// both formats are the same.
    Convert {
        input: PathBuf,

        #[arg(short, long, value_parser = parse_format)]
        from: RecordFormat,

        #[arg(short, long, value_parser = parse_format)]
        to: RecordFormat,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Re-encode every file of a directory
    ///
    /// Polarities/channels are shifted per file so the lowest one becomes 0.
    Batch {
        input_dir: PathBuf,

        #[arg(short, long, value_parser = parse_format)]
        from: RecordFormat,

        #[arg(short, long, value_parser = parse_format)]
        to: RecordFormat,

        #[arg(short, long)]
        output: PathBuf,

        /// Input file extension
        #[arg(long, default_value = "bin")]
        ext: String,
    },

    /// Bin spike events into a dense safetensors tensor
    ToTensor {
        input: PathBuf,

        #[arg(short, long, value_parser = parse_format)]
        format: RecordFormat,

        /// Time bin width in ms
        #[arg(short, long, default_value_t = 1.0)]
        sampling_time: f64,

        /// Explicit tensor shape C,W,T (1D) or C,H,W,T (2D); events outside are dropped
        #[arg(long, value_parser = parse_shape_arg)]
        shape: Option<ShapeArg>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Turn a dense safetensors tensor back into a spike file
    FromTensor {
        input: PathBuf,

        /// Tensor name inside the safetensors file
        #[arg(long, default_value = safetensor::DEFAULT_TENSOR_NAME)]
        name: String,

        /// Time bin width in ms (defaults to the file metadata)
        #[arg(short, long)]
        sampling_time: Option<f64>,

        #[arg(short, long, value_parser = parse_format)]
        to: RecordFormat,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_format(s: &str) -> std::result::Result<RecordFormat, String> {
    RecordFormat::from_str(s).ok_or_else(|| format!("Invalid record format: {} (expected 1d, 2d, 3d or summary)", s))
}

/// Forma explícita del tensor (newtype para que clap no la trate como lista)
#[derive(Debug, Clone)]
struct ShapeArg(Vec<usize>);

fn parse_shape_arg(s: &str) -> std::result::Result<ShapeArg, String> {
    parse_shape(s).map(ShapeArg).ok_or_else(|| format!("Invalid shape: {} (expected e.g. 2,34,34,300)", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let start = Instant::now();

    match args.command {
        Command::Info { file, format, json } => info(&file, format, json)?,
        Command::Convert { input, from, to, output } => {
            let report = builder::convert_file(&input, from, &output, to)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!(
                "  ✓ {} records {} → {} ({} bytes)",
                report.records,
                from,
                to,
                report.bytes_written
            );
        }
        Command::Batch { input_dir, from, to, output, ext } => {
            println!("═══════════════════════════════════════════════════════════════");
            println!("  BATCH {} → {}", from, to);
            println!("  Input:  {}", input_dir.display());
            println!("  Output: {}", output.display());
            println!("═══════════════════════════════════════════════════════════════");

            let stats = builder::convert_dir(&input_dir, from, &output, to, &ext, true)
                .with_context(|| format!("Failed to convert directory {}", input_dir.display()))?;

            println!("  Files:   {} ok, {} failed", stats.files_ok, stats.files_failed);
            println!("  Records: {}", stats.records);
            println!("  Size:    {:.1} MB", stats.bytes_written as f64 / 1024.0 / 1024.0);
            for (path, err) in stats.failures.iter().take(10) {
                println!("    ✗ {}: {}", path.display(), err);
            }
            if stats.failures.len() > 10 {
                println!("    ... and {} more", stats.failures.len() - 10);
            }
        }
        Command::ToTensor { input, format, sampling_time, shape, output } => {
            let events = spikefile::read_events(&input, format)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let dense = tensor::to_tensor(&events, sampling_time, shape.as_ref().map(|s| s.0.as_slice()))?;

            let mut meta = HashMap::new();
            meta.insert(safetensor::META_SAMPLING_TIME.to_string(), sampling_time.to_string());
            meta.insert(safetensor::META_DIMENSIONALITY.to_string(), events.dimensionality().to_string());
            meta.insert(safetensor::META_SOURCE_FORMAT.to_string(), format.to_string());

            safetensor::write_safetensor(&output, safetensor::DEFAULT_TENSOR_NAME, &dense, &meta)
                .with_context(|| format!("Cannot write {}", output.display()))?;

            println!(
                "  ✓ {} events → tensor {:?} ({} active cells)",
                events.len(),
                dense.shape(),
                dense.count_nonzero()
            );
        }
        Command::FromTensor { input, name, sampling_time, to, output } => {
            let file = SafetensorFile::open(&input)
                .with_context(|| format!("Cannot open {}", input.display()))?;

            let sampling_time = match sampling_time {
                Some(ts) => ts,
                None => file
                    .metadata(safetensor::META_SAMPLING_TIME)
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(|| anyhow::anyhow!("No sampling time given and none in {} metadata", input.display()))?,
            };

            let dense = file.read_dense(&name)?;
            let events = tensor::to_events(&dense, sampling_time)?;
            spikefile::write_events(&output, to, &events)
                .with_context(|| format!("Cannot write {} as {}", output.display(), to))?;

            println!("  ✓ {} events → {} ({})", events.len(), output.display(), to);
        }
    }

    log::debug!("done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn info(file: &Path, format: RecordFormat, json: bool) -> Result<()> {
    if json {
        let report = match format.required_dimensionality() {
            Some(_) => {
                let events = spikefile::read_events(file, format)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                serde_json::json!({
                    "file": file.display().to_string(),
                    "format": format.to_string(),
                    "dimensionality": events.dimensionality(),
                    "stats": events.stats(),
                })
            }
            None => {
                let summary = spikefile::read_summary(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                serde_json::json!({
                    "file": file.display().to_string(),
                    "format": format.to_string(),
                    "regions": summary.len(),
                    "total_spikes": summary.total_spikes(),
                })
            }
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let size = std::fs::metadata(file)
        .with_context(|| format!("Cannot stat {}", file.display()))?
        .len();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  {} ({} records, {} bytes)", file.display(), format, size);
    println!("═══════════════════════════════════════════════════════════════");

    if format == RecordFormat::SpikeCount {
        let summary = spikefile::read_summary(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        println!("  Regions:      {}", summary.len());
        println!("  Total spikes: {}", summary.total_spikes());
        if let Some(max_id) = summary.neuron_id.iter().max() {
            println!("  Max neuronID: {}", max_id);
        }
        return Ok(());
    }

    let events: SpikeEventSet = spikefile::read_events(file, format)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match events.stats() {
        Some(stats) => {
            println!("  Events:    {}", stats.count);
            println!("  Dim:       {}", events.dimensionality());
            match events.dimensionality() {
                Dimensionality::OneD => println!("  Neurons:   {}", stats.max_x + 1),
                Dimensionality::TwoD => println!(
                    "  Sensor:    {}x{}",
                    stats.max_x + 1,
                    stats.max_y.unwrap_or(0) + 1
                ),
            }
            println!("  Channels:  {}", stats.num_channels());
            println!("  Time:      {:.3} → {:.3} ms ({:.3} ms)", stats.t_min, stats.t_max, stats.duration());
        }
        None => println!("  Empty file"),
    }

    Ok(())
}
