// src/bin/inspect.rs
// ============================================================================
// SPIKE INSPECTOR - Vuelca registros AER crudos y sus campos
// ============================================================================
//
// Uso: spike-inspect archivo.bin -f 2d --limit 20
//
// No normaliza polaridades: muestra los campos tal como están en disco.
//
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use spike_convert::aer::common::us_to_ms;
use spike_convert::aer::{RecordFormat, Spike1dRecord, Spike2dRecord, Spike3dRecord, SpikeCountRecord};

#[derive(Parser)]
#[command(name = "spike-inspect")]
#[command(about = "Dump raw AER spike records")]
struct Args {
    /// Spike file to inspect
    file: PathBuf,

    /// Record format (1d, 2d, 3d, summary)
    #[arg(short, long)]
    format: String,

    /// Records to show
    #[arg(long, default_value_t = 16)]
    limit: usize,

    /// Record index to start from
    #[arg(long, default_value_t = 0)]
    skip: usize,
}

fn describe(format: RecordFormat, chunk: &[u8]) -> String {
    match format {
        RecordFormat::Spike1D => {
            let r = Spike1dRecord::unpack(chunk);
            format!("neuron={:<5} sign={} t={} us ({:.3} ms)", r.neuron_id, r.polarity, r.t_us, us_to_ms(r.t_us))
        }
        RecordFormat::Spike2D => {
            let r = Spike2dRecord::unpack(chunk);
            format!("x={:<3} y={:<3} sign={} t={} us ({:.3} ms)", r.x, r.y, r.polarity, r.t_us, us_to_ms(r.t_us))
        }
        RecordFormat::Spike3D => {
            let r = Spike3dRecord::unpack(chunk);
            format!("x={:<4} y={:<4} ch={:<3} t={} us ({:.3} ms)", r.x, r.y, r.channel, r.t_us, us_to_ms(r.t_us))
        }
        RecordFormat::SpikeCount => {
            let r = SpikeCountRecord::unpack(chunk);
            format!(
                "neuron={:<5} [{:.3}, {:.3}] ms count={}",
                r.neuron_id,
                us_to_ms(r.t_start_us),
                us_to_ms(r.t_end_us),
                r.spike_count
            )
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let format = RecordFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Invalid record format: {}", args.format))?;

    let data = std::fs::read(&args.file)
        .with_context(|| format!("Cannot open {}", args.file.display()))?;

    let record_size = format.record_size();
    let num_records = data.len() / record_size;
    let trailing = data.len() % record_size;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  {}", args.file.display());
    println!("  Format:  {} ({} bytes/record)", format, record_size);
    println!("  Size:    {} bytes", data.len());
    println!("  Records: {}", num_records);
    if trailing != 0 {
        println!("  ⚠ {} trailing bytes: file is malformed for this format", trailing);
    }
    println!("═══════════════════════════════════════════════════════════════");

    for (idx, chunk) in data
        .chunks_exact(record_size)
        .enumerate()
        .skip(args.skip)
        .take(args.limit)
    {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("  [{:>8}] {}  {}", idx, hex.join(" "), describe(format, chunk));
    }

    let shown_end = (args.skip + args.limit).min(num_records);
    if shown_end < num_records {
        println!("  ... and {} more", num_records - shown_end);
    }

    Ok(())
}
