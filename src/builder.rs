// src/builder.rs
// ============================================================================
// BUILDER - Conversión de ficheros y directorios entre formatos AER
// ============================================================================
//
// El builder es TONTO:
// - NO decide formatos (lo hace el CLI)
// - NO valida rangos (el codec trunca en silencio)
// - Solo lee, decodifica, codifica, escribe
//
// En modo directorio cada fichero es independiente y tiene sus propios
// buffers, así que se procesan en paralelo. Un fichero que falla se cuenta
// y se registra, pero no aborta el resto.
//
// ============================================================================

use std::path::{Path, PathBuf};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::aer::{self, RecordFormat};
use crate::error::{Result, SpikeError};

/// Resultado de convertir un fichero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    pub records: usize,
    pub bytes_written: usize,
}

/// Estadísticas de conversión
#[derive(Debug, Default)]
pub struct ConvertStats {
    pub files_ok: usize,
    pub files_failed: usize,
    pub records: usize,
    pub bytes_written: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl ConvertStats {
    pub fn total_files(&self) -> usize {
        self.files_ok + self.files_failed
    }

    pub fn record(&mut self, report: FileReport) {
        self.files_ok += 1;
        self.records += report.records;
        self.bytes_written += report.bytes_written;
    }

    pub fn record_failure(&mut self, path: PathBuf, err: &SpikeError) {
        self.files_failed += 1;
        self.failures.push((path, err.to_string()));
    }
}

/// Re-codifica un buffer de un formato a otro
pub fn convert_bytes(data: &[u8], from: RecordFormat, to: RecordFormat) -> Result<(Vec<u8>, usize)> {
    match (from, to) {
        (RecordFormat::SpikeCount, RecordFormat::SpikeCount) => {
            let summary = aer::decode_summary(data)?;
            Ok((summary.encode()?, summary.len()))
        }
        (RecordFormat::SpikeCount, _) => Err(SpikeError::NotAnEventFormat(from)),
        (_, RecordFormat::SpikeCount) => Err(SpikeError::NotAnEventFormat(to)),
        _ => {
            let events = aer::decode_events(from, data)?;
            Ok((aer::encode_events(to, &events)?, events.len()))
        }
    }
}

/// Convierte un fichero; la salida solo se crea si el encode tiene éxito
pub fn convert_file(
    input: &Path,
    from: RecordFormat,
    output: &Path,
    to: RecordFormat,
) -> Result<FileReport> {
    let data = std::fs::read(input)?;
    let (bytes, records) = convert_bytes(&data, from, to)?;
    std::fs::write(output, &bytes)?;

    log::debug!(
        "{} ({}) -> {} ({}): {} records",
        input.display(),
        from,
        output.display(),
        to,
        records
    );

    Ok(FileReport {
        records,
        bytes_written: bytes.len(),
    })
}

/// Lista ficheros con la extensión dada, ordenados
fn collect_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().map_or(false, |e| e == extension))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Convierte todos los ficheros `*.{extension}` de `input_dir` a `output_dir`
pub fn convert_dir(
    input_dir: &Path,
    from: RecordFormat,
    output_dir: &Path,
    to: RecordFormat,
    extension: &str,
    show_progress: bool,
) -> Result<ConvertStats> {
    let inputs = collect_inputs(input_dir, extension)?;
    std::fs::create_dir_all(output_dir)?;

    let pb = if show_progress {
        ProgressBar::new(inputs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("  [{bar:40}] {pos}/{len} files ({eta})") {
        pb.set_style(style.progress_chars("=> "));
    }

    let results: Vec<(PathBuf, Result<FileReport>)> = inputs
        .par_iter()
        .progress_with(pb.clone())
        .map(|input| {
            let name = input.file_name().map(PathBuf::from).unwrap_or_default();
            let output = output_dir.join(name);
            (input.clone(), convert_file(input, from, &output, to))
        })
        .collect();

    pb.finish_and_clear();

    let mut stats = ConvertStats::default();
    for (path, result) in results {
        match result {
            Ok(report) => stats.record(report),
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                stats.record_failure(path, &e);
            }
        }
    }

    log::info!(
        "converted {}/{} files ({} records, {} bytes)",
        stats.files_ok,
        stats.total_files(),
        stats.records,
        stats.bytes_written
    );

    Ok(stats)
}
