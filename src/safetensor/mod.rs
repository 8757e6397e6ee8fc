// src/safetensor/mod.rs
// ============================================================================
// SAFETENSOR - Puente de tensores densos con pipelines numéricos
// ============================================================================
//
// Layout:
//   [u64 LE: tamaño del header] [header JSON] [datos raw]
//
// Lectura: F32 / F16 / BF16 / F64 -> DenseTensor (f32).
// Escritura: siempre F32 little-endian, un tensor por fichero.
//
// ============================================================================

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpikeError};
use crate::tensor::DenseTensor;

/// Claves de metadata que escribe spike-convert
pub const META_SAMPLING_TIME: &str = "sampling_time";
pub const META_DIMENSIONALITY: &str = "dimensionality";
pub const META_SOURCE_FORMAT: &str = "source_format";

/// Nombre por defecto del tensor de spikes
pub const DEFAULT_TENSOR_NAME: &str = "spikes";

/// Información de un tensor en el archivo safetensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorInfo {
    pub dtype: String,
    pub shape: Vec<usize>,
    pub data_offsets: [usize; 2],
}

/// Header del archivo safetensor
#[derive(Debug, Deserialize)]
pub struct SafetensorHeader {
    #[serde(flatten)]
    pub tensors: HashMap<String, TensorInfo>,
    #[serde(rename = "__metadata__")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Archivo safetensor abierto
pub struct SafetensorFile {
    pub path: PathBuf,
    pub header: SafetensorHeader,
    pub header_size: usize,
    mmap: Mmap,
}

impl SafetensorFile {
    /// Abre un archivo safetensor
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        // Tamaño del header (primeros 8 bytes, little-endian u64)
        let mut reader = BufReader::new(&file);
        let mut header_size_bytes = [0u8; 8];
        reader.read_exact(&mut header_size_bytes)?;
        let header_size = u64::from_le_bytes(header_size_bytes) as usize;

        let file_len = file.metadata()?.len() as usize;
        if header_size > file_len.saturating_sub(8) {
            return Err(SpikeError::Header(format!(
                "header size {} exceeds file size {} in {}",
                header_size,
                file_len,
                path.display()
            )));
        }

        let mut header_bytes = vec![0u8; header_size];
        reader.read_exact(&mut header_bytes)?;

        let header: SafetensorHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| SpikeError::Header(format!("{}: {}", path.display(), e)))?;

        // Memory map el archivo
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            path,
            header,
            header_size: 8 + header_size,
            mmap,
        })
    }

    /// Lista nombres de tensores (orden estable)
    pub fn tensor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.header.tensors.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn tensor_info(&self, name: &str) -> Option<&TensorInfo> {
        self.header.tensors.get(name)
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.header
            .metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(|s| s.as_str())
    }

    /// Lee un tensor como bytes raw
    pub fn read_raw(&self, name: &str) -> Result<&[u8]> {
        let info = self
            .tensor_info(name)
            .ok_or_else(|| SpikeError::Header(format!("tensor '{}' not found", name)))?;

        let out_of_range = || {
            SpikeError::Header(format!(
                "tensor '{}' offsets {:?} outside of {}",
                name,
                info.data_offsets,
                self.path.display()
            ))
        };

        let start = self.header_size.checked_add(info.data_offsets[0]).ok_or_else(out_of_range)?;
        let end = self.header_size.checked_add(info.data_offsets[1]).ok_or_else(out_of_range)?;
        if start > end || end > self.mmap.len() {
            return Err(out_of_range());
        }

        Ok(&self.mmap[start..end])
    }

    /// Lee un tensor como f32 (convierte desde el dtype del fichero)
    pub fn read_f32(&self, name: &str) -> Result<Vec<f32>> {
        let info = self
            .tensor_info(name)
            .ok_or_else(|| SpikeError::Header(format!("tensor '{}' not found", name)))?;
        let data = self.read_raw(name)?;

        match info.dtype.as_str() {
            "F32" => Ok(data
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()),
            "F16" => Ok(data
                .chunks_exact(2)
                .map(|b| half::f16::from_le_bytes([b[0], b[1]]).to_f32())
                .collect()),
            "BF16" => Ok(data
                .chunks_exact(2)
                .map(|b| half::bf16::from_le_bytes([b[0], b[1]]).to_f32())
                .collect()),
            "F64" => Ok(data
                .chunks_exact(8)
                .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
                .collect()),
            dtype => Err(SpikeError::Header(format!("unsupported dtype: {}", dtype))),
        }
    }

    /// Lee un tensor como DenseTensor
    pub fn read_dense(&self, name: &str) -> Result<DenseTensor> {
        let shape = self
            .tensor_info(name)
            .map(|info| info.shape.clone())
            .ok_or_else(|| SpikeError::Header(format!("tensor '{}' not found", name)))?;
        DenseTensor::from_vec(shape, self.read_f32(name)?)
    }
}

/// Serializa un tensor F32 a bytes safetensor
pub fn to_safetensor_bytes(
    name: &str,
    tensor: &DenseTensor,
    metadata: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let data_len = tensor.numel() * 4;

    let mut header = serde_json::Map::new();
    let info = TensorInfo {
        dtype: "F32".to_string(),
        shape: tensor.shape().to_vec(),
        data_offsets: [0, data_len],
    };
    header.insert(
        name.to_string(),
        serde_json::to_value(&info).map_err(|e| SpikeError::Header(e.to_string()))?,
    );
    if !metadata.is_empty() {
        header.insert("__metadata__".to_string(), serde_json::json!(metadata));
    }

    let mut header_bytes =
        serde_json::to_vec(&serde_json::Value::Object(header)).map_err(|e| SpikeError::Header(e.to_string()))?;

    // Datos alineados a 8 bytes: rellenar el header con espacios
    let pad = (8 - header_bytes.len() % 8) % 8;
    header_bytes.extend(std::iter::repeat(b' ').take(pad));

    let mut out = Vec::with_capacity(8 + header_bytes.len() + data_len);
    out.extend_from_slice(&(header_bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(&header_bytes);
    for &v in tensor.data() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Ok(out)
}

/// Escribe un tensor F32 en un archivo safetensor
pub fn write_safetensor(
    path: impl AsRef<Path>,
    name: &str,
    tensor: &DenseTensor,
    metadata: &HashMap<String, String>,
) -> Result<()> {
    let bytes = to_safetensor_bytes(name, tensor, metadata)?;

    let mut file = BufWriter::new(File::create(path.as_ref())?);
    file.write_all(&bytes)?;
    file.flush()?;

    log::debug!(
        "wrote tensor '{}' {:?} to {}",
        name,
        tensor.shape(),
        path.as_ref().display()
    );
    Ok(())
}
