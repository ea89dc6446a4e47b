//! Safetensors I/O for spectra and correction results.
//!
//! Reader: [`SpectraData::load`] expects a spectral matrix under key `X`
//! (`[m, n]`) and a reference spectrum under key `r` (`[n]` or `[1, n]`).
//! Both may be stored as F32 or F64; everything is widened to f64.
use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use std::path::Path;

// ── Low-level safetensors parser (raw bytes → ndarray, no tensor types). ─────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into()?);
    let data_start = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_add(8))
        .filter(|&end| end <= bytes.len())
        .with_context(|| format!("safetensors header truncated ({n} bytes declared)"))?;
    let header: HashMap<String, serde_json::Value> =
        serde_json::from_slice(&bytes[8..data_start])
            .context("failed to parse safetensors header")?;
    Ok((header, data_start))
}

/// Read one F32/F64 tensor as f64, checking its byte span against `shape`.
fn read_tensor_f64(
    bytes: &[u8],
    data_start: usize,
    name: &str,
    entry: &serde_json::Value,
    shape: &[usize],
) -> Result<Vec<f64>> {
    let offsets = entry["data_offsets"]
        .as_array()
        .with_context(|| format!("'{name}': missing data_offsets"))?;
    let (s, e) = match (offsets.first().and_then(|v| v.as_u64()), offsets.get(1).and_then(|v| v.as_u64())) {
        (Some(s), Some(e)) => (s, e),
        _ => bail!("'{name}': malformed data_offsets"),
    };
    let abs = |off: u64| usize::try_from(off).ok().and_then(|o| o.checked_add(data_start));
    let raw = match (abs(s), abs(e)) {
        (Some(s), Some(e)) if s <= e => bytes.get(s..e),
        _ => None,
    }
    .with_context(|| format!("'{name}': data_offsets [{s}, {e}] out of range"))?;

    let dtype = entry["dtype"].as_str().unwrap_or("");
    let (width, decode): (usize, fn(&[u8]) -> f64) = match dtype {
        "F64" => (8, |b: &[u8]| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])),
        "F32" => (4, |b: &[u8]| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64),
        other => bail!("'{name}': unsupported dtype {other:?} (expected F32 or F64)"),
    };
    let count = shape
        .iter()
        .try_fold(1_usize, |acc, &d| acc.checked_mul(d))
        .with_context(|| format!("'{name}': shape {shape:?} overflows"))?;
    if raw.len() % width != 0 || raw.len() / width != count {
        bail!(
            "'{name}': {} bytes of {dtype} do not match shape {shape:?} ({count} elements)",
            raw.len()
        );
    }

    Ok(raw.chunks_exact(width).map(decode).collect())
}

fn shape_of(name: &str, entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .with_context(|| format!("'{name}': missing shape"))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|d| d as usize)
                .with_context(|| format!("'{name}': non-integer dimension"))
        })
        .collect()
}

// ── Public structs ────────────────────────────────────────────────────────────

/// Spectra and reference loaded from a safetensors file.
#[derive(Debug, Clone)]
pub struct SpectraData {
    /// [m, n] spectra, one per row.
    pub x: Array2<f64>,
    /// [n] reference spectrum.
    pub r: Array1<f64>,
}

impl SpectraData {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let x_entry = header.get("X").context("missing 'X' key")?;
        let x_shape = shape_of("X", x_entry)?;
        if x_shape.len() != 2 {
            bail!("'X' must be 2-D, got shape {x_shape:?}");
        }
        let x_vec = read_tensor_f64(&bytes, data_start, "X", x_entry, &x_shape)?;
        let x = Array2::from_shape_vec((x_shape[0], x_shape[1]), x_vec)?;

        let r_entry = header.get("r").context("missing 'r' key")?;
        let r_shape = shape_of("r", r_entry)?;
        // [n], [1, n] and [n, 1] are all accepted.
        if !(1..=2).contains(&r_shape.len()) || r_shape.iter().filter(|&&d| d != 1).count() > 1 {
            bail!("'r' must be a vector, got shape {r_shape:?}");
        }
        let r_vec = read_tensor_f64(&bytes, data_start, "r", r_entry, &r_shape)?;
        let r = Array1::from_vec(r_vec);

        Ok(SpectraData { x, r })
    }
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Tensor queued in a [`StWriter`], already encoded little-endian.
struct Entry {
    name: String,
    dtype: &'static str,
    shape: Vec<usize>,
    bytes: Vec<u8>,
}

/// Safetensors writer for F64, I32 and (narrowed) F32 tensors.
///
/// Tensors are laid out in insertion order; the header is padded with
/// spaces to a multiple of 8 bytes.
///
/// ```rust,no_run
/// use pmsc::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("r", &[1.0f64, 2.0, 3.0], &[3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<Entry>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<const W: usize>(
        &mut self,
        name: &str,
        dtype: &'static str,
        shape: &[usize],
        values: impl Iterator<Item = [u8; W]>,
    ) {
        self.entries.push(Entry {
            name: name.to_string(),
            dtype,
            shape: shape.to_vec(),
            bytes: values.flatten().collect(),
        });
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        self.push(name, "F64", shape, data.iter().map(|v| v.to_le_bytes()));
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        self.push(name, "I32", shape, data.iter().map(|v| v.to_le_bytes()));
    }

    pub fn add_f64_arr1(&mut self, name: &str, arr: &Array1<f64>) {
        self.push(name, "F64", &[arr.len()], arr.iter().map(|v| v.to_le_bytes()));
    }

    /// Row-major regardless of the array's memory layout.
    pub fn add_f64_arr2(&mut self, name: &str, arr: &Array2<f64>) {
        self.push(name, "F64", &[arr.nrows(), arr.ncols()], arr.iter().map(|v| v.to_le_bytes()));
    }

    /// Narrow an f64 matrix to F32 on the way out (halves the file size).
    pub fn add_f64_arr2_as_f32(&mut self, name: &str, arr: &Array2<f64>) {
        self.push(name, "F32", &[arr.nrows(), arr.ncols()], arr.iter().map(|&v| (v as f32).to_le_bytes()));
    }

    /// Serialise header and payload into one buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for e in &self.entries {
            header_map.insert(e.name.clone(), serde_json::json!({
                "dtype": e.dtype,
                "shape": e.shape,
                "data_offsets": [offset, offset + e.bytes.len()],
            }));
            offset += e.bytes.len();
        }
        let mut header = serde_json::to_vec(&header_map)?;
        header.resize(header.len().next_multiple_of(8), b' ');

        let mut out = Vec::with_capacity(8 + header.len() + offset);
        out.extend_from_slice(&(header.len() as u64).to_le_bytes());
        out.extend_from_slice(&header);
        for e in &self.entries {
            out.extend_from_slice(&e.bytes);
        }
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)
            .with_context(|| format!("writing {}", path.display()))
    }
}
