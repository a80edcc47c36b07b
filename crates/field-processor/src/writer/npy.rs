//! NumPy `.npy` v1.0 files holding a 1D `<f8` array.
//!
//! Layout: the magic string `\x93NUMPY`, version bytes `1 0`, a
//! little-endian u16 header length, then an ASCII dict literal padded with
//! spaces and terminated by `\n` so the data starts on a 64-byte boundary.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use ocean_common::{OceanError, OceanResult};

use super::raw::decode_f64_le;

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;
/// magic + version + header length
const PREAMBLE_LEN: usize = 10;

/// Write values as a 1D little-endian float64 `.npy` array.
pub fn write_npy(path: &Path, values: &[f64]) -> OceanResult<()> {
    let header = npy_header(values.len());
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&(header.len() as u16).to_le_bytes())?;
    writer.write_all(header.as_bytes())?;
    for v in values {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a 1D `<f8` array written by [`write_npy`] or NumPy itself.
pub fn read_npy(path: &Path) -> OceanResult<Vec<f64>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let what = path.display().to_string();

    if bytes.len() < PREAMBLE_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(OceanError::UnsupportedFormat(format!("{} is not an .npy file", what)));
    }
    let (major, header_start, header_len) = match bytes[6] {
        1 => (1, PREAMBLE_LEN, u16::from_le_bytes([bytes[8], bytes[9]]) as usize),
        2 | 3 if bytes.len() >= 12 => (
            bytes[6],
            12,
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
        ),
        v => {
            return Err(OceanError::UnsupportedFormat(format!(
                "{}: unsupported .npy version {}",
                what, v
            )))
        }
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(OceanError::shape_mismatch(&what, format!("at least {} bytes", data_start), bytes.len()));
    }

    let header = String::from_utf8_lossy(&bytes[header_start..data_start]);
    if !header.contains("'descr': '<f8'") {
        return Err(OceanError::UnsupportedFormat(format!(
            "{}: expected little-endian float64 (v{} header {})",
            what,
            major,
            header.trim()
        )));
    }
    if header.contains("'fortran_order': True") {
        return Err(OceanError::UnsupportedFormat(format!("{}: Fortran order is not supported", what)));
    }

    let values = decode_f64_le(&bytes[data_start..], &what)?;
    if let Some(count) = header_count(&header) {
        if count != values.len() {
            return Err(OceanError::shape_mismatch(&what, count, values.len()));
        }
    }
    Ok(values)
}

fn npy_header(len: usize) -> String {
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        len
    );
    let unpadded = PREAMBLE_LEN + dict.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    format!("{}{}\n", dict, " ".repeat(padding))
}

/// Element count from the `'shape': (n,)` entry of a 1D header.
fn header_count(header: &str) -> Option<usize> {
    let start = header.find("'shape': (")? + "'shape': (".len();
    let rest = &header[start..];
    let end = rest.find(')')?;
    let dims: Vec<usize> = rest[..end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    Some(dims.iter().product())
}
