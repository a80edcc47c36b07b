//! Headerless little-endian f64 arrays.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use ocean_common::{OceanError, OceanResult};

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Write values as consecutive little-endian f64.
pub fn write_raw(path: &Path, values: &[f64]) -> OceanResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for v in values {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a file written by [`write_raw`].
pub fn read_raw(path: &Path) -> OceanResult<Vec<f64>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    decode_f64_le(&bytes, &path.display().to_string())
}

pub(crate) fn decode_f64_le(bytes: &[u8], what: &str) -> OceanResult<Vec<f64>> {
    if bytes.len() % F64_SIZE != 0 {
        return Err(OceanError::shape_mismatch(
            what,
            format!("a multiple of {} bytes", F64_SIZE),
            bytes.len(),
        ));
    }
    Ok(bytes
        .chunks_exact(F64_SIZE)
        .map(|chunk| {
            let mut buf = [0u8; F64_SIZE];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bytes_are_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.bin");
        write_raw(&path, &[1.0]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
    }

    #[test]
    fn test_truncated_file() {
        let err = decode_f64_le(&[0u8; 12], "truncated").unwrap_err();
        assert!(matches!(err, OceanError::ShapeMismatch { .. }));
    }
}
