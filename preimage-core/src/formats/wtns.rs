//! Binary witness files (`.wtns`) as written by circom witness generators.
//!
//! ```text
//! "wtns" | version: u32 | n_sections: u32
//! section 1 (header): n8: u32 | prime: [u8; n8] | n_witness: u32
//! section 2 (data):   n_witness little-endian elements of n8 bytes
//! ```
//! Every section is prefixed by its type (`u32`) and byte length (`u64`).

use std::io::{Read, Write};

use common::constants::{WTNS_FIELD_BYTES, WTNS_MAGIC, WTNS_VERSION};

use crate::{field::SnarkField, utils::errors::EncodingError};

const HEADER_SECTION: u32 = 1;
const DATA_SECTION: u32 = 2;

fn malformed(reason: impl Into<String>) -> EncodingError {
    EncodingError::MalformedWitness(reason.into())
}

pub fn write_wtns<F: SnarkField, W: Write>(values: &[F], mut writer: W) -> Result<(), EncodingError> {
    let n8 = F::NUM_BYTES;
    let num_values = u32::try_from(values.len()).map_err(|_| malformed("too many values"))?;
    writer.write_all(WTNS_MAGIC)?;
    writer.write_all(&WTNS_VERSION.to_le_bytes())?;
    writer.write_all(&2u32.to_le_bytes())?;

    writer.write_all(&HEADER_SECTION.to_le_bytes())?;
    writer.write_all(&((4 + n8 + 4) as u64).to_le_bytes())?;
    writer.write_all(&(n8 as u32).to_le_bytes())?;
    writer.write_all(&F::modulus_le_bytes())?;
    writer.write_all(&num_values.to_le_bytes())?;

    writer.write_all(&DATA_SECTION.to_le_bytes())?;
    writer.write_all(&((n8 * values.len()) as u64).to_le_bytes())?;
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, EncodingError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, EncodingError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_section<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, EncodingError> {
    let mut bytes = Vec::new();
    reader.take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(malformed("truncated section"));
    }
    Ok(bytes)
}

/// Reads a witness, checking that it was produced for the field `F`.
/// Sections may appear in any order; unknown sections are skipped.
pub fn read_wtns<F: SnarkField, R: Read>(mut reader: R) -> Result<Vec<F>, EncodingError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != WTNS_MAGIC {
        return Err(malformed("missing wtns magic"));
    }
    let version = read_u32(&mut reader)?;
    if version != WTNS_VERSION {
        return Err(malformed(format!("unsupported version {version}")));
    }
    let num_sections = read_u32(&mut reader)?;

    let mut header: Option<(usize, usize)> = None;
    let mut data: Option<Vec<u8>> = None;
    for _ in 0..num_sections {
        let section_type = read_u32(&mut reader)?;
        let len = read_u64(&mut reader)?;
        let bytes = read_section(&mut reader, len)?;
        match section_type {
            HEADER_SECTION => {
                if bytes.len() < 4 {
                    return Err(malformed("header too short"));
                }
                let n8 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
                if n8 != WTNS_FIELD_BYTES as usize || n8 != F::NUM_BYTES || bytes.len() != 4 + n8 + 4 {
                    return Err(malformed(format!("unsupported field width {n8}")));
                }
                if bytes[4..4 + n8] != F::modulus_le_bytes()[..] {
                    return Err(malformed("witness is for a different prime"));
                }
                let tail = &bytes[4 + n8..];
                let count = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]) as usize;
                header = Some((n8, count));
            }
            DATA_SECTION => data = Some(bytes),
            _ => {}
        }
    }

    let (n8, count) = header.ok_or_else(|| malformed("missing header section"))?;
    let data = data.ok_or_else(|| malformed("missing data section"))?;
    if data.len() != n8 * count {
        return Err(malformed(format!(
            "data section holds {} bytes, expected {}",
            data.len(),
            n8 * count
        )));
    }
    data.chunks_exact(n8)
        .enumerate()
        .map(|(i, chunk)| {
            F::from_canonical_bytes(chunk)
                .ok_or_else(|| EncodingError::NonCanonical(format!("witness value {i}")))
        })
        .collect()
}
