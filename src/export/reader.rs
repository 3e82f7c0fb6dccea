//! XKT container reader, for inspection and verification.

use super::xkt::{Section, XKT_VERSION};
use crate::error::{Result, XktError};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// An XKT file split into its inflated sections.
#[derive(Debug, Clone)]
pub struct XktReader {
    version: u32,
    sections: Vec<Vec<u8>>,
}

impl XktReader {
    /// Parse the header and inflate every section.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let version = read_u32(bytes, 0)?;
        if version != XKT_VERSION {
            return Err(XktError::InvalidXkt(format!(
                "unsupported XKT version {version}, expected {XKT_VERSION}"
            )));
        }
        let count = read_u32(bytes, 1)? as usize;
        if count != Section::COUNT {
            return Err(XktError::InvalidXkt(format!(
                "expected {} sections, found {count}",
                Section::COUNT
            )));
        }

        let header_len = count
            .checked_add(2)
            .and_then(|words| words.checked_mul(4))
            .ok_or_else(|| XktError::InvalidXkt("section count overflows".into()))?;
        if bytes.len() < header_len {
            return Err(XktError::InvalidXkt(format!(
                "header declares {count} sections but file has {} bytes",
                bytes.len()
            )));
        }

        let mut sections = Vec::with_capacity(count);
        let mut offset = header_len;
        for i in 0..count {
            let len = read_u32(bytes, 2 + i)? as usize;
            let end = offset
                .checked_add(len)
                .filter(|&end| end <= bytes.len())
                .ok_or_else(|| {
                    XktError::InvalidXkt(format!("section {i} runs past end of file"))
                })?;
            let mut inflated = Vec::new();
            ZlibDecoder::new(&bytes[offset..end])
                .read_to_end(&mut inflated)
                .map_err(|e| XktError::InvalidXkt(format!("section {i}: {e}")))?;
            sections.push(inflated);
            offset = end;
        }

        if offset != bytes.len() {
            return Err(XktError::InvalidXkt(format!(
                "{} trailing bytes after last section",
                bytes.len() - offset
            )));
        }

        Ok(Self { version, sections })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Inflated bytes of a section.
    pub fn section(&self, section: Section) -> &[u8] {
        &self.sections[section.index()]
    }

    pub fn u8s(&self, section: Section) -> Vec<u8> {
        self.section(section).to_vec()
    }

    pub fn i8s(&self, section: Section) -> Vec<i8> {
        self.section(section).iter().map(|&b| b as i8).collect()
    }

    pub fn u16s(&self, section: Section) -> Result<Vec<u16>> {
        decode_le(self.section(section), section, u16::from_le_bytes)
    }

    pub fn u32s(&self, section: Section) -> Result<Vec<u32>> {
        decode_le(self.section(section), section, u32::from_le_bytes)
    }

    pub fn i32s(&self, section: Section) -> Result<Vec<i32>> {
        decode_le(self.section(section), section, i32::from_le_bytes)
    }

    pub fn f32s(&self, section: Section) -> Result<Vec<f32>> {
        decode_le(self.section(section), section, f32::from_le_bytes)
    }

    pub fn f64s(&self, section: Section) -> Result<Vec<f64>> {
        decode_le(self.section(section), section, f64::from_le_bytes)
    }

    /// Parse a JSON section.
    pub fn json(&self, section: Section) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(self.section(section))?)
    }

    pub fn entity_ids(&self) -> Result<Vec<String>> {
        Ok(serde_json::from_slice(self.section(Section::EachEntityId))?)
    }

    pub fn num_entities(&self) -> Result<usize> {
        Ok(self.u32s(Section::EachEntityMeshesPortion)?.len())
    }

    pub fn num_tiles(&self) -> Result<usize> {
        Ok(self.u32s(Section::EachTileEntitiesPortion)?.len())
    }

    pub fn num_geometries(&self) -> usize {
        self.section(Section::EachGeometryPrimitiveType).len()
    }

    pub fn num_meshes(&self) -> Result<usize> {
        Ok(self.u32s(Section::EachMeshGeometriesPortion)?.len())
    }
}

fn read_u32(bytes: &[u8], word: usize) -> Result<u32> {
    let start = word * 4;
    bytes
        .get(start..start + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| XktError::InvalidXkt("truncated header".into()))
}

fn decode_le<T, const N: usize>(
    bytes: &[u8],
    section: Section,
    from_le: fn([u8; N]) -> T,
) -> Result<Vec<T>> {
    if bytes.len() % N != 0 {
        return Err(XktError::InvalidXkt(format!(
            "section {} length {} is not a multiple of {N}",
            section.name(),
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut array = [0u8; N];
            array.copy_from_slice(chunk);
            from_le(array)
        })
        .collect())
}
