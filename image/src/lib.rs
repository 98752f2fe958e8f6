use thiserror::Error;

pub mod elf;
pub mod key;
pub mod pipeline;
pub mod stripe;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Object error")]
    Object(#[from] object::Error),

    #[error("Unsupported image")]
    Unsupported,
    #[error("Out of bounds: {offset:#x}+{length:#x}")]
    OutOfBounds { offset: u64, length: u64 },
    #[error("Empty section: {0}")]
    EmptySection(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A named contiguous byte range of a loaded binary image. Offsets are
/// absolute image offsets, not section-relative.
#[derive(Clone, Debug)]
pub struct Section {
    pub name: String,
    pub image_start: u64,
    pub image_length: u64,
}

/// Byte-range access to a loaded binary image.
pub trait Image {
    fn arch(&self) -> &str;

    fn sections(&self) -> &[Section];

    fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>>;

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()>;
}

/// Image backed by a plain byte buffer with a caller-supplied section table
/// and architecture tag, for hosts that bring their own loader.
pub struct RawImage {
    arch: String,
    sections: Vec<Section>,
    data: Vec<u8>,
}

impl RawImage {
    pub fn new(arch: impl Into<String>, sections: Vec<Section>, data: Vec<u8>) -> Self {
        Self {
            arch: arch.into(),
            sections,
            data,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Image for RawImage {
    fn arch(&self) -> &str {
        &self.arch
    }

    fn sections(&self) -> &[Section] {
        &self.sections
    }

    fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        Ok(self.data[checked_range(self.data.len(), offset, length)?].to_vec())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let range = checked_range(self.data.len(), offset, data.len() as u64)?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }
}

pub(crate) fn checked_range(
    data_length: usize,
    offset: u64,
    length: u64,
) -> Result<std::ops::Range<usize>> {
    let end = offset
        .checked_add(length)
        .filter(|&end| end <= data_length as u64)
        .ok_or(Error::OutOfBounds { offset, length })?;
    Ok(offset as usize..end as usize)
}
