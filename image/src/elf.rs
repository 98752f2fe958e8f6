//! ELF-backed [`Image`]. The section table and architecture tag are
//! snapshotted at parse time; afterwards the image is just a mutable byte
//! buffer, so decryption can rewrite ranges without re-parsing.

use object::{Architecture, Object, ObjectSection};

use crate::{checked_range, Error, Image, Result, Section};

pub struct ElfImage {
    arch: String,
    sections: Vec<Section>,
    data: Vec<u8>,
}

impl ElfImage {
    /// Parses `data` as a 32- or 64-bit ELF image. Anything else, including
    /// object files of an unknown machine, is [`Error::Unsupported`].
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let (arch, sections) = {
            let file = object::File::parse(data.as_slice())?;
            if !matches!(
                object::FileKind::parse(data.as_slice())?,
                object::FileKind::Elf32 | object::FileKind::Elf64
            ) {
                return Err(Error::Unsupported);
            }

            let arch = match file.architecture() {
                Architecture::Aarch64 => "ARM64",
                Architecture::Arm => "ARM",
                Architecture::X86_64 => "x64",
                Architecture::I386 => "x86",
                _ => return Err(Error::Unsupported),
            };
            let sections = file
                .sections()
                .filter_map(|section| {
                    let (image_start, image_length) = section.file_range()?;
                    Some(Section {
                        name: section.name().ok()?.to_string(),
                        image_start,
                        image_length,
                    })
                })
                .collect();
            (arch.to_string(), sections)
        };

        Ok(Self {
            arch,
            sections,
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Image for ElfImage {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_elf_input() {
        assert!(ElfImage::parse(b"MZ\x90\x00not an elf".to_vec()).is_err());
    }
}
