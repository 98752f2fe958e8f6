//! Stripe layout and in-place XOR of a section. Stripes are aligned to
//! absolute image offset 0, so a section not starting on a stripe boundary
//! begins with an oversized first block.

use crate::{Image, Result, Section};

/// Length of a section's first block: a full stripe, plus the partial
/// stripe needed to reach the next absolute stripe boundary when the
/// section does not start on one.
pub fn first_block_length(image_start: u64, stripe_size: u64) -> u64 {
    let remainder = image_start % stripe_size;
    if remainder == 0 {
        stripe_size
    } else {
        2 * stripe_size - remainder
    }
}

/// XORs a section stripe by stripe: the first block with `odd_key`, then
/// alternating `even_key`, `odd_key`, ... The first and last blocks are
/// clipped to the section, every other stripe is exactly `stripe_size`
/// bytes, and no byte outside the section is touched.
///
/// XOR is self-inverse, so running this twice with the same keys restores
/// the section.
pub fn decrypt_section<I: Image + ?Sized>(
    image: &mut I,
    section: &Section,
    stripe_size: u64,
    first_block_length: u64,
    odd_key: u8,
    even_key: u8,
) -> Result<()> {
    let start = section.image_start;
    let end = start + section.image_length;

    xor_stripe(image, start, first_block_length.min(section.image_length), odd_key)?;

    let mut odd = false;
    let mut position = start + first_block_length;
    while position < end {
        let size = stripe_size.min(end - position);
        xor_stripe(image, position, size, if odd { odd_key } else { even_key })?;
        odd = !odd;
        position += stripe_size;
    }
    Ok(())
}

fn xor_stripe<I: Image + ?Sized>(image: &mut I, offset: u64, length: u64, key: u8) -> Result<()> {
    let mut bytes = image.read(offset, length)?;
    for byte in bytes.iter_mut() {
        *byte ^= key;
    }
    image.write(offset, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawImage;

    fn image_with_section(start: u64, length: u64, total: usize) -> (RawImage, Section) {
        let data: Vec<u8> = (0..total).map(|index| index as u8).collect();
        let section = Section {
            name: ".rodata".to_string(),
            image_start: start,
            image_length: length,
        };
        (RawImage::new("ARM64", vec![section.clone()], data), section)
    }

    #[test]
    fn first_block_aligned_start() {
        assert_eq!(first_block_length(0, 0x1000), 0x1000);
    }

    #[test]
    fn first_block_unaligned_start() {
        assert_eq!(first_block_length(0x800, 0x1000), 0x1800);
    }

    #[test]
    fn decrypt_twice_is_identity() {
        let (mut image, section) = image_with_section(24, 70, 128);
        let original = image.data().to_vec();
        let first_block = first_block_length(section.image_start, 16);

        decrypt_section(&mut image, &section, 16, first_block, 0x5A, 0xC3).unwrap();
        assert_ne!(image.data(), original.as_slice());
        decrypt_section(&mut image, &section, 16, first_block, 0x5A, 0xC3).unwrap();
        assert_eq!(image.data(), original.as_slice());
    }

    #[test]
    fn covers_every_section_byte_exactly_once() {
        // XOR with 0xFF flips a byte; flipped-once means processed exactly
        // once, untouched means not processed at all.
        let (mut image, section) = image_with_section(24, 70, 128);
        let original = image.data().to_vec();
        let first_block = first_block_length(section.image_start, 16);

        decrypt_section(&mut image, &section, 16, first_block, 0xFF, 0xFF).unwrap();
        for (index, (&byte, &original_byte)) in
            image.data().iter().zip(original.iter()).enumerate()
        {
            let inside = (24..24 + 70).contains(&index);
            if inside {
                assert_eq!(byte, !original_byte, "byte {index} not processed exactly once");
            } else {
                assert_eq!(byte, original_byte, "byte {index} outside section was touched");
            }
        }
    }

    #[test]
    fn section_shorter_than_first_block() {
        let (mut image, section) = image_with_section(8, 10, 64);
        let original = image.data().to_vec();
        let first_block = first_block_length(section.image_start, 16);
        assert!(first_block > section.image_length);

        decrypt_section(&mut image, &section, 16, first_block, 0xFF, 0x00).unwrap();
        for (index, (&byte, &original_byte)) in
            image.data().iter().zip(original.iter()).enumerate()
        {
            if (8..18).contains(&index) {
                assert_eq!(byte, !original_byte);
            } else {
                assert_eq!(byte, original_byte);
            }
        }
    }

    #[test]
    fn alternates_keys_per_stripe() {
        // Section aligned to stripe 4: first block [0,4) odd, then even,
        // odd, even stripes.
        let (mut image, section) = image_with_section(0, 16, 16);
        let original = image.data().to_vec();

        decrypt_section(&mut image, &section, 4, first_block_length(0, 4), 0x10, 0x01).unwrap();
        let expected: Vec<u8> = original
            .iter()
            .enumerate()
            .map(|(index, &byte)| match index / 4 {
                0 | 2 => byte ^ 0x10,
                _ => byte ^ 0x01,
            })
            .collect();
        assert_eq!(image.data(), expected.as_slice());
    }
}
