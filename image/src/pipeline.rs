//! Per-image decryption pass: pick the `.text` and `.rodata` sections,
//! infer the stripe keys from the first two stripes of `.rodata`, and
//! reverse the striping in both sections.

use log::debug;

use crate::{
    key::{KeyGuess, KeyRecovery, MostCommonByte},
    stripe, Error, Image, Result, Section,
};

/// Architecture whose type model drives the format export when a release
/// bundles several variants.
pub const PRIMARY_ARCH: &str = "ARM64";

pub const DEFAULT_STRIPE_SIZE: u64 = 0x1000;

const TEXT_SECTION: &str = ".text";
const RODATA_SECTION: &str = ".rodata";

/// Drives decryption over the images of one multi-architecture release and
/// carries the preferred-architecture marker across them. Passes must not
/// interleave; the pipeline holds no other state between images.
pub struct Pipeline<K = MostCommonByte> {
    stripe_size: u64,
    key_recovery: K,
    preferred_arch: Option<String>,
}

impl Pipeline {
    /// Panics if `stripe_size` is zero.
    pub fn new(stripe_size: u64) -> Self {
        Self::with_key_recovery(stripe_size, MostCommonByte)
    }
}

impl<K: KeyRecovery> Pipeline<K> {
    /// Panics if `stripe_size` is zero.
    pub fn with_key_recovery(stripe_size: u64, key_recovery: K) -> Self {
        assert!(stripe_size > 0, "stripe size must be positive");
        Self {
            stripe_size,
            key_recovery,
            preferred_arch: None,
        }
    }

    pub fn preferred_arch(&self) -> Option<&str> {
        self.preferred_arch.as_deref()
    }

    pub fn is_preferred(&self, arch: &str) -> bool {
        self.preferred_arch.as_deref() == Some(arch)
    }

    /// Decrypts both striped sections of `image` in place. Returns whether
    /// the image was mutated; `Ok(false)` means the image has no `.text` or
    /// `.rodata` section and was skipped. After `Ok(true)` every downstream
    /// consumer must re-read the image bytes.
    pub fn process_image<I: Image + ?Sized>(&mut self, image: &mut I) -> Result<bool> {
        let arch = image.arch().to_string();
        if self.preferred_arch.is_none() || arch == PRIMARY_ARCH {
            self.preferred_arch = Some(arch.clone());
        }

        let Some((text, rodata)) = find_sections(image.sections()) else {
            debug!("no .rodata or .text section found in {arch} binary image");
            return Ok(false);
        };
        for section in [&text, &rodata] {
            if section.image_length == 0 {
                return Err(Error::EmptySection(section.name.clone()));
            }
        }

        // Both keys come from .rodata: the first (odd) block and the stripe
        // right after it. Even stripes are usually plain, in which case the
        // inferred key is 0x00 and XORing them is a no-op.
        let first_block_length = stripe::first_block_length(rodata.image_start, self.stripe_size);
        let odd = self.infer_key(image, &rodata, 0, first_block_length, "first")?;
        let even = self.infer_key(image, &rodata, first_block_length, self.stripe_size, "second")?;

        stripe::decrypt_section(
            image,
            &text,
            self.stripe_size,
            first_block_length,
            odd.key,
            even.key,
        )?;
        stripe::decrypt_section(
            image,
            &rodata,
            self.stripe_size,
            first_block_length,
            odd.key,
            even.key,
        )?;
        Ok(true)
    }

    fn infer_key<I: Image + ?Sized>(
        &self,
        image: &I,
        rodata: &Section,
        offset: u64,
        length: u64,
        which: &str,
    ) -> Result<KeyGuess> {
        let stripe = image.read(rodata.image_start + offset, length)?;
        let guess = self.key_recovery.recover(&stripe);
        debug!(
            "[{}] most common byte in {which} stripe of .rodata is {:#04x} with {} occurrences in {} bytes ({:.0}%)",
            image.arch(),
            guess.key,
            guess.count,
            guess.total,
            guess.ratio() * 100.0
        );
        Ok(guess)
    }
}

/// First `.text` and `.rodata` sections by name, in that order.
fn find_sections(sections: &[Section]) -> Option<(Section, Section)> {
    let find = |name: &str| {
        sections
            .iter()
            .find(|section| section.name == name)
            .cloned()
    };
    Some((find(TEXT_SECTION)?, find(RODATA_SECTION)?))
}
