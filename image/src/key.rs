//! Heuristic recovery of the single-byte XOR keys protecting encrypted
//! stripes. No key material is present in the image; the key is inferred
//! from byte statistics alone.

/// An inferred key together with how often it was observed, so callers can
/// log how confident the guess is.
#[derive(Clone, Copy, Debug)]
pub struct KeyGuess {
    pub key: u8,
    pub count: usize,
    pub total: usize,
}

impl KeyGuess {
    /// Fraction of the sampled stripe the winning byte accounts for.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count as f64 / self.total as f64
        }
    }
}

/// Strategy recovering a stripe's XOR key from its encrypted bytes.
pub trait KeyRecovery {
    fn recover(&self, stripe: &[u8]) -> KeyGuess;
}

/// Assumes the plaintext is dominated by `0x00` (padding-heavy machine code
/// and read-only data, usually ~50% zero bytes). XOR with a single-byte key
/// preserves the frequency ranking, so the most common byte of the
/// ciphertext *is* the key. An unencrypted stripe yields `0x00`, which makes
/// the later XOR pass a no-op.
pub struct MostCommonByte;

impl KeyRecovery for MostCommonByte {
    fn recover(&self, stripe: &[u8]) -> KeyGuess {
        let (key, count) = most_common_byte(stripe);
        KeyGuess {
            key,
            count,
            total: stripe.len(),
        }
    }
}

/// Most frequent byte value and its occurrence count. Ties break to the
/// lowest byte value; an empty buffer yields `(0, 0)`.
pub fn most_common_byte(data: &[u8]) -> (u8, usize) {
    let mut counts = [0usize; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    let mut value = 0;
    let mut count = 0;
    for (byte, &byte_count) in counts.iter().enumerate() {
        if byte_count > count {
            value = byte as u8;
            count = byte_count;
        }
    }
    (value, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dominant_buffer() {
        let data = [0x00, 0x41, 0x00, 0x42, 0x00, 0x41, 0x00];
        assert_eq!(most_common_byte(&data), (0x00, 4));
    }

    #[test]
    fn xored_buffer_reveals_key() {
        let data = [0x00, 0x41, 0x00, 0x42, 0x00, 0x41, 0x00];
        let xored: Vec<u8> = data.iter().map(|byte| byte ^ 0x7F).collect();
        assert_eq!(most_common_byte(&xored), (0x7F, 4));
    }

    #[test]
    fn tie_breaks_to_lowest_value() {
        assert_eq!(most_common_byte(&[0x42, 0x17, 0x42, 0x17]), (0x17, 2));
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(most_common_byte(&[]), (0x00, 0));
    }

    #[test]
    fn recover_reports_confidence() {
        let guess = MostCommonByte.recover(&[0xAB, 0xAB, 0xAB, 0x01]);
        assert_eq!(guess.key, 0xAB);
        assert_eq!(guess.count, 3);
        assert_eq!(guess.total, 4);
        assert!((guess.ratio() - 0.75).abs() < f64::EPSILON);
    }
}
