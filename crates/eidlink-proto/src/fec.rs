//! Forward error correction for satellite frames.
//!
//! Frames are protected with a systematic Reed-Solomon code over GF(2^6),
//! one field element per symbol. The encoder is a collaborator: radios with
//! a hardware coder implement [`FecEncoder`] themselves.

use crate::{
    bitwriter::SYMBOL_MASK,
    errors::{FrameError, Result},
};

/// Systematic block encoder producing parity symbols for a frame.
pub trait FecEncoder {
    /// Compute `parity.len()` parity symbols for `data`.
    ///
    /// Parity symbols come in pairs (each pair corrects one symbol error),
    /// so `parity.len()` is even. `parity` is only written on success.
    ///
    /// # Errors
    ///
    /// Implementations report unsupported sizes or malformed symbols as
    /// [`FrameError`].
    fn encode(&self, data: &[u8], parity: &mut [u8]) -> Result<()>;
}

impl<T: FecEncoder + ?Sized> FecEncoder for &T {
    fn encode(&self, data: &[u8], parity: &mut [u8]) -> Result<()> {
        (**self).encode(data, parity)
    }
}

/// Longest codeword in GF(2^6)
pub const MAX_CODEWORD: usize = 63;

/// x^6 + x + 1
const PRIMITIVE_POLY: u8 = 0x43;

struct Tables {
    exp: [u8; 2 * MAX_CODEWORD],
    log: [u8; MAX_CODEWORD + 1],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 2 * MAX_CODEWORD];
    let mut log = [0u8; MAX_CODEWORD + 1];

    let mut x: u8 = 1;
    let mut i = 0;
    while i < MAX_CODEWORD {
        exp[i] = x;
        exp[i + MAX_CODEWORD] = x;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x40 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }

    Tables { exp, log }
}

const TABLES: Tables = build_tables();

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    TABLES.exp[TABLES.log[a as usize] as usize + TABLES.log[b as usize] as usize]
}

fn gf_pow_alpha(power: usize) -> u8 {
    TABLES.exp[power % MAX_CODEWORD]
}

/// Reed-Solomon encoder over GF(2^6).
///
/// Primitive polynomial x^6 + x + 1, generator roots α^1 … α^2t. The
/// codeword is `data ‖ parity` with the first data symbol as the highest
/// degree coefficient.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReedSolomon64;

impl ReedSolomon64 {
    /// Generator polynomial for `parity` check symbols, highest degree first.
    /// Only the first `parity + 1` entries are meaningful.
    fn generator(parity: usize) -> [u8; MAX_CODEWORD + 1] {
        let mut generator = [0u8; MAX_CODEWORD + 1];
        generator[0] = 1;

        for root in 1..=parity {
            let alpha = gf_pow_alpha(root);
            // Multiply by (x + α^root), walking backwards so each step reads
            // the previous coefficients.
            for j in (1..=root).rev() {
                generator[j] ^= gf_mul(generator[j - 1], alpha);
            }
        }

        generator
    }
}

impl FecEncoder for ReedSolomon64 {
    fn encode(&self, data: &[u8], parity: &mut [u8]) -> Result<()> {
        let parity_len = parity.len();
        if parity_len % 2 != 0 || data.len() + parity_len > MAX_CODEWORD {
            return Err(FrameError::InvalidFecParameters { data: data.len(), parity: parity_len });
        }
        if let Some(&symbol) = data.iter().find(|&&symbol| symbol > SYMBOL_MASK) {
            return Err(FrameError::SymbolOutOfRange(symbol));
        }
        if parity_len == 0 {
            return Ok(());
        }

        let generator = Self::generator(parity_len);
        let mut remainder = [0u8; MAX_CODEWORD];

        for &symbol in data {
            let feedback = symbol ^ remainder[0];
            remainder.copy_within(1..parity_len, 0);
            remainder[parity_len - 1] = 0;
            if feedback != 0 {
                for (slot, &coefficient) in
                    remainder[..parity_len].iter_mut().zip(&generator[1..=parity_len])
                {
                    *slot ^= gf_mul(feedback, coefficient);
                }
            }
        }

        parity.copy_from_slice(&remainder[..parity_len]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evaluate a codeword (highest degree first) at α^power.
    fn evaluate(codeword: &[u8], power: usize) -> u8 {
        let x = gf_pow_alpha(power);
        codeword.iter().fold(0u8, |acc, &c| gf_mul(acc, x) ^ c)
    }

    fn codeword(data: &[u8], parity_len: usize) -> Vec<u8> {
        let mut parity = vec![0u8; parity_len];
        ReedSolomon64.encode(data, &mut parity).unwrap();
        let mut word = data.to_vec();
        word.extend_from_slice(&parity);
        word
    }

    #[test]
    fn field_tables_cover_every_nonzero_element() {
        let mut seen = [false; 64];
        for i in 0..MAX_CODEWORD {
            seen[TABLES.exp[i] as usize] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|&s| s), "x^6 + x + 1 must be primitive");
    }

    #[test]
    fn multiplication_matches_log_tables() {
        assert_eq!(gf_mul(1, 37), 37);
        assert_eq!(gf_mul(0, 37), 0);
        // α^5 * α = α^6 = α + 1
        assert_eq!(gf_mul(0b10_0000, 0b10), 0b11);
    }

    #[test]
    fn codeword_has_roots_at_generator_powers() {
        let data = [0, 21, 63, 1, 7, 42, 13, 5, 9, 33, 60, 2, 17];
        for parity_len in [4, 10, 12, 14, 16] {
            let word = codeword(&data, parity_len);
            for power in 1..=parity_len {
                assert_eq!(evaluate(&word, power), 0, "parity {parity_len}, root α^{power}");
            }
        }
    }

    #[test]
    fn corrupted_codeword_has_nonzero_syndrome() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
        let mut word = codeword(&data, 10);
        word[4] ^= 0b1;

        assert!((1..=10).any(|power| evaluate(&word, power) != 0));
    }

    #[test]
    fn all_zero_data_has_zero_parity() {
        let mut parity = [0xFFu8; 4];
        ReedSolomon64.encode(&[0, 0], &mut parity).unwrap();
        assert_eq!(parity, [0; 4]);
    }

    #[test]
    fn parity_symbols_fit_in_six_bits() {
        let data = [63u8; 30];
        let mut parity = [0u8; 16];
        ReedSolomon64.encode(&data, &mut parity).unwrap();
        assert!(parity.iter().all(|&p| p <= SYMBOL_MASK));
    }

    #[test]
    fn rejects_odd_parity_and_oversized_codewords() {
        let mut odd = [0u8; 3];
        assert_eq!(
            ReedSolomon64.encode(&[1, 2], &mut odd),
            Err(FrameError::InvalidFecParameters { data: 2, parity: 3 })
        );

        let mut parity = [0u8; 4];
        assert_eq!(
            ReedSolomon64.encode(&[0u8; 60], &mut parity),
            Err(FrameError::InvalidFecParameters { data: 60, parity: 4 })
        );
    }

    #[test]
    fn rejects_wide_symbols() {
        let mut parity = [0u8; 4];
        assert_eq!(
            ReedSolomon64.encode(&[1, 64], &mut parity),
            Err(FrameError::SymbolOutOfRange(64))
        );
    }
}
