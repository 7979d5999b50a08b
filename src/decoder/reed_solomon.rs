/// Reed-Solomon error correction for ECC 200 symbols
/// Data Matrix uses RS over GF(256) with primitive polynomial x^8 + x^5 + x^3 + x^2 + 1
/// and generator roots alpha^1 .. alpha^(n-k)
use crate::error::ReedSolomonError;

/// GF(256) field operations using log/exp tables
pub struct Gf256;

const PRIMITIVE: u16 = 0x12D;

const fn build_tables() -> ([u8; 512], [u8; 256]) {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    // Doubled so products of two logs never need a modulo
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    (exp, log)
}

const TABLES: ([u8; 512], [u8; 256]) = build_tables();
static EXP_TABLE: [u8; 512] = TABLES.0;
static LOG_TABLE: [u8; 256] = TABLES.1;

impl Gf256 {
    /// Field product
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
    }

    /// Field quotient; panics on division by zero
    pub fn div(a: u8, b: u8) -> u8 {
        if b == 0 {
            panic!("Division by zero");
        }
        if a == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + 255 - LOG_TABLE[b as usize] as usize]
    }

    /// alpha^n
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// a^n
    pub fn pow_usize(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        EXP_TABLE[(log_a * (n % 255)) % 255]
    }

    /// Evaluate a polynomial given in ascending coefficient order
    pub fn eval_ascending(poly: &[u8], x: u8) -> u8 {
        poly.iter().rev().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
    }
}

/// Reed-Solomon decoder for one codeword block
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for codes with `num_ecc_codewords` check codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Errors this code can correct
    pub fn capacity(&self) -> usize {
        self.num_ecc_codewords / 2
    }

    /// Correct `received` (data followed by check codewords) in place.
    ///
    /// Returns the number of codewords changed. On failure the buffer is left
    /// as it was.
    ///
    /// # Panics
    /// When `received` is not longer than the check codeword count or longer
    /// than 255.
    pub fn decode(&self, received: &mut [u8]) -> Result<usize, ReedSolomonError> {
        let n = received.len();
        assert!(
            n > self.num_ecc_codewords && n <= 255,
            "codeword length {n} invalid for {} check codewords",
            self.num_ecc_codewords
        );
        let failure = ReedSolomonError::TooManyErrors {
            capacity: self.capacity(),
        };

        let syndrome = self.calculate_syndrome(received);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let sigma = self.find_error_locator(&syndrome).ok_or(failure)?;
        let num_errors = sigma.len() - 1;
        if num_errors == 0 || num_errors > self.capacity() {
            return Err(failure);
        }

        let positions = self.find_error_positions(&sigma, n);
        if positions.len() != num_errors {
            return Err(failure);
        }

        let values = self
            .find_error_values(&sigma, &syndrome, &positions, n)
            .ok_or(failure)?;

        for (&pos, &value) in positions.iter().zip(&values) {
            received[pos] ^= value;
        }

        if self.calculate_syndrome(received).iter().any(|&s| s != 0) {
            for (&pos, &value) in positions.iter().zip(&values) {
                received[pos] ^= value;
            }
            return Err(failure);
        }

        Ok(values.iter().filter(|&&v| v != 0).count())
    }

    /// S_i = r(alpha^(i+1)), with `received[0]` the highest-order coefficient
    fn calculate_syndrome(&self, received: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|i| {
                let x = Gf256::exp(i + 1);
                received.iter().fold(0u8, |acc, &r| Gf256::mul(acc, x) ^ r)
            })
            .collect()
    }

    /// Berlekamp-Massey error locator, ascending coefficients trimmed to
    /// degree + 1. `None` when the locator degree disagrees with the register
    /// length, which only happens past the correction capacity.
    fn find_error_locator(&self, syndrome: &[u8]) -> Option<Vec<u8>> {
        let mut sigma = vec![1u8];
        let mut b = vec![1u8];
        let mut delta_b: u8 = 1;
        let mut l = 0usize;
        let mut m = 1usize;

        for i in 0..syndrome.len() {
            let mut delta = syndrome[i];
            for j in 1..sigma.len().min(i + 1) {
                delta ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }

            if delta == 0 {
                m += 1;
                continue;
            }

            let d = Gf256::div(delta, delta_b);
            let snapshot = sigma.clone();
            if sigma.len() < b.len() + m {
                sigma.resize(b.len() + m, 0);
            }
            // sigma = sigma - d * x^m * b
            for (j, &coeff) in b.iter().enumerate() {
                sigma[j + m] ^= Gf256::mul(d, coeff);
            }

            if 2 * l <= i {
                b = snapshot;
                delta_b = delta;
                l = i + 1 - l;
                m = 1;
            } else {
                m += 1;
            }
        }

        while sigma.len() > 1 && sigma[sigma.len() - 1] == 0 {
            sigma.pop();
        }
        (sigma.len() - 1 == l).then_some(sigma)
    }

    /// Chien search: position `pos` has locator X = alpha^(n-1-pos) and is an
    /// error when sigma(X^-1) = 0
    fn find_error_positions(&self, sigma: &[u8], n: usize) -> Vec<usize> {
        (0..n)
            .filter(|&pos| {
                let x_inv = Gf256::exp(255 - (n - 1 - pos) % 255);
                Gf256::eval_ascending(sigma, x_inv) == 0
            })
            .collect()
    }

    /// Forney with first consecutive root alpha^1:
    /// e_k = omega(X_k^-1) / sigma'(X_k^-1)
    fn find_error_values(
        &self,
        sigma: &[u8],
        syndrome: &[u8],
        error_positions: &[usize],
        n: usize,
    ) -> Option<Vec<u8>> {
        // omega = syndrome * sigma mod x^(n-k)
        let mut omega = vec![0u8; syndrome.len()];
        for (i, slot) in omega.iter_mut().enumerate() {
            for j in 0..=i.min(sigma.len() - 1) {
                *slot ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }
        }

        // Formal derivative keeps the odd terms
        let sigma_prime: Vec<u8> = sigma
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| if i % 2 == 1 { c } else { 0 })
            .collect();

        error_positions
            .iter()
            .map(|&pos| {
                let x_inv = Gf256::exp(255 - (n - 1 - pos) % 255);
                let denominator = Gf256::eval_ascending(&sigma_prime, x_inv);
                if denominator == 0 {
                    return None;
                }
                Some(Gf256::div(Gf256::eval_ascending(&omega, x_inv), denominator))
            })
            .collect()
    }
}

/// Systematic Reed-Solomon encoder with the same code parameters
pub struct ReedSolomonEncoder {
    /// Generator polynomial, descending, leading coefficient 1
    generator: Vec<u8>,
}

impl ReedSolomonEncoder {
    /// Encoder producing `num_ecc_codewords` check codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        let mut generator = vec![1u8];
        for i in 1..=num_ecc_codewords {
            let root = Gf256::exp(i);
            let mut next = vec![0u8; generator.len() + 1];
            for (k, &c) in generator.iter().enumerate() {
                next[k] ^= c;
                next[k + 1] ^= Gf256::mul(c, root);
            }
            generator = next;
        }
        Self { generator }
    }

    /// Check codewords for `data`
    pub fn ecc(&self, data: &[u8]) -> Vec<u8> {
        let num_ecc = self.generator.len() - 1;
        let mut remainder = vec![0u8; num_ecc];
        for &d in data {
            let factor = d ^ remainder[0];
            remainder.rotate_left(1);
            remainder[num_ecc - 1] = 0;
            for (r, &g) in remainder.iter_mut().zip(&self.generator[1..]) {
                *r ^= Gf256::mul(g, factor);
            }
        }
        remainder
    }

    /// `data` followed by its check codewords
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut codeword = data.to_vec();
        codeword.extend(self.ecc(data));
        codeword
    }
}
