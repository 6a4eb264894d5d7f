//! Key stretching
//!
//! Converts a raw shared secret of any length into exactly the key and IV
//! lengths a cipher asks for. Longer secrets are compressed with BLAKE2b
//! (and MD5 for short tails), shorter ones are expanded with HSalsa20.
//!
//! [`derive_key`] passes exact-length secrets through untouched.
//! [`derive_key_hash`] additionally whitens the material, which suits secrets
//! with visible structure such as encoded curve points.
//!
//! Both functions are deterministic and never fail.

mod salsa;

pub use salsa::{core208, hsalsa20};

use crate::types::CipherBuffer;
use blake2::digest::consts::{U32, U48};
use blake2::{Blake2b, Blake2b512, Digest};
use md5::Md5;
use std::cmp::Ordering;
use zeroize::{Zeroize, Zeroizing};

/// Width of the expansion window
const WINDOW: usize = 16;

/// Width of one compressed chunk
const CHUNK: usize = 64;

const fn repeat<const N: usize>(pattern: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut i = 0;
    while i < N {
        out[i] = pattern[i % pattern.len()];
        i += 1;
    }
    out
}

/// Initial expansion counter
pub const SIGMA16: [u8; 16] = repeat(b"Expand 16-bytes key!");

/// HSalsa20 key used during expansion
pub const SIGMA32: [u8; 32] = repeat(b"Expand 32-bytes key!");

/// Fill `cb` from `raw`, copying exact-length secrets unchanged
pub fn derive_key(raw: &[u8], cb: &mut CipherBuffer) {
    if raw.len() == cb.total_len() {
        write(raw, cb);
        return;
    }
    let mut material = Zeroizing::new(vec![0u8; cb.total_len()]);
    resize(raw, &mut material);
    write(&material, cb);
}

/// Fill `cb` from `raw` and whiten the result
pub fn derive_key_hash(raw: &[u8], cb: &mut CipherBuffer) {
    let mut material = Zeroizing::new(vec![0u8; cb.total_len()]);
    resize(raw, &mut material);
    whiten(&mut material);
    write(&material, cb);
}

/// Stretch `raw` into a fresh key and IV
pub fn stretch(
    raw: &[u8],
    key_len: usize,
    iv_len: usize,
) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
    let mut cb = CipherBuffer::new(key_len, iv_len);
    derive_key(raw, &mut cb);
    cb.into_parts()
}

/// Like [`stretch`], with whitening
pub fn stretch_hashed(
    raw: &[u8],
    key_len: usize,
    iv_len: usize,
) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
    let mut cb = CipherBuffer::new(key_len, iv_len);
    derive_key_hash(raw, &mut cb);
    cb.into_parts()
}

fn resize(raw: &[u8], out: &mut [u8]) {
    if out.is_empty() {
        return;
    }
    match raw.len().cmp(&out.len()) {
        Ordering::Less => expand(raw, out),
        Ordering::Greater => shrink(raw, out),
        Ordering::Equal => out.copy_from_slice(raw),
    }
}

/// Key from the front of the material, IV as a copy of the key prefix
///
/// The IV never draws on the material past the key. IV bytes beyond the
/// key length stay zero.
fn write(material: &[u8], cb: &mut CipherBuffer) {
    let (key, iv) = cb.parts_mut();
    let key_len = key.len().min(material.len());
    key[..key_len].copy_from_slice(&material[..key_len]);

    let n = iv.len().min(key_len);
    iv[..n].copy_from_slice(&material[..n]);
}

/// Little-endian increment with carry
fn increment(counter: &mut [u8; 16]) {
    for byte in counter.iter_mut() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// Pad a secret shorter than the window with its own MD5 digest
fn widen(input: &[u8]) -> Zeroizing<Vec<u8>> {
    let digest = Md5::digest(input);
    let mut widened = Zeroizing::new(Vec::with_capacity(WINDOW));
    widened.extend_from_slice(input);
    widened.extend_from_slice(&digest[..WINDOW - input.len()]);
    widened
}

/// Requires `input.len() < out.len()`
fn expand(input: &[u8], out: &mut [u8]) {
    // Short secrets can never fill a whole window; widen them first.
    if input.len() < WINDOW && out.len() - input.len() >= WINDOW {
        let widened = widen(input);
        if widened.len() == out.len() {
            out.copy_from_slice(&widened);
        } else {
            expand(&widened, out);
        }
        return;
    }

    let mut counter = SIGMA16;
    let mut begin = input.len();
    let mut end = out.len();
    out[..begin].copy_from_slice(input);

    let mut window = [0u8; WINDOW];
    while end - begin >= WINDOW {
        if begin < WINDOW {
            if end <= input.len() {
                window.zeroize();
                return;
            }
            // Window exhausted: restart from the whole secret
            begin = input.len();
            increment(&mut counter);
            continue;
        }
        window.copy_from_slice(&input[begin - WINDOW..begin]);
        let mut block = hsalsa20(&window, &SIGMA32, &counter);
        out[end - 32..end].copy_from_slice(&block);
        block.zeroize();
        end -= 32;
        begin -= WINDOW;
    }
    window.zeroize();

    if end <= input.len() {
        return;
    }
    let gap = end - begin;
    if gap > 0 {
        let rest = if begin < WINDOW {
            &input[..begin]
        } else {
            &input[begin - WINDOW..begin]
        };
        let digest = Md5::digest(rest);
        out[begin..end].copy_from_slice(&digest[..gap]);
    }
}

/// Requires `input.len() > out.len() > 0`
fn shrink(input: &[u8], out: &mut [u8]) {
    let chunks = out.len().div_ceil(CHUNK);
    let width = input.len() / chunks;

    let mut input = input;
    let mut out = out;
    for _ in 1..chunks {
        let (head, tail) = std::mem::take(&mut out).split_at_mut(CHUNK);
        head.copy_from_slice(&Blake2b512::digest(&input[..width]));
        out = tail;
        input = &input[width..];
    }
    shrink_last(input, out);
}

/// Hash the remaining input with the narrowest digest covering `out`
fn shrink_last(input: &[u8], out: &mut [u8]) {
    let n = out.len();
    match n {
        0..=16 => out.copy_from_slice(&Md5::digest(input)[..n]),
        17..=32 => out.copy_from_slice(&Blake2b::<U32>::digest(input)[..n]),
        33..=48 => out.copy_from_slice(&Blake2b::<U48>::digest(input)[..n]),
        _ => out.copy_from_slice(&Blake2b512::digest(input)[..n]),
    }
}

/// Whole 64-byte blocks through Salsa20/8, a partial tail through BLAKE2b
fn whiten(buf: &mut [u8]) {
    let mut block = [0u8; CHUNK];
    let mut blocks = buf.chunks_exact_mut(CHUNK);
    for chunk in &mut blocks {
        block.copy_from_slice(chunk);
        core208(&mut block);
        chunk.copy_from_slice(&block);
    }
    block.zeroize();

    let tail = blocks.into_remainder();
    if !tail.is_empty() {
        let n = tail.len();
        tail.copy_from_slice(&Blake2b512::digest(&*tail)[..n]);
    }
}
