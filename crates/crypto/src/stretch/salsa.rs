//! Salsa20 core functions used by the key stretcher
//!
//! The stretcher needs HSalsa20 with a caller-chosen constant and the bare
//! Salsa20/8 block function, neither of which the stream cipher crates
//! expose.

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

fn double_round(x: &mut [u32; 16]) {
    // columns
    quarter_round(x, 0, 4, 8, 12);
    quarter_round(x, 5, 9, 13, 1);
    quarter_round(x, 10, 14, 2, 6);
    quarter_round(x, 15, 3, 7, 11);
    // rows
    quarter_round(x, 0, 1, 2, 3);
    quarter_round(x, 5, 6, 7, 4);
    quarter_round(x, 10, 11, 8, 9);
    quarter_round(x, 15, 12, 13, 14);
}

fn load(bytes: &[u8], words: &mut [u32]) {
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

fn store(words: &[u32], bytes: &mut [u8]) {
    for (word, chunk) in words.iter().zip(bytes.chunks_exact_mut(4)) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

/// HSalsa20 with an explicit 16-byte constant
pub fn hsalsa20(input: &[u8; 16], key: &[u8; 32], constant: &[u8; 16]) -> [u8; 32] {
    let mut x = [0u32; 16];
    load(&constant[0..4], &mut x[0..1]);
    load(&key[0..16], &mut x[1..5]);
    load(&constant[4..8], &mut x[5..6]);
    load(input, &mut x[6..10]);
    load(&constant[8..12], &mut x[10..11]);
    load(&key[16..32], &mut x[11..15]);
    load(&constant[12..16], &mut x[15..16]);

    for _ in 0..10 {
        double_round(&mut x);
    }

    let words = [x[0], x[5], x[10], x[15], x[6], x[7], x[8], x[9]];
    let mut out = [0u8; 32];
    store(&words, &mut out);
    x.fill(0);
    out
}

/// Salsa20/8 block function with feed-forward, applied in place
pub fn core208(block: &mut [u8; 64]) {
    let mut input = [0u32; 16];
    load(block, &mut input);

    let mut x = input;
    for _ in 0..4 {
        double_round(&mut x);
    }
    for (out, word) in x.iter_mut().zip(input.iter()) {
        *out = out.wrapping_add(*word);
    }

    store(&x, block);
    x.fill(0);
    input.fill(0);
}
