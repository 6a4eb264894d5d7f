//! Final-block padding for block-mode streams
//!
//! The pad region starts with a zero byte. Any remaining bytes are written as
//! runs: full runs of 255 bytes valued 255, then one run whose bytes equal
//! its own length. Unpadding peels runs off the end until it meets the zero.

use tracing::warn;

/// Fill the pad region of the final block
///
/// `region` covers the bytes after the plaintext remainder and is never
/// empty for a block-sized buffer.
pub fn pad(region: &mut [u8]) {
    let Some((first, mut rest)) = region.split_first_mut() else {
        return;
    };
    *first = 0;
    while rest.len() > 255 {
        let (run, tail) = std::mem::take(&mut rest).split_at_mut(255);
        run.fill(255);
        rest = tail;
    }
    let run = rest.len() as u8;
    rest.fill(run);
}

/// Length of the plaintext in a padded final block
///
/// Malformed padding yields zero and a warning rather than an error.
pub fn unpad(block: &[u8]) -> usize {
    let mut len = block.len();
    while len > 0 {
        let run = block[len - 1] as usize;
        if run == 0 {
            return len - 1;
        }
        if len <= run {
            warn!(len = block.len(), run, "malformed block padding, dropping final block");
            return 0;
        }
        len -= run;
    }
    0
}
