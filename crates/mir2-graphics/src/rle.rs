//! WIS Run-Length Encoding (RLE) codec
//!
//! The packed stream is a sequence of two-byte orders `(count, value)`:
//!
//! - `count != 0`: a run, `value` repeated `count` times;
//! - `count == 0 && value != 0`: a literal block, the next `value` bytes are copied verbatim;
//! - `count == 0 && value == 0`: a marker found in corrupted archives, it produces nothing.
//!
//! Decoding never fails. Damaged streams are absorbed: orders overflowing the source or the
//! destination are truncated to what fits, and output not covered by the stream keeps its
//! initial value.

/// Decompresses `src` into a new buffer of exactly `unpacked_len` bytes.
pub fn unpack(src: &[u8], unpacked_len: usize) -> Vec<u8> {
    let mut dst = vec![0; unpacked_len];
    unpack_into(src, &mut dst);
    dst
}

/// Decompresses `src` into `dst`, stopping as soon as either side is exhausted.
///
/// Returns the number of bytes written to `dst`.
pub fn unpack_into(src: &[u8], dst: &mut [u8]) -> usize {
    let mut src_pos = 0;
    let mut dst_pos = 0;

    while src.len() - src_pos >= 2 && dst_pos < dst.len() {
        let count = usize::from(src[src_pos]);
        let value = src[src_pos + 1];
        src_pos += 2;

        if count != 0 {
            let n = count.min(dst.len() - dst_pos);
            dst[dst_pos..dst_pos + n].fill(value);
            dst_pos += n;
        } else if value != 0 {
            let n = usize::from(value).min(src.len() - src_pos).min(dst.len() - dst_pos);
            dst[dst_pos..dst_pos + n].copy_from_slice(&src[src_pos..src_pos + n]);
            dst_pos += n;
            src_pos += n;
        }
    }

    dst_pos
}

/// Compresses `src` into a stream accepted by [`unpack`].
///
/// Repeated bytes become runs; everything else is grouped in literal blocks of at most
/// 255 bytes.
pub fn pack(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 2 + 2);
    let mut pos = 0;

    while pos < src.len() {
        let run = run_length(&src[pos..]);

        if run >= 2 {
            out.push(run);
            out.push(src[pos]);
            pos += usize::from(run);
            continue;
        }

        let literal = literal_length(&src[pos..]);
        out.push(0);
        out.push(literal);
        out.extend_from_slice(&src[pos..pos + usize::from(literal)]);
        pos += usize::from(literal);
    }

    out
}

/// Length of the run of identical bytes at the start of `bytes`, capped to 255.
fn run_length(bytes: &[u8]) -> u8 {
    let mut run = 1u8;

    for &byte in bytes.iter().skip(1) {
        if byte != bytes[0] || run == u8::MAX {
            break;
        }
        run += 1;
    }

    run
}

/// Length of the literal block at the start of `bytes`: it ends right before the next pair
/// of identical bytes, and is capped to 255.
fn literal_length(bytes: &[u8]) -> u8 {
    let mut len = 1u8;

    while len < u8::MAX {
        let at = usize::from(len);

        match (bytes.get(at), bytes.get(at + 1)) {
            (None, _) => break,
            (Some(a), Some(b)) if a == b => break,
            _ => len += 1,
        }
    }

    len
}
