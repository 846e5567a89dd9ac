//! LZ77 sliding-window coder.
//!
//! The match-finder is a Boyer-Moore backward search over the sliding
//! history, extending the pattern a byte at a time for as long as a
//! longer match keeps turning up. This is the same bad-character idea
//! `tools::search_pattern::SearchPattern` exists for, just driven here
//! instead of by a fixed needle.
//!
//! Blocks are framed as a signed 16-bit big-endian `id`: negative is a
//! match (offset, then a length byte), positive is a literal run of
//! `id` raw bytes, zero is illegal.

use crate::tools::history::{History, H};
use crate::tools::search_pattern::SearchPattern;
use crate::Error;

const MIN_MATCH: usize = 4;
const MAX_MATCH: usize = 255;

/// Search for `pattern` via `get`, a text accessor over the sliding
/// history extended virtually past its end by the bytes `pattern`
/// itself stands for. That lets a match start in real history and run
/// past it into bytes the decoder hasn't written yet but will have
/// produced by the time it gets there (self-overlapping copies, e.g.
/// offset -4 length 255 reproducing a repeated 4-byte run). Only
/// `start` positions inside real history (`start < max_start`) are
/// considered — a match cannot originate purely from self-reference.
fn bm_search(
    get: impl Fn(usize) -> u8,
    max_start: usize,
    pattern: &SearchPattern,
    start_from: usize,
) -> Option<usize> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }
    let mut start = start_from;
    while start < max_start {
        let mut pat_idx = m - 1;
        loop {
            let c = get(start + pat_idx);
            if c != pattern.byte(pat_idx) {
                let last = pattern.skip_at(c, pat_idx);
                start += ((pat_idx as i64 - last) as usize).max(1);
                break;
            }
            if pat_idx == 0 {
                return Some(start);
            }
            pat_idx -= 1;
        }
    }
    None
}

/// Find the longest match for `input[i..]` in `history`, extending the
/// pattern one byte at a time while a longer match keeps being found.
/// Returns `(offset, length)` with `offset < 0`, or `None` if no match
/// of at least `MIN_MATCH` bytes exists.
fn find_match(input: &[u8], i: usize, history: &History) -> Option<(isize, usize)> {
    if i + MIN_MATCH > input.len() {
        return None;
    }
    let hlen = history.len();
    let get = |idx: usize| -> u8 {
        if idx < hlen {
            history.get(idx)
        } else {
            input[i + (idx - hlen)]
        }
    };
    let mut pattern = SearchPattern::new(input[i..i + MIN_MATCH].to_vec());
    let mut start = bm_search(&get, hlen, &pattern, 0)?;
    let mut best_len = pattern.len();
    let mut best_start = start;
    loop {
        let next_len = pattern.len() + 1;
        if i + next_len > input.len() || next_len > MAX_MATCH {
            break;
        }
        pattern.push(input[i + next_len - 1]);
        match bm_search(&get, hlen, &pattern, start) {
            Some(found) => {
                start = found;
                best_len = pattern.len();
                best_start = found;
            }
            None => break,
        }
    }
    Some((best_start as isize - hlen as isize, best_len))
}

fn flush_literal(out: &mut Vec<u8>, lit: &mut Vec<u8>) {
    if lit.is_empty() {
        return;
    }
    let id = lit.len() as i16;
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(lit);
    log::debug!("lz77 literal block, {} bytes", lit.len());
    lit.clear();
}

fn emit_match(out: &mut Vec<u8>, offset: isize, length: usize) {
    let id = offset as i16;
    out.extend_from_slice(&id.to_be_bytes());
    out.push(length as u8);
    log::debug!("lz77 match block, offset {}, length {}", offset, length);
}

/// Encode `input` as a stream of LZ77 literal/match blocks.
pub fn lz77_encode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut history = History::new();
    let mut lit: Vec<u8> = Vec::new();
    let mut i = 0usize;
    while i < input.len() {
        if lit.len() >= H {
            flush_literal(&mut out, &mut lit);
        }
        match find_match(input, i, &history) {
            Some((offset, length)) => {
                flush_literal(&mut out, &mut lit);
                emit_match(&mut out, offset, length);
                for k in 0..length {
                    history.push(input[i + k]);
                }
                i += length;
            }
            None => {
                lit.push(input[i]);
                history.push(input[i]);
                i += 1;
            }
        }
    }
    flush_literal(&mut out, &mut lit);
    Ok(out)
}

/// Decode a stream of LZ77 literal/match blocks back into the original
/// bytes.
pub fn lz77_decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut history = History::new();
    let mut pos = 0usize;
    while input.len() - pos >= 2 {
        let id = i16::from_be_bytes([input[pos], input[pos + 1]]);
        pos += 2;
        if id == 0 {
            return Err(Error::CorruptStream { offset: pos - 2 });
        } else if id < 0 {
            let length = *input.get(pos).ok_or(Error::CorruptStream { offset: pos })? as usize;
            pos += 1;
            let target = history.total() as i64 + id as i64;
            if target < 0 {
                return Err(Error::CorruptStream { offset: pos });
            }
            for k in 0..length {
                let b = history
                    .get_at(target as u64 + k as u64)
                    .ok_or(Error::CorruptStream { offset: pos })?;
                out.push(b);
                history.push(b);
            }
        } else {
            let len = id as usize;
            let end = pos
                .checked_add(len)
                .filter(|&e| e <= input.len())
                .ok_or(Error::CorruptStream { offset: pos })?;
            let bytes = &input[pos..end];
            out.extend_from_slice(bytes);
            history.push_slice(bytes);
            pos = end;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only_round_trip() {
        let data = b"vennelige pennevenner";
        let encoded = lz77_encode(data).unwrap();
        assert_eq!(lz77_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn repeated_pair_emits_literal_then_match() {
        let data = b"ABABABABABAB"; // 12 bytes
        let encoded = lz77_encode(data).unwrap();
        // first block: literal "ABAB" (id = +4)
        assert_eq!(i16::from_be_bytes([encoded[0], encoded[1]]), 4);
        assert_eq!(&encoded[2..6], b"ABAB");
        // second block: match (id = -4, length = 8)
        assert_eq!(i16::from_be_bytes([encoded[6], encoded[7]]), -4);
        assert_eq!(encoded[8], 8);
        assert_eq!(lz77_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn long_run_splits_into_multiple_matches() {
        let data = vec![0u8; 1000];
        let encoded = lz77_encode(&data).unwrap();
        assert_eq!(lz77_decode(&encoded).unwrap(), data);
        // first block is a 4-byte literal, then matches of length <= 255
        assert_eq!(i16::from_be_bytes([encoded[0], encoded[1]]), 4);
        let mut pos = 6;
        let mut matched = 4usize;
        while pos < encoded.len() {
            let id = i16::from_be_bytes([encoded[pos], encoded[pos + 1]]);
            assert!(id < 0);
            let length = encoded[pos + 2] as usize;
            assert!((MIN_MATCH..=MAX_MATCH).contains(&length));
            matched += length;
            pos += 3;
        }
        assert_eq!(matched, data.len());
    }

    #[test]
    fn empty_round_trip() {
        assert_eq!(lz77_encode(&[]).unwrap(), Vec::<u8>::new());
        assert_eq!(lz77_decode(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn corrupt_zero_id_is_rejected() {
        let bytes = [0u8, 0u8];
        assert!(matches!(lz77_decode(&bytes), Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn truncated_literal_is_rejected() {
        // claims a 5-byte literal but only provides 2
        let bytes = [0u8, 5u8, b'a', b'b'];
        assert!(matches!(lz77_decode(&bytes), Err(Error::CorruptStream { .. })));
    }
}
