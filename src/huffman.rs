//! Canonical Huffman entropy coder.
//!
//! The header stores code lengths as a run of per-length counts rather
//! than one length per symbol: a `W`-bit width field followed by
//! `lengths[1], lengths[2], ...` each `W` bits wide, terminated by the
//! all-ones sentinel `2^W - 1`. The decoder rebuilds the same canonical
//! codes from the lengths plus the symbol list, so no codes are ever
//! transmitted directly. `W` itself is stored in a fixed
//! [`W_FIELD_BITS`]-bit meta-field — wide enough that a near-uniform
//! 256-symbol distribution (which concentrates almost all symbols at
//! one code length, forcing a large per-length count) still fits.
//!
//! A little-endian 32-bit plaintext length follows the histogram,
//! ahead of the symbol list, so the decoder knows exactly when to stop
//! pulling bits out of the final, zero-padded byte instead of guessing
//! from where the bit reader runs dry.

use std::collections::HashMap;

use crate::bitstream::{BitReader, BitWriter};
use crate::heap::{HuffNode, MinHeap};
use crate::Error;

/// `(symbol, code length)` pairs, sorted by `(length, symbol)` — the
/// canonical ordering the rest of this module assumes.
fn code_lengths(freq: &HashMap<u8, u64>) -> Vec<(u8, u8)> {
    if freq.len() == 1 {
        let symbol = *freq.keys().next().unwrap();
        return vec![(symbol, 1)];
    }
    let nodes: Vec<Box<HuffNode>> = freq
        .iter()
        .map(|(&symbol, &freq)| Box::new(HuffNode::Leaf { symbol, freq }))
        .collect();
    let mut heap = MinHeap::build_from(nodes);
    while heap.len() > 1 {
        let left = heap.pop_min().unwrap();
        let right = heap.pop_min().unwrap();
        let freq = left.freq() + right.freq();
        heap.push(Box::new(HuffNode::Internal { freq, left, right }));
    }
    let root = heap.pop_min().expect("non-empty frequency table yields a root");

    let mut lengths = Vec::with_capacity(freq.len());
    fn walk(node: &HuffNode, depth: u8, out: &mut Vec<(u8, u8)>) {
        match node {
            HuffNode::Leaf { symbol, .. } => out.push((*symbol, depth)),
            HuffNode::Internal { left, right, .. } => {
                walk(left, depth + 1, out);
                walk(right, depth + 1, out);
            }
        }
    }
    walk(&root, 0, &mut lengths);
    lengths.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    lengths
}

/// Width, in bits, of the meta-field that itself holds `W` (the width
/// of each length-count field). Must be wide enough to hold the worst
/// case `W` the retry loop below can produce: with up to 256 symbols
/// all sharing one code length, that length's count can reach 256, so
/// the sentinel needs `W` up to 9. Five bits (max value 31) leaves
/// comfortable headroom over that without ballooning the header.
const W_FIELD_BITS: u32 = 5;

/// `ceil(log2(max_length + 1))`.
fn width_for(max_length: u32) -> u32 {
    let mut w = 1;
    while (1u32 << w) < max_length + 1 {
        w += 1;
    }
    w
}

/// Pick the smallest per-length-count field width `W` such that no
/// actual count collides with the `2^W - 1` terminator sentinel.
///
/// `W` must itself fit in the fixed-width meta-field ([`W_FIELD_BITS`]
/// bits) that carries it in the header, so the search is bounded:
/// input distributions that would need a wider `W` than that field can
/// represent are rejected rather than silently truncated.
fn resolve_width(hist: &[u64]) -> Result<u32, Error> {
    let mut w = width_for(hist.len() as u32);
    loop {
        let sentinel = (1u64 << w) - 1;
        if hist.iter().any(|&c| c >= sentinel) {
            w += 1;
            if w >= (1 << W_FIELD_BITS) {
                return Err(Error::InputTooLarge);
            }
            continue;
        }
        return Ok(w);
    }
}

/// Histogram indexed by `length - 1`, i.e. `hist[0]` is the count of
/// length-1 codes.
fn histogram(lengths: &[(u8, u8)], max_length: u8) -> Vec<u64> {
    let mut hist = vec![0u64; max_length as usize];
    for &(_, length) in lengths {
        hist[(length - 1) as usize] += 1;
    }
    hist
}

/// Assign canonical codes to an already `(length, symbol)`-sorted
/// sequence of pairs.
fn canonical_codes(sorted: &[(u8, u8)]) -> HashMap<u8, (u32, u8)> {
    let mut table = HashMap::with_capacity(sorted.len());
    let mut code: u32 = 0;
    let mut prev_len = sorted[0].1;
    for (i, &(symbol, length)) in sorted.iter().enumerate() {
        if i > 0 {
            code = (code + 1) << (length - prev_len);
        }
        table.insert(symbol, (code, length));
        prev_len = length;
    }
    table
}

struct TrieNode {
    symbol: Option<u8>,
    children: [Option<Box<TrieNode>>; 2],
}

impl TrieNode {
    fn empty() -> Self {
        Self { symbol: None, children: [None, None] }
    }
}

fn build_trie(table: &HashMap<u8, (u32, u8)>) -> TrieNode {
    let mut root = TrieNode::empty();
    for (&symbol, &(code, length)) in table {
        let mut node = &mut root;
        for bit_pos in (0..length).rev() {
            let bit = ((code >> bit_pos) & 1) as usize;
            node = node.children[bit].get_or_insert_with(|| Box::new(TrieNode::empty()));
        }
        node.symbol = Some(symbol);
    }
    root
}

/// Encode `input` into a canonical-Huffman-coded byte stream.
pub fn huffman_encode(input: &[u8]) -> Result<Vec<u8>, Error> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut freq: HashMap<u8, u64> = HashMap::new();
    for &b in input {
        *freq.entry(b).or_insert(0) += 1;
    }
    let lengths = code_lengths(&freq);
    let max_length = lengths.iter().map(|&(_, l)| l).max().unwrap();

    let hist = histogram(&lengths, max_length);
    let w = resolve_width(&hist)?;

    let mut writer = BitWriter::new();
    writer.append_fixed(w, W_FIELD_BITS);
    for &count in &hist {
        writer.append_fixed(count as u32, w);
    }
    writer.append_fixed(((1u64 << w) - 1) as u32, w);
    writer.fill_byte();
    for byte in (input.len() as u32).to_le_bytes() {
        writer.append_fixed(byte as u32, 8);
    }
    for &(symbol, _) in &lengths {
        writer.append_fixed(symbol as u32, 8);
    }

    let table = canonical_codes(&lengths);
    for &b in input {
        let (code, length) = table[&b];
        writer.append_fixed(code, length as u32);
    }

    log::info!(
        "huffman header: {} distinct symbols, max code length {}",
        lengths.len(),
        max_length
    );
    Ok(writer.finalize())
}

/// Decode a canonical-Huffman-coded byte stream produced by
/// [`huffman_encode`].
pub fn huffman_decode(input: &[u8]) -> Result<Vec<u8>, Error> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = BitReader::new(input);
    let w = reader.read_fixed(W_FIELD_BITS)?;
    if w == 0 {
        return Err(Error::MalformedHeader { offset: reader.byte_offset() });
    }
    let sentinel = (1u32 << w) - 1;

    let mut hist: Vec<u64> = Vec::new();
    loop {
        let count = reader.read_fixed(w)?;
        if count == sentinel {
            break;
        }
        hist.push(count as u64);
        if hist.len() > 255 {
            return Err(Error::MalformedHeader { offset: reader.byte_offset() });
        }
    }
    reader.fill_byte();

    let len_bytes = reader.read_bytes(4)?;
    let payload_len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

    let total_symbols: u64 = hist.iter().sum();
    if total_symbols == 0 || total_symbols > 256 {
        return Err(Error::MalformedHeader { offset: reader.byte_offset() });
    }

    let max_length = hist.len() as u32;
    let mut kraft_numerator: u128 = 0;
    for (i, &count) in hist.iter().enumerate() {
        let length = (i + 1) as u32;
        kraft_numerator += (count as u128) << (max_length - length);
    }
    if kraft_numerator > (1u128 << max_length) {
        return Err(Error::MalformedHeader { offset: reader.byte_offset() });
    }

    let symbols = reader.read_bytes(total_symbols as usize)?;
    let mut lengths_seq: Vec<u8> = Vec::with_capacity(total_symbols as usize);
    for (i, &count) in hist.iter().enumerate() {
        for _ in 0..count {
            lengths_seq.push((i + 1) as u8);
        }
    }
    let sorted: Vec<(u8, u8)> = symbols.into_iter().zip(lengths_seq).collect();
    let table = canonical_codes(&sorted);
    let trie = build_trie(&table);

    let mut out = Vec::with_capacity(payload_len);
    let mut node = &trie;
    while out.len() < payload_len {
        let bit = reader.read_bit()?;
        node = match node.children[bit as usize].as_deref() {
            Some(n) => n,
            None => return Err(Error::CorruptStream { offset: reader.byte_offset() }),
        };
        if let Some(symbol) = node.symbol {
            out.push(symbol);
            node = &trie;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_round_trip() {
        assert_eq!(huffman_encode(&[]).unwrap(), Vec::<u8>::new());
        assert_eq!(huffman_decode(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn single_symbol_round_trip() {
        for b in [0u8, 1, 255] {
            let data = vec![b; 50];
            let encoded = huffman_encode(&data).unwrap();
            assert_eq!(huffman_decode(&encoded).unwrap(), data);
        }
    }

    #[test]
    fn multi_symbol_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        let encoded = huffman_encode(&data).unwrap();
        assert_eq!(huffman_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn skewed_distribution_round_trip() {
        let mut data = vec![b'a'; 1000];
        data.extend(vec![b'b'; 10]);
        data.extend(vec![b'c'; 1]);
        let encoded = huffman_encode(&data).unwrap();
        assert_eq!(huffman_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn all_256_symbols_round_trip() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2000).collect();
        let encoded = huffman_encode(&data).unwrap();
        assert_eq!(huffman_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn canonical_table_is_kraft_tight() {
        let data = b"mississippi river".to_vec();
        let mut freq = HashMap::new();
        for &b in &data {
            *freq.entry(b).or_insert(0u64) += 1;
        }
        let lengths = code_lengths(&freq);
        let kraft: f64 = lengths.iter().map(|&(_, l)| 2f64.powi(-(l as i32))).sum();
        assert!(kraft <= 1.0 + 1e-9);
    }

    #[test]
    fn malformed_header_zero_width_is_rejected() {
        let bytes = [0u8; 4];
        assert!(matches!(huffman_decode(&bytes), Err(Error::MalformedHeader { .. })));
    }

    #[test]
    fn near_uniform_256_symbol_distribution_round_trips() {
        // Equal frequencies across all 256 symbols collapse the
        // canonical tree to one dominant code length, whose count (256)
        // would overflow a 3-bit-wide `W` field if left unguarded.
        let mut data = Vec::with_capacity(256 * 50);
        for b in 0u8..=255 {
            data.extend(std::iter::repeat(b).take(50));
        }
        let encoded = huffman_encode(&data).unwrap();
        assert_eq!(huffman_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn resolve_width_rejects_counts_too_large_for_the_width_field() {
        let hist = vec![5_000_000_000u64];
        assert!(matches!(resolve_width(&hist), Err(Error::InputTooLarge)));
    }
}
