//! # Retrocompressor
//!
//! A lossless byte-stream compressor built from two stages:
//! * [`lz77`] — a sliding-window dictionary coder with a Boyer-Moore
//!   match-finder.
//! * [`huffman`] — a canonical Huffman entropy coder.
//!
//! [`compress`] runs `huffman(lz77(input))`; [`decompress`] runs the
//! inverse. Both bespoke wire formats are internal to this crate and
//! are not compatible with any standard compressed format.
//!
//! ## Buffer Example
//!
//! ```rs
//! use retrocompressor::{compress, decompress};
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = compress(test_data).expect("compression failed");
//! let restored = decompress(&compressed).expect("decompression failed");
//! assert_eq!(test_data, restored.as_slice());
//! ```

mod bitstream;
mod heap;
pub mod huffman;
pub mod lz77;
mod tools;

pub use huffman::{huffman_decode, huffman_encode};
pub use lz77::{lz77_decode, lz77_encode};

/// Errors raised by the compression core.
///
/// Each variant carries the byte offset into the *input being parsed*
/// at which the problem was detected, except [`Error::InputTooLarge`]
/// which has no single offset to report, and [`Error::Io`] which wraps
/// a file-handling failure at the CLI boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("corrupt LZ77 stream at byte offset {offset}")]
    CorruptStream { offset: usize },
    #[error("malformed Huffman header at byte offset {offset}")]
    MalformedHeader { offset: usize },
    #[error("unexpected end of bit stream at byte offset {offset}")]
    UnexpectedEndOfStream { offset: usize },
    #[error("input's symbol-frequency distribution requires a Huffman header width field wider than the format allows")]
    InputTooLarge,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Observational summary of one `compress`/`decompress` call. Never
/// affects the wire format; logged at `info` level for visibility into
/// what the coders actually did.
#[derive(Debug, Clone, Copy)]
pub struct CompressionStats {
    pub input_len: usize,
    pub output_len: usize,
}

impl std::fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes -> {} bytes ({:.1}%)",
            self.input_len,
            self.output_len,
            if self.input_len == 0 {
                0.0
            } else {
                100.0 * self.output_len as f64 / self.input_len as f64
            }
        )
    }
}

/// Compress `input`: `huffman_encode(lz77_encode(input))`.
pub fn compress(input: &[u8]) -> Result<Vec<u8>, Error> {
    let lz = lz77::lz77_encode(input)?;
    let out = huffman::huffman_encode(&lz)?;
    let stats = CompressionStats { input_len: input.len(), output_len: out.len() };
    log::info!("compress: {}", stats);
    Ok(out)
}

/// Decompress `input`: `lz77_decode(huffman_decode(input))`.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, Error> {
    let lz = huffman::huffman_decode(input)?;
    let out = lz77::lz77_decode(&lz)?;
    let stats = CompressionStats { input_len: input.len(), output_len: out.len() };
    log::info!("decompress: {}", stats);
    Ok(out)
}
