//! # Canonical Wire Codec
//!
//! Hand-written, bit-exact serialization for consensus data. Decoding is
//! strict: unknown tags, non-minimal compact-sizes, padded integer widths
//! and trailing bytes all fail. For every valid value `x`,
//! `decode(encode(x)) == x` and `encode` is the unique byte form.
//!
//! Header layout:
//!
//! ```text
//! features  (i32, LE)
//! prev_hash (32 bytes)
//! merkle_root (32 bytes)
//! im_merkle_root (32 bytes)
//! time      (u32, LE)
//! xfield    [tag: 1][length: compact-size][payload: length bytes]
//!           tag 0 carries no length and no payload
//! proof     [length: compact-size][bytes]   (absent from the signing digest)
//! ```

use sha2::{Digest, Sha256};

use crate::entities::{Block, BlockHeader, Hash};
use crate::errors::DecodeError;
use crate::xfield::{AggPubKey, XField, XFieldKind, AGG_PUBKEY_LEN, MAX_BLOCK_SIZE_LEN};

/// Double SHA-256, the digest used for block ids and signing digests.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

// =============================================================================
// READER
// =============================================================================

/// Cursor over an input slice with strict bounds checking.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof { at: self.buf.len() });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32_le()? as i32)
    }

    fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    fn read_hash(&mut self) -> Result<Hash, DecodeError> {
        let bytes = self.take(32)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(bytes);
        Ok(hash)
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.remaining() != 0 {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(())
    }
}

// =============================================================================
// COMPACT SIZE
// =============================================================================

/// Append a compact-size in its unique minimal form.
pub fn write_compact_size(n: u64, out: &mut Vec<u8>) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Read a compact-size, rejecting any non-minimal encoding.
fn read_compact_size(r: &mut Reader<'_>) -> Result<u64, DecodeError> {
    let first = r.read_u8()?;
    let value = match first {
        0xfd => {
            let v = u64::from(r.read_u16_le()?);
            if v < 0xfd {
                return Err(DecodeError::NonCanonicalCompactSize);
            }
            v
        }
        0xfe => {
            let v = u64::from(r.read_u32_le()?);
            if v <= 0xffff {
                return Err(DecodeError::NonCanonicalCompactSize);
            }
            v
        }
        0xff => {
            let v = r.read_u64_le()?;
            if v <= 0xffff_ffff {
                return Err(DecodeError::NonCanonicalCompactSize);
            }
            v
        }
        _ => u64::from(first),
    };
    Ok(value)
}

/// Read a length-prefixed byte vector, bounding the length by the input.
fn read_bytes(r: &mut Reader<'_>) -> Result<Vec<u8>, DecodeError> {
    let len = read_compact_size(r)?;
    if len > r.remaining() as u64 {
        return Err(DecodeError::LengthOverflow(len));
    }
    Ok(r.take(len as usize)?.to_vec())
}

// =============================================================================
// XFIELD
// =============================================================================

/// Append the xfield region.
pub fn encode_xfield(xfield: &XField, out: &mut Vec<u8>) {
    out.push(xfield.kind().tag());
    match xfield {
        XField::None => {}
        XField::AggregatePubKey(key) => {
            write_compact_size(AGG_PUBKEY_LEN as u64, out);
            out.extend_from_slice(&key.0);
        }
        XField::MaxBlockSize(size) => {
            write_compact_size(MAX_BLOCK_SIZE_LEN as u64, out);
            out.extend_from_slice(&size.to_le_bytes());
        }
    }
}

/// Decode the xfield region, enforcing the canonical payload width per tag.
fn read_xfield(r: &mut Reader<'_>) -> Result<XField, DecodeError> {
    let tag = r.read_u8()?;
    let kind = XFieldKind::from_tag(tag).ok_or(DecodeError::UnknownXFieldTag(tag))?;
    match kind {
        XFieldKind::None => Ok(XField::None),
        XFieldKind::AggregatePubKey => {
            let len = read_compact_size(r)?;
            if len != AGG_PUBKEY_LEN as u64 {
                return Err(DecodeError::BadXFieldLength {
                    expected: AGG_PUBKEY_LEN,
                    got: len,
                });
            }
            let payload = r.take(AGG_PUBKEY_LEN)?;
            let key = AggPubKey::from_slice(payload)
                .ok_or(DecodeError::BadPubKeyPrefix(payload[0]))?;
            Ok(XField::AggregatePubKey(key))
        }
        XFieldKind::MaxBlockSize => {
            // The integer width is fixed; any other length is a padded or
            // truncated encoding and fails the parse outright.
            let len = read_compact_size(r)?;
            if len != MAX_BLOCK_SIZE_LEN as u64 {
                return Err(DecodeError::BadXFieldLength {
                    expected: MAX_BLOCK_SIZE_LEN,
                    got: len,
                });
            }
            let bytes = r.take(MAX_BLOCK_SIZE_LEN)?;
            Ok(XField::MaxBlockSize(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])))
        }
    }
}

/// Decode a standalone xfield region, requiring full consumption.
pub fn decode_xfield(bytes: &[u8]) -> Result<XField, DecodeError> {
    let mut r = Reader::new(bytes);
    let xfield = read_xfield(&mut r)?;
    r.finish()?;
    Ok(xfield)
}

// =============================================================================
// HEADER / BLOCK
// =============================================================================

fn encode_header_common(header: &BlockHeader, out: &mut Vec<u8>) {
    out.extend_from_slice(&header.features.to_le_bytes());
    out.extend_from_slice(&header.prev_hash);
    out.extend_from_slice(&header.merkle_root);
    out.extend_from_slice(&header.im_merkle_root);
    out.extend_from_slice(&header.time.to_le_bytes());
    encode_xfield(&header.xfield, out);
}

/// Serialize the full header, proof included.
pub fn encode_header(header: &BlockHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(128 + header.proof.len());
    encode_header_common(header, &mut out);
    write_compact_size(header.proof.len() as u64, &mut out);
    out.extend_from_slice(&header.proof);
    out
}

/// Serialize the header with the proof excluded: the signing preimage.
pub fn encode_header_for_sign(header: &BlockHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    encode_header_common(header, &mut out);
    out
}

fn read_header(r: &mut Reader<'_>) -> Result<BlockHeader, DecodeError> {
    let features = r.read_i32_le()?;
    let prev_hash = r.read_hash()?;
    let merkle_root = r.read_hash()?;
    let im_merkle_root = r.read_hash()?;
    let time = r.read_u32_le()?;
    let xfield = read_xfield(r)?;
    let proof = read_bytes(r)?;
    Ok(BlockHeader {
        features,
        prev_hash,
        merkle_root,
        im_merkle_root,
        time,
        xfield,
        proof,
    })
}

/// Decode a header, requiring full consumption of the input.
pub fn decode_header(bytes: &[u8]) -> Result<BlockHeader, DecodeError> {
    let mut r = Reader::new(bytes);
    let header = read_header(&mut r)?;
    r.finish()?;
    Ok(header)
}

/// Serialize a block: header, then a compact-size transaction count, then
/// each transaction as a length-prefixed byte string.
pub fn encode_block(block: &Block) -> Vec<u8> {
    let mut out = encode_header(&block.header);
    write_compact_size(block.transactions.len() as u64, &mut out);
    for tx in &block.transactions {
        write_compact_size(tx.len() as u64, &mut out);
        out.extend_from_slice(tx);
    }
    out
}

/// Decode a block, requiring full consumption of the input.
pub fn decode_block(bytes: &[u8]) -> Result<Block, DecodeError> {
    let mut r = Reader::new(bytes);
    let header = read_header(&mut r)?;
    let count = read_compact_size(&mut r)?;
    if count > r.remaining() as u64 {
        return Err(DecodeError::LengthOverflow(count));
    }
    let mut transactions = Vec::with_capacity(count as usize);
    for _ in 0..count {
        transactions.push(read_bytes(&mut r)?);
    }
    r.finish()?;
    Ok(Block {
        header,
        transactions,
    })
}
