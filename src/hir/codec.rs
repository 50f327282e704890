//! Binary stub codec.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header  : "WSTB" | u32 format_version
//! strings : u32 count | count × (u32 byte_len | utf8 bytes)
//! nodes   : pre-order, each
//!           u16 kind | u32 name_index | u32 flags
//!           | u32 range_start | u32 range_len | u32 child_count
//! ```
//!
//! Names are interned once per blob in first-use order and referenced by
//! index (`u32::MAX` = no name); a missing range stores `u32::MAX` as its
//! start. A version mismatch is reported as [`CodecError::StaleFormat`]
//! before anything past the header is read.

use indexmap::IndexSet;
use thiserror::Error;

use super::extract::MAX_STUB_DEPTH;
use super::stubs::{StubFlags, StubNode, StubTree};
use crate::base::{Interner, Name, TextRange, TextSize};
use crate::parser::SyntaxKind;

pub const MAGIC: [u8; 4] = *b"WSTB";

/// Covers both the grammar (kinds, flags, extraction table) and the byte layout.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;
const NODE_RECORD_LEN: usize = 2 + 4 * 5;
const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("not a stub blob (bad magic)")]
    BadMagic,
    #[error("stale stub format: blob has version {found}, expected {expected}")]
    StaleFormat { found: u32, expected: u32 },
    #[error("unexpected end of blob at byte {offset}")]
    UnexpectedEof { offset: usize },
    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("name index {index} out of range")]
    BadStringIndex { index: u32 },
    #[error("unknown syntax kind tag {raw}")]
    UnknownKind { raw: u16 },
    #[error("unknown flag bits {bits:#x}")]
    UnknownFlags { bits: u32 },
    #[error("invalid range {start}+{len}")]
    BadRange { start: u32, len: u32 },
    #[error("root stub must be a source file")]
    BadRoot,
    #[error("stub nesting exceeds {max} levels")]
    TooDeep { max: usize },
    #[error("{count} trailing bytes after the stub tree")]
    TrailingBytes { count: usize },
}

impl CodecError {
    /// The caller should rebuild from source rather than treat the blob as corrupt.
    pub fn is_stale(&self) -> bool {
        matches!(self, CodecError::StaleFormat { .. })
    }
}

// ============================================================================
// ENCODE
// ============================================================================

/// Encode a stub tree. Equal trees always encode to identical bytes.
pub fn encode(tree: &StubTree) -> Vec<u8> {
    let mut strings: IndexSet<&str> = IndexSet::new();
    collect_strings(tree.root(), &mut strings);

    let mut out = Vec::with_capacity(HEADER_LEN + (tree.len() + 1) * NODE_RECORD_LEN);
    out.extend_from_slice(&MAGIC);
    put_u32(&mut out, FORMAT_VERSION);

    put_u32(&mut out, strings.len() as u32);
    for s in &strings {
        put_u32(&mut out, s.len() as u32);
        out.extend_from_slice(s.as_bytes());
    }

    encode_node(tree.root(), &strings, &mut out);
    out
}

fn collect_strings<'a>(node: &'a StubNode, strings: &mut IndexSet<&'a str>) {
    if let Some(name) = node.name() {
        strings.insert(name);
    }
    for child in &node.children {
        collect_strings(child, strings);
    }
}

fn encode_node(node: &StubNode, strings: &IndexSet<&str>, out: &mut Vec<u8>) {
    out.extend_from_slice(&(node.kind as u16).to_le_bytes());
    let name_index = node
        .name()
        .and_then(|name| strings.get_index_of(name))
        .map_or(NONE, |i| i as u32);
    put_u32(out, name_index);
    put_u32(out, node.flags.bits());
    match node.range {
        Some(range) => {
            put_u32(out, range.start().into());
            put_u32(out, range.len().into());
        }
        None => {
            put_u32(out, NONE);
            put_u32(out, 0);
        }
    }
    put_u32(out, node.children.len() as u32);
    for child in &node.children {
        encode_node(child, strings, out);
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

// ============================================================================
// DECODE
// ============================================================================

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

/// Read just the format version, checking the magic.
pub fn peek_version(bytes: &[u8]) -> Result<u32, CodecError> {
    let mut reader = Reader { bytes, pos: 0 };
    if reader.take(4).map_err(|_| CodecError::BadMagic)? != MAGIC {
        return Err(CodecError::BadMagic);
    }
    reader.u32()
}

/// Decode a blob produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<StubTree, CodecError> {
    let version = peek_version(bytes)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::StaleFormat {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    let mut reader = Reader {
        bytes,
        pos: HEADER_LEN,
    };

    let count = reader.u32()? as usize;
    // Each string needs at least its length prefix
    let mut strings: Vec<Name> = Vec::with_capacity(count.min(reader.remaining() / 4));
    let mut interner = Interner::new();
    for index in 0..count {
        let len = reader.u32()? as usize;
        let raw = reader.take(len)?;
        let text = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8 { index })?;
        strings.push(interner.intern(text));
    }

    let root = decode_node(&mut reader, &strings, 0)?;
    if root.kind != SyntaxKind::SOURCE_FILE {
        return Err(CodecError::BadRoot);
    }
    if reader.remaining() > 0 {
        return Err(CodecError::TrailingBytes {
            count: reader.remaining(),
        });
    }
    Ok(StubTree::new(root))
}

fn decode_node(reader: &mut Reader<'_>, strings: &[Name], level: usize) -> Result<StubNode, CodecError> {
    if level > MAX_STUB_DEPTH {
        return Err(CodecError::TooDeep { max: MAX_STUB_DEPTH });
    }
    let raw_kind = reader.u16()?;
    let kind = SyntaxKind::from_raw(raw_kind)
        .filter(|kind| !kind.is_token())
        .ok_or(CodecError::UnknownKind { raw: raw_kind })?;

    let name_index = reader.u32()?;
    let name = if name_index == NONE {
        None
    } else {
        let name = strings
            .get(name_index as usize)
            .ok_or(CodecError::BadStringIndex { index: name_index })?;
        Some(name.clone())
    };

    let bits = reader.u32()?;
    let flags = StubFlags::from_bits(bits).ok_or(CodecError::UnknownFlags { bits })?;

    let start = reader.u32()?;
    let len = reader.u32()?;
    let range = if start == NONE {
        None
    } else {
        let end = start.checked_add(len).ok_or(CodecError::BadRange { start, len })?;
        Some(TextRange::new(TextSize::new(start), TextSize::new(end)))
    };

    let child_count = reader.u32()? as usize;
    let mut children = Vec::with_capacity(child_count.min(reader.remaining() / NODE_RECORD_LEN));
    for _ in 0..child_count {
        children.push(decode_node(reader, strings, level + 1)?);
    }

    let mut node = StubNode::new(kind, name, flags).with_children(children);
    node.range = range;
    Ok(node)
}
