//! Word 97-2003 binary documents.
//!
//! The text of a `.doc` file lives in the `WordDocument` stream of an OLE2
//! compound file, split into pieces described by the piece table stored in
//! the `0Table` or `1Table` stream. The File Information Block at the start
//! of `WordDocument` says which table stream is in use and where the piece
//! table is.

use std::io::{Cursor, Read, Seek};

use cfb::CompoundFile;
use encoding_rs::{UTF_16LE, WINDOWS_1252};

use super::container::read_limited;
use crate::detect::is_cfb_bytes;
use crate::error::{Error, Result};

const WORD_DOCUMENT_STREAM: &str = "WordDocument";
const FIB_MAGIC: u16 = 0xA5EC;
const FLAG_USE_TABLE1: u16 = 0x0200;
const FLAG_ENCRYPTED: u16 = 0x0100;
/// Index of fcClx/lcbClx in the FibRgFcLcb array.
const CLX_PAIR_INDEX: usize = 33;
/// Piece descriptor bit marking 8-bit text.
const COMPRESSED_BIT: u32 = 0x4000_0000;
/// Shortest UTF-16 run kept by the binary scan.
const MIN_SCAN_RUN: usize = 4;

/// Fields of the File Information Block needed to locate the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fib {
    /// Whether the piece table lives in `1Table` rather than `0Table`
    pub use_table1: bool,
    /// Character count of the main document text
    pub ccp_text: u32,
    /// Offset of the CLX structure in the table stream
    pub fc_clx: u32,
    /// Size of the CLX structure
    pub lcb_clx: u32,
}

impl Fib {
    /// Parse the FIB at the start of a `WordDocument` stream.
    pub fn parse(word: &[u8]) -> Result<Self> {
        if read_u16(word, 0)? != FIB_MAGIC {
            return Err(Error::Conversion("WordDocument stream has no FIB".into()));
        }
        let flags = read_u16(word, 0x0A)?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(Error::Conversion("document is encrypted".into()));
        }

        let mut pos = 32usize;
        let csw = read_u16(word, pos)? as usize;
        pos += 2 + csw * 2;
        let cslw = read_u16(word, pos)? as usize;
        let rg_lw = pos + 2;
        pos += 2 + cslw * 4;
        let cb_rg_fc_lcb = read_u16(word, pos)? as usize;
        let rg_fc_lcb = pos + 2;

        if cslw < 4 || cb_rg_fc_lcb <= CLX_PAIR_INDEX {
            return Err(Error::Conversion("FIB is too short".into()));
        }

        let clx = rg_fc_lcb + CLX_PAIR_INDEX * 8;
        Ok(Self {
            use_table1: flags & FLAG_USE_TABLE1 != 0,
            ccp_text: read_u32(word, rg_lw + 3 * 4)?,
            fc_clx: read_u32(word, clx)?,
            lcb_clx: read_u32(word, clx + 4)?,
        })
    }

    /// Name of the table stream holding the piece table.
    pub fn table_stream_name(&self) -> &'static str {
        if self.use_table1 {
            "1Table"
        } else {
            "0Table"
        }
    }
}

/// One piece of document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// First character position
    pub cp_start: u32,
    /// One past the last character position
    pub cp_end: u32,
    /// Byte offset of the text in the `WordDocument` stream
    pub offset: u32,
    /// Whether the text is 8-bit (cp1252) rather than UTF-16LE
    pub compressed: bool,
}

/// Read the main document text of a binary Word file.
///
/// Streams longer than `max_stream_bytes` are rejected (0 = unlimited).
pub fn read_word_binary(bytes: &[u8], max_stream_bytes: usize) -> Result<String> {
    let mut file = CompoundFile::open(Cursor::new(bytes))
        .map_err(|e| Error::Conversion(format!("compound file: {}", e)))?;

    let word = read_stream(&mut file, WORD_DOCUMENT_STREAM, max_stream_bytes)?;
    let fib = Fib::parse(&word)?;
    let table = read_stream(&mut file, fib.table_stream_name(), max_stream_bytes)?;
    let pieces = parse_piece_table(&table, fib.fc_clx, fib.lcb_clx)?;

    Ok(normalize_word_text(&decode_pieces(&word, &pieces, fib.ccp_text)))
}

fn read_stream<F: Read + Seek>(
    file: &mut CompoundFile<F>,
    name: &str,
    limit: usize,
) -> Result<Vec<u8>> {
    let stream = file
        .open_stream(name)
        .map_err(|e| Error::Conversion(format!("stream {}: {}", name, e)))?;
    read_limited(stream, limit, &format!("stream {}", name))
}

/// Parse the piece table out of the CLX structure.
///
/// The CLX is any number of property entries (`0x01`) followed by exactly
/// one piece table entry (`0x02`).
pub fn parse_piece_table(table: &[u8], fc_clx: u32, lcb_clx: u32) -> Result<Vec<Piece>> {
    let start = fc_clx as usize;
    let clx = table
        .get(start..start + lcb_clx as usize)
        .ok_or_else(|| Error::Conversion("piece table lies outside the table stream".into()))?;

    let mut pos = 0usize;
    while pos < clx.len() {
        match clx[pos] {
            0x01 => {
                let cb = read_u16(clx, pos + 1)? as usize;
                pos += 3 + cb;
            }
            0x02 => {
                let lcb = read_u32(clx, pos + 1)? as usize;
                let plc = clx
                    .get(pos + 5..pos + 5 + lcb)
                    .ok_or_else(|| Error::Conversion("truncated piece table".into()))?;
                return parse_plc_pcd(plc);
            }
            other => {
                return Err(Error::Conversion(format!(
                    "unexpected CLX entry type 0x{:02x}",
                    other
                )))
            }
        }
    }

    Err(Error::Conversion("CLX has no piece table".into()))
}

fn parse_plc_pcd(plc: &[u8]) -> Result<Vec<Piece>> {
    if plc.len() < 4 {
        return Err(Error::Conversion("empty piece table".into()));
    }
    let count = (plc.len() - 4) / 12;
    let descriptors = (count + 1) * 4;

    (0..count)
        .map(|i| {
            let fc = read_u32(plc, descriptors + i * 8 + 2)?;
            let compressed = fc & COMPRESSED_BIT != 0;
            Ok(Piece {
                cp_start: read_u32(plc, i * 4)?,
                cp_end: read_u32(plc, (i + 1) * 4)?,
                offset: if compressed {
                    (fc & !COMPRESSED_BIT) / 2
                } else {
                    fc
                },
                compressed,
            })
        })
        .collect()
}

/// Decode pieces up to `ccp_text` characters (0 = no limit).
pub fn decode_pieces(word: &[u8], pieces: &[Piece], ccp_text: u32) -> String {
    let mut out = String::new();

    for piece in pieces {
        let end = if ccp_text > 0 {
            piece.cp_end.min(ccp_text)
        } else {
            piece.cp_end
        };
        if end <= piece.cp_start {
            continue;
        }
        let chars = (end - piece.cp_start) as usize;
        let len = if piece.compressed { chars } else { chars * 2 };
        let start = piece.offset as usize;
        let Some(slice) = word.get(start..start + len) else {
            continue;
        };

        let encoding = if piece.compressed {
            WINDOWS_1252
        } else {
            UTF_16LE
        };
        out.push_str(&encoding.decode_without_bom_handling(slice).0);
    }

    out
}

/// Turn Word control characters into plain text.
///
/// Paragraph marks and line or page breaks become newlines, cell marks
/// become tabs and a row mark (a second cell mark) ends the line. Field
/// instructions are removed and field results kept. Blank lines are
/// dropped.
pub fn normalize_word_text(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    // One entry per open field: true while still in its instruction part.
    let mut fields: Vec<bool> = Vec::new();
    let mut prev = '\0';

    for ch in raw.chars() {
        match ch {
            '\u{13}' => fields.push(true),
            '\u{14}' => {
                if let Some(last) = fields.last_mut() {
                    *last = false;
                }
            }
            '\u{15}' => {
                fields.pop();
            }
            _ if fields.iter().any(|&instruction| instruction) => {}
            '\r' | '\n' | '\u{0B}' | '\u{0C}' => cleaned.push('\n'),
            '\u{07}' => cleaned.push(if prev == '\u{07}' { '\n' } else { '\t' }),
            '\t' => cleaned.push('\t'),
            c if c < ' ' => {}
            c => cleaned.push(c),
        }
        prev = ch;
    }

    cleaned
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heuristic scan of a compound file for runs of printable UTF-16LE text.
///
/// Only applies to compound files; any other input is rejected rather than
/// scanned, since ASCII bytes read as UTF-16 look like CJK text.
pub fn scan_utf16_text(bytes: &[u8]) -> Result<String> {
    if !is_cfb_bytes(bytes) {
        return Err(Error::Conversion("not a compound file".into()));
    }

    let mut runs: Vec<String> = Vec::new();
    let mut current: Vec<u16> = Vec::new();

    let mut flush = |current: &mut Vec<u16>| {
        if current.len() >= MIN_SCAN_RUN {
            let text = String::from_utf16_lossy(current);
            if text.chars().any(char::is_alphanumeric) {
                runs.push(text.trim().to_string());
            }
        }
        current.clear();
    };

    for pair in bytes.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if is_printable_unit(unit) {
            current.push(if unit == 0x0D { 0x0A } else { unit });
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    let text = runs
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        return Err(Error::Conversion("no UTF-16 text found".into()));
    }
    Ok(text)
}

fn is_printable_unit(unit: u16) -> bool {
    match unit {
        0x09 | 0x0A | 0x0D => true,
        0x20..=0x7E => true,
        0xA0..=0xD7FF => true,
        0xF900..=0xFFFD => true,
        _ => false,
    }
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| Error::Conversion(format!("unexpected end of data at {}", offset)))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::Conversion(format!("unexpected end of data at {}", offset)))
}
