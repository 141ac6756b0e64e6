//! Ogg bitstream parsing and page emission
//!
//! Just enough of the Ogg framing layer to pull packets out of an encoder's
//! output and write well-formed pages back: no seeking, no multiplexed
//! streams, one serial per file.

mod crc;
mod repack;

pub use repack::{rewrite_vendor, VENDOR_STRING};

const MAGIC: &[u8; 4] = b"OggS";

/// The fixed part of a page header, up to and including the segment count
const HEADER_LEN: usize = 27;

/// One parsed Ogg page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Continuation/beginning/end flags
    pub header_type: u8,

    /// The codec-defined position marker, -1 meaning "no packet ends here"
    pub granule_position: i64,

    /// The logical bitstream this page belongs to
    pub serial: u32,

    /// The page's position in its bitstream
    pub sequence: u32,

    /// The lacing values describing how [`Page::data`] splits into segments
    pub segment_table: Vec<u8>,

    /// The concatenated segment bodies
    pub data: Vec<u8>,
}

/// Parse consecutive pages from the start of a buffer
///
/// Parsing stops cleanly at the first missing magic, short header or
/// truncated body; whatever was complete up to that point is returned.
pub fn parse(bytes: &[u8]) -> Vec<Page> {
    let mut pages = Vec::new();

    let mut offset = 0;
    while offset + HEADER_LEN <= bytes.len() {
        if &bytes[offset..offset + 4] != MAGIC {
            break;
        }

        let header_type = bytes[offset + 5];
        let granule_position =
            i64::from_le_bytes(bytes[offset + 6..offset + 14].try_into().unwrap());
        let serial = u32::from_le_bytes(bytes[offset + 14..offset + 18].try_into().unwrap());
        let sequence = u32::from_le_bytes(bytes[offset + 18..offset + 22].try_into().unwrap());
        let segment_count = bytes[offset + 26] as usize;

        let table_end = offset + HEADER_LEN + segment_count;
        if table_end > bytes.len() {
            break;
        }

        let segment_table = bytes[offset + HEADER_LEN..table_end].to_vec();
        let body_len: usize = segment_table.iter().map(|&value| value as usize).sum();
        if table_end + body_len > bytes.len() {
            break;
        }

        pages.push(Page {
            header_type,
            granule_position,
            serial,
            sequence,
            segment_table,
            data: bytes[table_end..table_end + body_len].to_vec(),
        });

        offset = table_end + body_len;
    }

    pages
}

/// Concatenate segments from `start_page` onward until one terminates a packet
///
/// Returns the first packet whose final segment (any lacing value below 255)
/// lies at or after `start_page`, or [`None`] if no packet terminates before
/// the pages run out.
pub fn first_packet(pages: &[Page], start_page: usize) -> Option<Vec<u8>> {
    let mut packet = Vec::new();

    for page in pages.get(start_page..)? {
        let mut offset = 0;
        for &segment in &page.segment_table {
            packet.extend_from_slice(&page.data[offset..offset + segment as usize]);
            offset += segment as usize;

            if segment < 255 {
                return Some(packet);
            }
        }
    }

    None
}

/// Find the index of the first audio page
///
/// A page qualifies if it is not a continuation, carries a positive granule
/// position and does not open with a setup-packet marker byte. Streams where
/// nothing qualifies fall back to the first positive granule position, then
/// to page 3 (or the page count, whichever is smaller).
pub fn audio_start(pages: &[Page]) -> usize {
    pages
        .iter()
        .position(|page| {
            page.header_type & 0x01 == 0
                && page.granule_position > 0
                && page.data.first() != Some(&0x05)
        })
        .or_else(|| pages.iter().position(|page| page.granule_position > 0))
        .unwrap_or(pages.len().min(3))
}

/// The standard lacing for a packet of `len` bytes starting a fresh page
///
/// Chains of 255 followed by one final segment below 255 (possibly zero).
pub(crate) fn lacing(len: usize) -> Vec<u8> {
    let mut table = vec![255; len / 255];
    table.push((len % 255) as u8);
    table
}

/// Serialize one page onto `out`, computing its checksum in place
pub(crate) fn write_page(
    out: &mut Vec<u8>,
    header_type: u8,
    granule_position: i64,
    serial: u32,
    sequence: u32,
    segment_table: &[u8],
    data: &[u8],
) {
    let start = out.len();

    out.extend_from_slice(MAGIC);
    out.push(0);
    out.push(header_type);
    out.extend_from_slice(&granule_position.to_le_bytes());
    out.extend_from_slice(&serial.to_le_bytes());
    out.extend_from_slice(&sequence.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.push(segment_table.len() as u8);
    out.extend_from_slice(segment_table);
    out.extend_from_slice(data);

    let checksum = crc::checksum(&out[start..]);
    out[start + 22..start + 26].copy_from_slice(&checksum.to_le_bytes());
}
