//! Rewriting a Vorbis stream's comment header in place
//!
//! The LyN engine expects one specific encoder vendor string in every
//! stream it loads. The repackager rebuilds the three header pages around a
//! synthesized comment packet and carries the audio pages over untouched,
//! apart from renumbering.

use super::{audio_start, first_packet, lacing, parse, write_page};

/// The vendor string the engine expects to find in the comment header
pub const VENDOR_STRING: &str = "Xiph.Org libVorbis I 20050304";

/// The segment budget of the rebuilt comment page
const COMMENT_PAGE_SEGMENTS: usize = 15;

/// The most setup bytes a single continuation page can carry
const SETUP_CHUNK_LEN: usize = 255 * 255;

/// Replace the comment header's vendor string with [`VENDOR_STRING`]
///
/// Audio pages keep their original flags, granule positions and segment
/// tables; only sequence numbers and checksums are reassigned. Any parse
/// inconsistency in the input returns it unchanged rather than emitting a
/// partial stream.
pub fn rewrite_vendor(input: &[u8]) -> Vec<u8> {
    try_rewrite(input).unwrap_or_else(|| input.to_vec())
}

fn try_rewrite(input: &[u8]) -> Option<Vec<u8>> {
    let pages = parse(input);
    if pages.len() < 3 {
        return None;
    }

    // The old comment packet is discarded, but it must at least be present
    first_packet(&pages, 1)?;
    let setup = first_packet(&pages, 2)?;

    let serial = pages[0].serial;
    let audio = audio_start(&pages);

    let mut output = Vec::with_capacity(input.len());

    // The identification header, re-laced on a beginning-of-stream page
    write_page(
        &mut output,
        0x02,
        0,
        serial,
        0,
        &lacing(pages[0].data.len()),
        &pages[0].data,
    );

    // The new comment packet shares page 1 with the head of the setup
    // packet, inside a fixed segment budget
    let comment = comment_packet();
    let comment_segments = comment.len().div_ceil(255) + 1;
    let budget = COMMENT_PAGE_SEGMENTS.saturating_sub(comment_segments) * 255;
    let head_len = setup.len().min(budget);

    let mut table = lacing(comment.len());
    table.extend(std::iter::repeat(255).take(head_len / 255));
    if head_len == setup.len() {
        table.push((head_len % 255) as u8);
    }
    // Otherwise head_len is a whole number of 255-byte segments and the
    // trailing 255 already marks the packet as continuing

    let mut body = comment;
    body.extend_from_slice(&setup[..head_len]);
    write_page(&mut output, 0x00, 0, serial, 1, &table, &body);

    let mut sequence = 2;

    // Whatever setup remains goes out on continuation pages
    if head_len < setup.len() {
        let mut rest = &setup[head_len..];
        while rest.len() >= SETUP_CHUNK_LEN {
            write_page(
                &mut output,
                0x01,
                0,
                serial,
                sequence,
                &[255; 255],
                &rest[..SETUP_CHUNK_LEN],
            );
            sequence += 1;
            rest = &rest[SETUP_CHUNK_LEN..];
        }

        write_page(
            &mut output,
            0x01,
            0,
            serial,
            sequence,
            &lacing(rest.len()),
            rest,
        );
        sequence += 1;
    }

    // Audio pages carry over verbatim, renumbered
    for page in &pages[audio..] {
        write_page(
            &mut output,
            page.header_type,
            page.granule_position,
            serial,
            sequence,
            &page.segment_table,
            &page.data,
        );
        sequence += 1;
    }

    Some(output)
}

/// Build the replacement comment packet: the target vendor, no user comments
///
/// The Vorbis framing bit that should close the header is deliberately not
/// appended; the engine's decoder accepts the packet without it.
fn comment_packet() -> Vec<u8> {
    let vendor = VENDOR_STRING.as_bytes();

    let mut packet = Vec::with_capacity(11 + vendor.len() + 4);
    packet.push(0x03);
    packet.extend_from_slice(b"vorbis");
    packet.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    packet.extend_from_slice(vendor);
    packet.extend_from_slice(&0u32.to_le_bytes());
    packet
}
