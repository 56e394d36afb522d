//! Read-only SEM accessors: embedded TIFF headers and PNG thumbnails
//!
//! Every failure here reduces to `None`.

use base64::Engine;
use htmdec_common::models::{Item, StoredFile};
use image::{DynamicImage, ImageOutputFormat};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tiff::decoder::{ifd::Value, Decoder};
use tiff::tags::Tag;
use tracing::debug;
use uuid::Uuid;

use crate::store::HierarchyStore;

/// Marker identifying the free-text SEM header among TIFF tag values
pub const HEADER_MARKER: &str = "[User]";

/// Served when neither the image nor the item carries a header
pub const DEFAULT_HEADER: &str = "[MAIN]\r\nnoheader=1\r\n";

pub const THUMBNAIL_MAX_SIZE: u32 = 1000;

/// First tag value of the image containing [`HEADER_MARKER`]
///
/// Every tag of the first IFD is considered, in file order. ASCII values
/// and byte arrays holding UTF-8 text both count.
pub fn header_from_file(path: &Path) -> Option<String> {
    let mut reader = BufReader::new(File::open(path).ok()?);
    let tags = match ifd0_tags(&mut reader) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Not a readable TIFF");
            return None;
        }
    };
    reader.rewind().ok()?;

    let mut decoder = match Decoder::new(reader) {
        Ok(decoder) => decoder,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Not a readable TIFF");
            return None;
        }
    };

    tags.into_iter().find_map(|id| {
        let value = decoder.find_tag(Tag::from_u16_exhaustive(id)).ok()??;
        tag_text(value).filter(|text| text.contains(HEADER_MARKER))
    })
}

fn tag_text(value: Value) -> Option<String> {
    match value {
        Value::Ascii(text) => Some(text),
        Value::List(values) => {
            let bytes = values
                .into_iter()
                .map(|v| match v {
                    Value::Byte(b) => Some(b),
                    Value::Unsigned(b) => u8::try_from(b).ok(),
                    _ => None,
                })
                .collect::<Option<Vec<u8>>>()?;
            String::from_utf8(bytes).ok()
        }
        _ => None,
    }
}

/// Tag numbers of the first IFD, classic or BigTIFF
///
/// The decoder does not list the tags it parsed, so the directory is read
/// here and each value is then fetched through [`Decoder::find_tag`].
fn ifd0_tags<R: Read + Seek>(reader: &mut R) -> io::Result<Vec<u16>> {
    let mut order = [0u8; 2];
    reader.read_exact(&mut order)?;
    let little = match &order {
        b"II" => true,
        b"MM" => false,
        _ => return Err(io::Error::new(io::ErrorKind::InvalidData, "missing TIFF byte order mark")),
    };

    let (offset_len, count_len, entry_len) = match read_uint(reader, 2, little)? {
        42 => (4, 2, 12),
        43 => {
            // offset size and padding
            read_uint(reader, 4, little)?;
            (8, 8, 20)
        }
        magic => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown TIFF magic {}", magic),
            ))
        }
    };

    let ifd_offset = read_uint(reader, offset_len, little)?;
    reader.seek(SeekFrom::Start(ifd_offset))?;
    let count = read_uint(reader, count_len, little)?;

    let mut tags = Vec::new();
    for _ in 0..count {
        tags.push(read_uint(reader, 2, little)? as u16);
        reader.seek(SeekFrom::Current(entry_len - 2))?;
    }
    Ok(tags)
}

fn read_uint<R: Read>(reader: &mut R, len: usize, little: bool) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    let bytes = &mut buf[..len];
    reader.read_exact(bytes)?;
    if !little {
        bytes.reverse();
    }
    Ok(u64::from_le_bytes(buf))
}

/// Header stored as a separate file referenced by the item's `headerId`
pub fn header_from_item_meta(store: &dyn HierarchyStore, item: &Item) -> Option<String> {
    let file_id = item.meta.get("headerId")?.as_str()?;
    let file_id = Uuid::parse_str(file_id).ok()?;
    let bytes = store.read_file(file_id).ok()?;
    String::from_utf8(bytes).ok()
}

/// Header text for an item: embedded, then `headerId`, then the default
///
/// `None` only when the item has no files at all.
pub fn item_header(store: &dyn HierarchyStore, item: &Item) -> Option<String> {
    let first = first_child_file(store, item)?;
    let header = first
        .path
        .as_deref()
        .and_then(header_from_file)
        .or_else(|| header_from_item_meta(store, item))
        .unwrap_or_else(|| DEFAULT_HEADER.to_string());
    Some(header)
}

/// Base64 PNG thumbnail of an image, fitting within 1000x1000
///
/// Non-RGB images are reduced to 8-bit grayscale by scaling intensity
/// down by 256 for 16-bit sources.
pub fn thumbnail(path: &Path) -> Option<String> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot decode image for thumbnail");
            return None;
        }
    };

    let img = match img {
        DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    };

    let img = if img.width() > THUMBNAIL_MAX_SIZE || img.height() > THUMBNAIL_MAX_SIZE {
        img.thumbnail(THUMBNAIL_MAX_SIZE, THUMBNAIL_MAX_SIZE)
    } else {
        img
    };

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .ok()?;
    Some(base64::engine::general_purpose::STANDARD.encode(png))
}

/// Thumbnail of an item's first file, when it has a local path
pub fn item_thumbnail(store: &dyn HierarchyStore, item: &Item) -> Option<String> {
    let first = first_child_file(store, item)?;
    thumbnail(first.path.as_deref()?)
}

fn first_child_file(store: &dyn HierarchyStore, item: &Item) -> Option<StoredFile> {
    store.child_files(item.id).ok()?.into_iter().next()
}
