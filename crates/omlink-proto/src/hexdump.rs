use std::fmt::Write as _;

use serde::Serializer;

/// Default bytes per hex dump line.
pub const DEFAULT_WIDTH: usize = 16;

/// Classic offset / hex / ASCII dump, one string per line.
///
/// ```text
///   0000  68 65 6c 6c 6f                                   hello
/// ```
///
/// A `width` of zero is treated as [`DEFAULT_WIDTH`].
pub fn hex_dump(data: &[u8], width: usize) -> Vec<String> {
    let width = if width == 0 { DEFAULT_WIDTH } else { width };
    data.chunks(width)
        .enumerate()
        .map(|(row, chunk)| {
            let mut line = format!("  {:04x} ", row * width);
            for byte in chunk {
                let _ = write!(line, " {byte:02x}");
            }
            for _ in chunk.len()..width {
                line.push_str("   ");
            }
            line.push_str("  ");
            line.extend(chunk.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            }));
            line
        })
        .collect()
}

/// Contiguous upper-case hex (`"0A1B2C"`).
pub fn to_hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02X}");
        s
    })
}

/// Serde helper: serialize a byte field as an upper-case hex string.
pub fn serialize_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&to_hex(bytes.as_ref()))
}
