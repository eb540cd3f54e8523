//! Reader for 2-column NumPy `.npy` arrays.
//!
//! Reference paths ship as `.npy` files holding an `(N, 2)` array of path-grid
//! coordinates. Only the subset of the format needed for that is supported.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬───────┬───────┬────────────┬──────────────┬──────────┐
//! │ \x93NUMPY    │ major │ minor │ header len │ header dict  │ data     │
//! │ 6 bytes      │ u8    │ u8    │ u16 / u32  │ ASCII, padded│ raw      │
//! └──────────────┴───────┴───────┴────────────┴──────────────┴──────────┘
//! ```
//!
//! Header length is a little-endian u16 for version 1.x and u32 for 2.x/3.x.

use std::path::Path;

use thiserror::Error;

use crate::core::Point2D;

/// Magic bytes at the start of every `.npy` file.
pub const NPY_MAGIC: [u8; 6] = *b"\x93NUMPY";

#[derive(Error, Debug)]
pub enum NpyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not an npy file")]
    BadMagic,

    #[error("unsupported npy version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("truncated file: {0}")]
    Truncated(&'static str),

    #[error("malformed header: {0}")]
    Header(String),

    #[error("unsupported dtype {0}")]
    UnsupportedDtype(String),

    #[error("expected shape (N, 2), got {0:?}")]
    Shape(Vec<usize>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dtype {
    F64,
    F32,
    I64,
    I32,
}

impl Dtype {
    fn size(self) -> usize {
        match self {
            Dtype::F64 | Dtype::I64 => 8,
            Dtype::F32 | Dtype::I32 => 4,
        }
    }
}

#[derive(Debug)]
struct Header {
    dtype: Dtype,
    big_endian: bool,
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Read an `(N, 2)` array file into points.
pub fn read_points(path: &Path) -> Result<Vec<Point2D>, NpyError> {
    let bytes = std::fs::read(path)?;
    parse_points(&bytes)
}

/// Parse an in-memory `(N, 2)` array.
pub fn parse_points(bytes: &[u8]) -> Result<Vec<Point2D>, NpyError> {
    if bytes.len() < 8 {
        return Err(NpyError::Truncated("preamble"));
    }
    if bytes[..6] != NPY_MAGIC {
        return Err(NpyError::BadMagic);
    }
    let (major, minor) = (bytes[6], bytes[7]);

    let (header_len, header_start) = match major {
        1 => {
            if bytes.len() < 10 {
                return Err(NpyError::Truncated("header length"));
            }
            (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10)
        }
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(NpyError::Truncated("header length"));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        _ => return Err(NpyError::UnsupportedVersion(major, minor)),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(NpyError::Truncated("header"));
    }
    let text = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|e| NpyError::Header(e.to_string()))?;
    let header = parse_header(text)?;

    let rows = match header.shape.as_slice() {
        [rows, 2] => *rows,
        // A single waypoint saved as a flat pair
        [2] => 1,
        _ => return Err(NpyError::Shape(header.shape)),
    };

    let size = header.dtype.size();
    let data = &bytes[data_start..];
    let needed = rows
        .checked_mul(2)
        .and_then(|n| n.checked_mul(size))
        .ok_or_else(|| NpyError::Shape(header.shape.clone()))?;
    if data.len() < needed {
        return Err(NpyError::Truncated("data"));
    }

    let value = |index: usize| -> f64 {
        let raw = &data[index * size..(index + 1) * size];
        decode(raw, header.dtype, header.big_endian)
    };

    let points = (0..rows)
        .map(|row| {
            let (ix, iy) = if header.fortran_order {
                (row, rows + row)
            } else {
                (row * 2, row * 2 + 1)
            };
            Point2D::new(value(ix), value(iy))
        })
        .collect();

    Ok(points)
}

fn decode(raw: &[u8], dtype: Dtype, big_endian: bool) -> f64 {
    macro_rules! read {
        ($ty:ty, $n:expr) => {{
            let mut buf = [0u8; $n];
            buf.copy_from_slice(raw);
            if big_endian {
                <$ty>::from_be_bytes(buf) as f64
            } else {
                <$ty>::from_le_bytes(buf) as f64
            }
        }};
    }

    match dtype {
        Dtype::F64 => read!(f64, 8),
        Dtype::F32 => read!(f32, 4),
        Dtype::I64 => read!(i64, 8),
        Dtype::I32 => read!(i32, 4),
    }
}

fn parse_header(text: &str) -> Result<Header, NpyError> {
    let descr = dict_value(text, "descr")?;
    let descr = descr.trim_matches(|c: char| c == '\'' || c == '"');
    let (big_endian, dtype) = parse_descr(descr)?;

    let fortran_order = match dict_value(text, "fortran_order")? {
        "True" => true,
        "False" => false,
        other => return Err(NpyError::Header(format!("fortran_order = {}", other))),
    };

    let shape_text = dict_value(text, "shape")?;
    let shape = shape_text
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| NpyError::Header(format!("shape = {}", shape_text)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Header {
        dtype,
        big_endian,
        fortran_order,
        shape,
    })
}

fn parse_descr(descr: &str) -> Result<(bool, Dtype), NpyError> {
    let (order, kind) = match descr.chars().next() {
        Some(c @ ('<' | '>' | '=' | '|')) => (c, &descr[1..]),
        _ => ('=', descr),
    };
    let dtype = match kind {
        "f8" => Dtype::F64,
        "f4" => Dtype::F32,
        "i8" => Dtype::I64,
        "i4" => Dtype::I32,
        _ => return Err(NpyError::UnsupportedDtype(descr.to_string())),
    };
    Ok((order == '>', dtype))
}

/// Extract the raw text of one value from the header's Python dict literal.
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let missing = || NpyError::Header(format!("missing key '{}'", key));

    let key_pos = text
        .find(&format!("'{}'", key))
        .or_else(|| text.find(&format!("\"{}\"", key)))
        .ok_or_else(missing)?;
    let rest = &text[key_pos + key.len() + 2..];
    let colon = rest.find(':').ok_or_else(missing)?;
    let rest = rest[colon + 1..].trim_start();

    let end = match rest.chars().next() {
        Some('(') => rest.find(')').map(|i| i + 1),
        Some(q @ ('\'' | '"')) => rest[1..].find(q).map(|i| i + 2),
        Some(_) => rest.find(|c: char| c == ',' || c == '}'),
        None => None,
    }
    .ok_or_else(|| NpyError::Header(format!("unterminated value for '{}'", key)))?;

    Ok(rest[..end].trim())
}

/// Encode points as a version 1.0 `<f8` C-order file.
///
/// Used to produce fixtures; the harness itself never writes paths.
pub fn encode_points(points: &[Point2D]) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, 2), }}",
        points.len()
    );
    // Total preamble + header must be a multiple of 64, terminated by '\n'
    let unpadded = NPY_MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header = format!("{}{}\n", dict, " ".repeat(padding));

    let mut out = Vec::with_capacity(unpadded + padding + points.len() * 16);
    out.extend_from_slice(&NPY_MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for p in points {
        out.extend_from_slice(&p.x.to_le_bytes());
        out.extend_from_slice(&p.y.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_file(major: u8, dict: &str, data: &[u8]) -> Vec<u8> {
        let mut out = NPY_MAGIC.to_vec();
        out.extend_from_slice(&[major, 0]);
        if major == 1 {
            out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(dict.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(dict.as_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_encode_then_parse() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(12.0, 33.5)];
        let bytes = encode_points(&points);
        // Data starts on a 64-byte boundary
        assert_eq!((bytes.len() - points.len() * 16) % 64, 0);
        assert_eq!(parse_points(&bytes).unwrap(), points);
    }

    #[test]
    fn test_int64_paths() {
        let mut data = Vec::new();
        for v in [3i64, 4, 5, 6] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let bytes = raw_file(
            1,
            "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2), }\n",
            &data,
        );
        let points = parse_points(&bytes).unwrap();
        assert_eq!(points, vec![Point2D::new(3.0, 4.0), Point2D::new(5.0, 6.0)]);
    }

    #[test]
    fn test_fortran_order_and_version_2() {
        // Column-major: xs then ys
        let mut data = Vec::new();
        for v in [1i32, 2, 10, 20] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let bytes = raw_file(
            2,
            "{'descr': '<i4', 'fortran_order': True, 'shape': (2, 2), }\n",
            &data,
        );
        let points = parse_points(&bytes).unwrap();
        assert_eq!(points, vec![Point2D::new(1.0, 10.0), Point2D::new(2.0, 20.0)]);
    }

    #[test]
    fn test_big_endian_f4() {
        let mut data = Vec::new();
        for v in [1.5f32, -2.0] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let bytes = raw_file(
            1,
            "{'descr': '>f4', 'fortran_order': False, 'shape': (1, 2), }\n",
            &data,
        );
        assert_eq!(parse_points(&bytes).unwrap(), vec![Point2D::new(1.5, -2.0)]);
    }

    #[test]
    fn test_empty_path() {
        let bytes = encode_points(&[]);
        assert!(parse_points(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_magic() {
        assert!(matches!(
            parse_points(b"NOTANPYFILE!"),
            Err(NpyError::BadMagic)
        ));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let bytes = raw_file(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }\n",
            &[0u8; 48],
        );
        assert!(matches!(parse_points(&bytes), Err(NpyError::Shape(s)) if s == vec![2, 3]));
    }

    #[test]
    fn test_rejects_overflowing_shape() {
        let bytes = raw_file(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2305843009213693952, 2), }\n",
            &[0u8; 16],
        );
        assert!(matches!(parse_points(&bytes), Err(NpyError::Shape(_))));
    }

    #[test]
    fn test_rejects_oversized_row_count() {
        let bytes = raw_file(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1000000, 2), }\n",
            &[0u8; 16],
        );
        assert!(matches!(parse_points(&bytes), Err(NpyError::Truncated(_))));
    }

    #[test]
    fn test_rejects_truncated_data() {
        let mut bytes = encode_points(&[Point2D::new(1.0, 2.0), Point2D::new(3.0, 4.0)]);
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(parse_points(&bytes), Err(NpyError::Truncated(_))));
    }

    #[test]
    fn test_rejects_unsupported_dtype() {
        let bytes = raw_file(
            1,
            "{'descr': '<c16', 'fortran_order': False, 'shape': (1, 2), }\n",
            &[0u8; 32],
        );
        assert!(matches!(
            parse_points(&bytes),
            Err(NpyError::UnsupportedDtype(_))
        ));
    }
}
