//! Textual velocity frames
//!
//! The sensor sends one velocity per frame as UTF-8 text of a decimal number
//! in m/s, e.g. `0.4213`.

use crate::error::{Result, VtiError};

/// Decode one frame into a velocity in m/s.
///
/// Surrounding whitespace (including a trailing line ending) is ignored.
/// Invalid UTF-8, unparsable text and non-finite values are all decode errors.
pub fn decode_velocity_frame(frame: &[u8]) -> Result<f64> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| VtiError::Decode(format!("frame is not UTF-8: {}", e)))?;
    let text = text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| VtiError::Decode(format!("'{}' is not a number", text)))?;
    if !value.is_finite() {
        return Err(VtiError::Decode(format!("'{}' is not a finite velocity", text)));
    }
    Ok(value)
}

/// Encode a velocity the way the sensor does
pub fn encode_velocity_frame(velocity_m_s: f64) -> Vec<u8> {
    format!("{:.4}", velocity_m_s).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_padded() {
        assert_eq!(decode_velocity_frame(b"0.42").unwrap(), 0.42);
        assert_eq!(decode_velocity_frame(b"  -0.05\r\n").unwrap(), -0.05);
        assert_eq!(decode_velocity_frame(b"1").unwrap(), 1.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for frame in [&b""[..], b"abc", b"0.4.2", b"\xff\xfe", b"NaN", b"inf"] {
            assert!(
                matches!(decode_velocity_frame(frame), Err(VtiError::Decode(_))),
                "{:?} should not decode",
                frame
            );
        }
    }

    #[test]
    fn test_encoded_frame_decodes() {
        let frame = encode_velocity_frame(0.123456);
        assert_eq!(frame, b"0.1235");
        assert!((decode_velocity_frame(&frame).unwrap() - 0.1235).abs() < 1e-12);
    }
}
