//! Base64 VLQ codec.
//!
//! Every integer is stored as a run of base64 digits, least significant
//! group first. Each digit carries 5 payload bits plus a continuation bit
//! (0x20); bit 0 of the first group is the sign. Integers are therefore
//! self-delimiting and can be concatenated with no separator.

use super::SourceMapError;

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE: u128 = 1 << VLQ_BASE_SHIFT;
const VLQ_BASE_MASK: u128 = VLQ_BASE - 1;
const VLQ_CONTINUATION_BIT: u8 = 0x20;

/// Map a base64 character back to its 6-bit digit.
const fn digit_of(byte: u8) -> Option<u8> {
    match byte {
        b'A'..=b'Z' => Some(byte - b'A'),
        b'a'..=b'z' => Some(byte - b'a' + 26),
        b'0'..=b'9' => Some(byte - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode_vlq_into(value: i64, out: &mut String) {
    // Sign goes into bit 0; u128 keeps i64::MIN representable.
    let mut vlq: u128 = (u128::from(value.unsigned_abs()) << 1) | u128::from(value < 0);

    loop {
        let mut digit = (vlq & VLQ_BASE_MASK) as u8;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Encode a single signed integer.
pub fn encode_vlq(value: i64) -> String {
    let mut out = String::with_capacity(2);
    encode_vlq_into(value, &mut out);
    out
}

/// Decode one integer from the front of `text`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_vlq(text: &str) -> Result<(i64, usize), SourceMapError> {
    let mut acc: u128 = 0;
    let mut shift = 0u32;

    for (offset, byte) in text.bytes().enumerate() {
        let Some(digit) = digit_of(byte) else {
            return Err(SourceMapError::InvalidBase64 {
                ch: text[offset..].chars().next().unwrap_or('\u{fffd}'),
                offset,
            });
        };

        // 64 bits of magnitude plus the sign bit is the most an i64 needs.
        if shift > 65 {
            return Err(SourceMapError::Overflow);
        }
        acc |= (u128::from(digit) & VLQ_BASE_MASK) << shift;

        if digit & VLQ_CONTINUATION_BIT == 0 {
            let negative = acc & 1 == 1;
            let magnitude = acc >> 1;
            let value = if negative {
                i64::try_from(-(magnitude as i128)).map_err(|_| SourceMapError::Overflow)?
            } else {
                i64::try_from(magnitude).map_err(|_| SourceMapError::Overflow)?
            };
            return Ok((value, offset + 1));
        }
        shift += VLQ_BASE_SHIFT;
    }

    Err(SourceMapError::UnexpectedEnd)
}

/// Encode a sequence of integers back to back.
pub fn encode_vlqs(values: &[i64]) -> String {
    let mut out = String::with_capacity(values.len() * 2);
    for &value in values {
        encode_vlq_into(value, &mut out);
    }
    out
}

/// Decode every integer in `text`, in order.
pub fn decode_vlqs(text: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::new();
    let mut rest = text;
    let mut base = 0;
    while !rest.is_empty() {
        let (value, consumed) = decode_vlq(rest).map_err(|err| err.offset_by(base))?;
        values.push(value);
        rest = &rest[consumed..];
        base += consumed;
    }
    Ok(values)
}
