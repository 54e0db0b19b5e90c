use super::vlq::*;
use super::*;

#[test]
fn test_vlq_encode_basic() {
    assert_eq!(encode_vlq(0), "A");
    assert_eq!(encode_vlq(1), "C");
    assert_eq!(encode_vlq(-1), "D");
    assert_eq!(encode_vlq(2), "E");
    assert_eq!(encode_vlq(-2), "F");
}

#[test]
fn test_vlq_encode_group_boundaries() {
    assert_eq!(encode_vlq(15), "e");
    assert_eq!(encode_vlq(-15), "f");
    assert_eq!(encode_vlq(16), "gB");
    assert_eq!(encode_vlq(-16), "hB");
    assert_eq!(encode_vlq(511), "+f");
    assert_eq!(encode_vlq(-511), "/f");
    assert_eq!(encode_vlq(512), "ggB");
    assert_eq!(encode_vlq(-512), "hgB");
}

#[test]
fn test_vlq_encode_multi_digit() {
    assert_eq!(encode_vlq(456), "wc");
    assert_eq!(encode_vlq(-456), "xc");
    assert_eq!(encode_vlq(789), "qxB");
    assert_eq!(encode_vlq(-789), "rxB");
}

#[test]
fn test_vlq_round_trip_range() {
    let extremes = [i64::from(i32::MAX), i64::from(i32::MIN), i64::MAX, i64::MIN];
    for value in (-2048..=2048).chain(extremes) {
        let encoded = encode_vlq(value);
        let (decoded, consumed) = decode_vlq(&encoded).unwrap();
        assert_eq!(decoded, value, "Failed for value {value}");
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn test_decode_vlq_stops_at_first_terminal_digit() {
    // "gB" is 16, the trailing "C" belongs to the next value
    assert_eq!(decode_vlq("gBC").unwrap(), (16, 2));
}

#[test]
fn test_decode_vlq_rejects_bad_character() {
    assert_eq!(
        decode_vlq("g!"),
        Err(SourceMapError::InvalidBase64 { ch: '!', offset: 1 })
    );
}

#[test]
fn test_decode_vlq_rejects_truncated_input() {
    // 'g' has the continuation bit set and nothing follows
    assert_eq!(decode_vlq("g"), Err(SourceMapError::UnexpectedEnd));
    assert_eq!(decode_vlq(""), Err(SourceMapError::UnexpectedEnd));
}

#[test]
fn test_decode_vlq_rejects_overlong_input() {
    assert_eq!(decode_vlq("gggggggggggggggB"), Err(SourceMapError::Overflow));
}

#[test]
fn test_encode_vlqs() {
    assert_eq!(encode_vlqs(&[0, 1, 2, 3, 4]), "ACEGI");
    assert_eq!(encode_vlqs(&[123, 456, 789]), "2HwcqxB");
    assert_eq!(encode_vlqs(&[]), "");
}

#[test]
fn test_decode_vlqs() {
    assert_eq!(decode_vlqs("ACEGI").unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(decode_vlqs("2HwcqxB").unwrap(), vec![123, 456, 789]);
    assert_eq!(decode_vlqs("").unwrap(), Vec::<i64>::new());
}

#[test]
fn test_decode_vlqs_reports_offset_in_whole_text() {
    assert_eq!(
        decode_vlqs("AC*"),
        Err(SourceMapError::InvalidBase64 { ch: '*', offset: 2 })
    );
}
