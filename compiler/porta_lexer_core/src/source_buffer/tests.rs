use super::*;

#[test]
fn empty_source_has_sentinel() {
    let buf = SourceBuffer::new("");
    assert_eq!(buf.len(), 0);
    assert!(buf.is_empty());
    assert_eq!(buf.as_sentinel_bytes()[0], 0);
}

#[test]
fn bytes_round_trip() {
    let buf = SourceBuffer::new("#include <a.h>\n");
    assert_eq!(buf.as_bytes(), b"#include <a.h>\n");
    assert_eq!(buf.as_sentinel_bytes()[15], 0);
}

#[test]
fn buffer_is_cache_line_aligned() {
    for len in [0, 1, 63, 64, 65, 200] {
        let source = "x".repeat(len);
        let buf = SourceBuffer::new(&source);
        assert_eq!(buf.as_sentinel_bytes().len() % CACHE_LINE, 0, "len {len}");
        assert!(buf.as_sentinel_bytes().len() > len);
    }
}

#[test]
fn padding_is_zero() {
    let buf = SourceBuffer::new("abc");
    assert!(buf.as_sentinel_bytes()[3..].iter().all(|&b| b == 0));
}

#[test]
fn cursor_starts_at_zero() {
    let buf = SourceBuffer::new("int");
    let cursor = buf.cursor();
    assert_eq!(cursor.pos(), 0);
    assert_eq!(cursor.current(), b'i');
}
