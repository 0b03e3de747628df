#![allow(clippy::unwrap_used)]

use std::io::ErrorKind;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn memory_source_counts_reads() {
    let source = MemorySource::new().with_file("/p/a.h", "int a;");
    assert!(source.exists(Path::new("/p/a.h")));
    assert!(!source.exists(Path::new("/p/b.h")));

    assert_eq!(source.read(Path::new("/p/a.h")).unwrap(), "int a;");
    assert_eq!(source.read(Path::new("/p/a.h")).unwrap(), "int a;");
    assert_eq!(source.read_count("/p/a.h"), 2);

    let missing = source.read(Path::new("/p/b.h")).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    assert_eq!(source.total_reads(), 3);
}

#[test]
fn disk_source_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.h");
    fs::write(&path, "#define A 1\n").unwrap();

    let source = DiskSource;
    assert!(source.exists(&path));
    assert!(!source.exists(dir.path()));
    assert_eq!(source.read(&path).unwrap(), "#define A 1\n");
}

#[test]
fn disk_source_rejects_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.h");
    fs::write(&path, b"// caf\xe9\nint x;\n").unwrap();

    let err = DiskSource.read(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.to_string().contains("offset 6"));
}
