use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn empty_set_is_identity() {
    let set = EditSet::new();
    assert_eq!(set.apply("unchanged\n"), "unchanged\n");
    assert_eq!(set.apply(""), "");
    assert_eq!(set.total_delta(), 0);
}

#[test]
fn insert_same_position_twice() {
    let mut set = EditSet::new();
    assert!(set.insert("first", 4, 2));
    assert!(!set.insert("second", 4, 2));
    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().next().map(|e| e.new_text.as_str()), Some("first"));
}

#[test]
fn insert_rejects_overlap() {
    let mut set = EditSet::new();
    assert!(set.insert("x", 10, 5));
    // Starts inside the existing span.
    assert!(!set.insert("y", 12, 1));
    // Ends inside the existing span.
    assert!(!set.insert("z", 8, 3));
    // Touching is fine on both sides.
    assert!(set.insert("a", 7, 3));
    assert!(set.insert("b", 15, 0));
    assert_eq!(set.len(), 3);
}

#[test]
fn entries_stay_sorted() {
    let mut set = EditSet::new();
    set.insert("c", 20, 1);
    set.insert("a", 0, 1);
    set.insert("b", 10, 1);
    let positions: Vec<u32> = set.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 10, 20]);
}

#[test]
fn apply_tracks_cumulative_offset() {
    let original = "#include <old.h>\nOldWidget w;\n";
    let mut set = EditSet::new();
    set.insert("NewWidget", 17, 9);
    set.insert("new.h", 10, 5);
    assert_eq!(set.apply(original), "#include <new.h>\nNewWidget w;\n");
}

#[test]
fn apply_growing_shrinking_and_inserting() {
    let original = "a bb ccc";
    let mut set = EditSet::new();
    set.insert("AAAA", 0, 1);
    set.insert("", 2, 3);
    set.insert("[", 5, 0);
    assert_eq!(set.apply(original), "AAAA [ccc");
    assert_eq!(set.total_delta(), 3 - 3 + 1);
}

#[test]
fn apply_clamps_out_of_range_positions() {
    let mut set = EditSet::new();
    set.insert("!", 100, 4);
    assert_eq!(set.apply("abc"), "abc!");

    let mut set = EditSet::new();
    set.insert("X", 2, 10);
    assert_eq!(set.apply("abcd"), "abX");
}

#[test]
fn merge_drops_losers_and_counts_them() {
    let mut ours = EditSet::new();
    ours.insert("one", 0, 1);
    ours.insert("two", 10, 2);

    let mut theirs = EditSet::new();
    theirs.insert("clash", 0, 1);
    theirs.insert("overlap", 11, 1);
    theirs.insert("three", 20, 1);

    assert_eq!(ours.merge(theirs), 2);
    let texts: Vec<&str> = ours.iter().map(|e| e.new_text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn multibyte_text_survives() {
    let original = "größe = x;";
    let mut set = EditSet::new();
    set.insert("size", 0, "größe".len() as u32);
    assert_eq!(set.apply(original), "size = x;");
}

/// Non-overlapping replacements at distinct positions within `len` bytes.
fn disjoint_edits(len: u32) -> impl Strategy<Value = Vec<TextReplacement>> {
    prop::collection::vec((0..len, 0u32..4, "[a-z]{0,6}"), 0..12).prop_map(move |raw| {
        let mut sorted = raw;
        sorted.sort_by_key(|(pos, _, _)| *pos);
        let mut out: Vec<TextReplacement> = Vec::new();
        for (pos, span, text) in sorted {
            let free = out.last().map_or(true, |prev| prev.end() <= pos && prev.position != pos);
            if free {
                let span = span.min(len - pos);
                out.push(TextReplacement::new(text, pos, span));
            }
        }
        out
    })
}

proptest! {
    #[test]
    fn insertion_order_does_not_matter(
        edits in disjoint_edits(40),
        seed in any::<u64>(),
    ) {
        let original = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";

        let mut forward = EditSet::new();
        for edit in &edits {
            prop_assert!(forward.insert_replacement(edit.clone()));
        }

        let mut shuffled = edits.clone();
        // Deterministic shuffle driven by the seed.
        let n = shuffled.len();
        if n > 1 {
            for i in 0..n {
                let j = (seed.wrapping_mul(i as u64 + 1) % n as u64) as usize;
                shuffled.swap(i, j);
            }
        }
        let mut backward = EditSet::new();
        for edit in shuffled.into_iter().rev() {
            prop_assert!(backward.insert_replacement(edit));
        }

        prop_assert_eq!(forward.apply(original), backward.apply(original));
        prop_assert_eq!(&forward, &backward);
    }

    #[test]
    fn applied_length_matches_total_delta(edits in disjoint_edits(40)) {
        let original = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";
        let mut set = EditSet::new();
        for edit in edits {
            set.insert_replacement(edit);
        }
        let applied = set.apply(original);
        prop_assert_eq!(applied.len() as i64, original.len() as i64 + set.total_delta());
    }
}
