//! Readers racing a writer see one file's entries swap all at once.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use weft::hir::{IndexStore, Scope, StubTree, extract};
use weft::parser::parse;
use weft::FileId;

const FILE: FileId = FileId::new(7);
const OTHER: FileId = FileId::new(8);

fn stubs(source: &str) -> StubTree {
    extract(&parse(source).syntax()).expect("extractable")
}

fn key_set(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_readers_never_see_a_half_swapped_file() {
    let index = Arc::new(IndexStore::new());
    let old = stubs("let a1 = 1; let a2 = 2; directive a3 { let a4 = 4; }");
    let new = stubs("let b1 = 1; fn b2(b3) { }");
    index.update(OTHER, &stubs("let keep = 0;"));
    index.update(FILE, &old);

    let old_keys = key_set(&["a1", "a2", "a3", "a4"]);
    let new_keys = key_set(&["b1", "b2", "b3"]);
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            let done = Arc::clone(&done);
            let (old_keys, new_keys) = (old_keys.clone(), new_keys.clone());
            thread::spawn(move || {
                let mut observed = 0usize;
                while !done.load(Ordering::Acquire) {
                    let seen: BTreeSet<String> = index
                        .entries_for_file(FILE)
                        .into_iter()
                        .map(|e| e.key.to_string())
                        .collect();
                    assert!(
                        seen == old_keys || seen == new_keys,
                        "observed a mixed entry set: {seen:?}"
                    );
                    assert_eq!(index.lookup("keep", Scope::Project).len(), 1);
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for round in 0..500 {
        let next = if round % 2 == 0 { &new } else { &old };
        index.update(FILE, next);
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    assert_eq!(index.len(), 1 + 4);
}

#[test]
fn test_update_replaces_rather_than_merges() {
    let index = IndexStore::new();
    index.update(FILE, &stubs("let a = 1; let b = 2;"));
    index.update(FILE, &stubs("let b = 3;"));
    assert!(index.lookup("a", Scope::Project).is_empty());
    assert_eq!(index.lookup("b", Scope::File(FILE)).len(), 1);
    assert_eq!(index.entries_for_file(FILE).len(), 1);
}
