//! Stub codec against generated trees and damaged blobs.

use proptest::prelude::*;
use weft::hir::{CodecError, FORMAT_VERSION, MAGIC, StubFlags, StubNode, StubTree, decode, encode, extract};
use weft::parser::{SyntaxKind, TextRange, TextSize, parse};

use crate::helpers::source_fixtures::NESTED_SCOPES;

const STUB_KINDS: &[SyntaxKind] = &[
    SyntaxKind::LET_DECL,
    SyntaxKind::DIRECTIVE_DECL,
    SyntaxKind::FN_DECL,
    SyntaxKind::PARAM,
    SyntaxKind::FOR_BLOCK,
    SyntaxKind::IMPORT_DECL,
];

fn arb_flags() -> impl Strategy<Value = StubFlags> {
    (0u32..64).prop_map(|bits| StubFlags::from_bits(bits).expect("six known bits"))
}

fn arb_range() -> impl Strategy<Value = Option<TextRange>> {
    prop::option::of((0u32..10_000, 0u32..500)).prop_map(|range| {
        range.map(|(start, len)| TextRange::at(TextSize::new(start), TextSize::new(len)))
    })
}

fn arb_leaf() -> impl Strategy<Value = StubNode> {
    (
        prop::sample::select(STUB_KINDS),
        prop::option::of("[a-zé_]{1,5}"),
        arb_flags(),
        arb_range(),
    )
        .prop_map(|(kind, name, flags, range)| {
            let mut node = StubNode::new(kind, name.map(Into::into), flags);
            node.range = range;
            node
        })
}

fn arb_tree() -> impl Strategy<Value = StubTree> {
    let node = arb_leaf().prop_recursive(4, 48, 6, |inner| {
        (arb_leaf(), prop::collection::vec(inner, 0..6))
            .prop_map(|(node, children)| node.with_children(children))
    });
    (prop::collection::vec(node, 0..6), arb_range()).prop_map(|(children, range)| {
        let mut root = StubNode::new(SyntaxKind::SOURCE_FILE, None, StubFlags::EMPTY).with_children(children);
        root.range = range;
        StubTree::new(root)
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(tree in arb_tree()) {
        let bytes = encode(&tree);
        prop_assert_eq!(&bytes[0..4], &MAGIC[..]);
        let decoded = decode(&bytes).expect("own output decodes");
        prop_assert_eq!(&decoded, &tree);
        prop_assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn truncated_blobs_never_decode(tree in arb_tree(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&tree);
        let cut = cut.index(bytes.len());
        prop_assert!(decode(&bytes[..cut]).is_err());
    }
}

#[test]
fn test_extracted_tree_round_trips() {
    let tree = extract(&parse(NESTED_SCOPES).syntax()).expect("stubs");
    assert_eq!(decode(&encode(&tree)).expect("decodes"), tree);
}

#[test]
fn test_stale_format_detected_before_body() {
    let tree = extract(&parse("let a = 1;").syntax()).expect("stubs");
    let mut bytes = encode(&tree);
    bytes[4..8].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    // Damage the body too; the version check must win
    bytes.truncate(10);

    let err = decode(&bytes).expect_err("stale");
    assert!(err.is_stale());
    assert_eq!(
        err,
        CodecError::StaleFormat {
            found: FORMAT_VERSION + 1,
            expected: FORMAT_VERSION,
        }
    );
}

#[test]
fn test_unknown_flag_bits_rejected() {
    let tree = StubTree::new(
        StubNode::new(SyntaxKind::SOURCE_FILE, None, StubFlags::EMPTY)
            .with_children(vec![StubNode::new(SyntaxKind::LET_DECL, Some("a".into()), StubFlags::CONSTANT)]),
    );
    let mut bytes = encode(&tree);
    // Header, string table ("a"), root record, then the child's kind and name
    let flags_at = 8 + 4 + (4 + 1) + 22 + 2 + 4;
    bytes[flags_at..flags_at + 4].copy_from_slice(&(1u32 << 31).to_le_bytes());
    assert!(matches!(decode(&bytes), Err(CodecError::UnknownFlags { .. })));
}
