//! A set of token kinds, packed into a bitset.

use super::syntax_kind::SyntaxKind;

/// Set of token kinds used for lookahead and recovery decisions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn with(self, kind: SyntaxKind) -> TokenSet {
        TokenSet(self.0 | mask(kind))
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the kinds in the set in discriminant order.
    pub fn iter(self) -> impl Iterator<Item = SyntaxKind> {
        (0..128u16)
            .filter(move |bit| self.0 & (1u128 << bit) != 0)
            .filter_map(SyntaxKind::from_raw)
    }
}

const fn mask(kind: SyntaxKind) -> u128 {
    let raw = kind as u16;
    if raw <= SyntaxKind::BAD_TOKEN as u16 { 1u128 << raw } else { 0 }
}
