use crate::TokenKind;

/// Constant bitset of token kinds, used for lookahead and error recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSet(u64);

const _: () = assert!((TokenKind::EOF as u16) < u64::BITS as u16, "token kinds no longer fit in a u64");

impl TokenSet {
    pub const EMPTY: Self = Self(0);

    const fn bit(kind: TokenKind) -> u64 {
        1 << kind as u16
    }

    pub const fn new<const N: usize>(kinds: [TokenKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < N {
            bits |= Self::bit(kinds[i]);
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }
}
