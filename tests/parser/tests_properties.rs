//! Property tests over generated weft-shaped text.

use proptest::prelude::*;
use weft::hir::{encode, extract};
use weft::parser::lexer::{resume, save_state_at};
use weft::parser::relex::relex;
use weft::parser::{LexedText, TextEdit, TextRange, TextSize, parse, tokenize};

use crate::helpers::strategies::{text_with_edit, weft_text};

fn size(n: usize) -> TextSize {
    TextSize::new(n as u32)
}

proptest! {
    #[test]
    fn tokens_tile_the_input(text in weft_text()) {
        let tokens = tokenize(&text);
        let mut offset = 0usize;
        for token in &tokens {
            prop_assert_eq!(usize::from(token.range.start()), offset);
            prop_assert!(!token.range.is_empty());
            offset = usize::from(token.range.end());
        }
        prop_assert_eq!(offset, text.len());
    }

    #[test]
    fn parse_is_lossless(text in weft_text()) {
        let root = parse(&text).syntax();
        prop_assert_eq!(root.text().to_string(), text.clone());
        let leaves: String = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| t.text().to_string())
            .collect();
        prop_assert_eq!(leaves, text);
    }

    #[test]
    fn lexer_restarts_at_any_token_boundary(text in weft_text()) {
        let full = tokenize(&text);
        for k in 0..=full.len() {
            let state = save_state_at(&text, k).expect("k is within the token count");
            let offset = usize::from(state.offset());
            prop_assert_eq!(resume(&state, &text[offset..]), full[k..].to_vec(), "restart at token {}", k);
        }
    }

    #[test]
    fn relex_matches_full_lex((text, start, end, insert) in text_with_edit()) {
        let edit = TextEdit::replace(TextRange::new(size(start), size(end)), insert);
        let new_text = edit.apply(&text).expect("edit is on char boundaries");
        let previous = LexedText::new(&text);
        let relexed = relex(&previous, &edit, &new_text);
        let expected = tokenize(&new_text);
        prop_assert_eq!(relexed.tokens(), expected.as_slice());
        prop_assert_eq!(relexed.text_len(), size(new_text.len()));
    }

    #[test]
    fn parse_and_extract_are_deterministic(text in weft_text()) {
        let first = parse(&text);
        let second = parse(&text);
        prop_assert_eq!(&first.green, &second.green);
        prop_assert_eq!(&first.errors, &second.errors);

        match (extract(&first.syntax()), extract(&second.syntax())) {
            (Ok(a), Ok(b)) => prop_assert_eq!(encode(&a), encode(&b)),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "extraction diverged: {:?} vs {:?}", a, b),
        }
    }
}
