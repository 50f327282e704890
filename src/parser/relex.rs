//! Incremental relexing after a local edit
//!
//! A [`LexedText`] keeps the token vector of a file plus a saved [`LexState`]
//! every [`CHECKPOINT_INTERVAL`] tokens. After an edit, lexing resumes from
//! the last checkpoint safely before the edit and stops as soon as the lexer
//! reaches one of the old checkpoints (shifted by the edit) in an identical
//! state. From there on the old tokens are reused with shifted ranges.

use text_size::{TextRange, TextSize};

use super::lexer::{LexState, Lexer, Token};

/// Tokens between saved lexer states
pub const CHECKPOINT_INTERVAL: usize = 32;

/// How far past its end a token's extent may depend on (`1.5e+x` backs off to `1.5`).
const LOOKAHEAD: u32 = 4;

/// A replacement of `delete` (in old-text offsets) by `insert`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub delete: TextRange,
    pub insert: String,
}

impl TextEdit {
    pub fn replace(delete: TextRange, insert: impl Into<String>) -> Self {
        Self {
            delete,
            insert: insert.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    /// Apply the edit to `text`, returning `None` if the range is out of
    /// bounds or splits a character.
    pub fn apply(&self, text: &str) -> Option<String> {
        let start = usize::from(self.delete.start());
        let end = usize::from(self.delete.end());
        if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return None;
        }
        let mut out = String::with_capacity(text.len() - (end - start) + self.insert.len());
        out.push_str(&text[..start]);
        out.push_str(&self.insert);
        out.push_str(&text[end..]);
        Some(out)
    }
}

/// A tokenized text with periodic lexer checkpoints
#[derive(Debug, Clone, PartialEq)]
pub struct LexedText {
    tokens: Vec<Token>,
    /// (token index, state before that token), ascending
    checkpoints: Vec<(usize, LexState)>,
    text_len: TextSize,
}

impl LexedText {
    pub fn new(text: &str) -> Self {
        let mut lexer = Lexer::new(text);
        let mut tokens = Vec::new();
        let mut checkpoints = vec![(0, lexer.save_state())];
        while let Some(token) = lexer.next() {
            tokens.push(token);
            if tokens.len() % CHECKPOINT_INTERVAL == 0 {
                checkpoints.push((tokens.len(), lexer.save_state()));
            }
        }
        Self {
            tokens,
            checkpoints,
            text_len: TextSize::of(text),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }
}

/// Relex `new_text`, which is `edit` applied to the text `previous` was
/// built from. Equivalent to `LexedText::new(new_text)`.
pub fn relex(previous: &LexedText, edit: &TextEdit, new_text: &str) -> LexedText {
    let old_len = u32::from(previous.text_len);
    let del_start = u32::from(edit.delete.start());
    let del_end = u32::from(edit.delete.end());
    let insert_len = edit.insert.len() as u32;

    let consistent = del_end <= old_len
        && i64::from(old_len) - i64::from(del_end - del_start) + i64::from(insert_len)
            == new_text.len() as i64;
    if !consistent {
        tracing::debug!("edit does not match text lengths, relexing from scratch");
        return LexedText::new(new_text);
    }

    let delta = i64::from(insert_len) - i64::from(del_end - del_start);
    let shift =
        |offset: TextSize| -> TextSize { TextSize::new((i64::from(u32::from(offset)) + delta) as u32) };
    let new_edit_end = del_start + insert_len;

    // Last checkpoint whose lookahead window ends before the edit
    let restart = previous
        .checkpoints
        .iter()
        .rposition(|(idx, state)| *idx == 0 || u32::from(state.offset()) + LOOKAHEAD <= del_start)
        .unwrap_or(0);
    let (restart_idx, restart_state) = match previous.checkpoints.get(restart) {
        Some((idx, state)) => (*idx, state.clone()),
        None => (0, LexState::initial()),
    };

    let mut tokens: Vec<Token> = previous.tokens[..restart_idx].to_vec();
    let mut checkpoints: Vec<(usize, LexState)> =
        previous.checkpoints.iter().take(restart + 1).cloned().collect();
    if checkpoints.is_empty() {
        checkpoints.push((0, LexState::initial()));
    }

    // Old checkpoints entirely after the deleted range are convergence candidates
    let candidates: Vec<&(usize, LexState)> = previous
        .checkpoints
        .iter()
        .filter(|(_, state)| u32::from(state.offset()) >= del_end && state.offset() > TextSize::new(0))
        .collect();
    let mut next_candidate = 0;

    let suffix = &new_text[usize::from(restart_state.offset())..];
    let mut lexer = Lexer::resume(&restart_state, suffix);
    let mut relexed = 0usize;

    while let Some(token) = lexer.next() {
        tokens.push(token);
        relexed += 1;
        let state = lexer.save_state();
        if tokens.len() % CHECKPOINT_INTERVAL == 0 {
            checkpoints.push((tokens.len(), state.clone()));
        }

        let pos = state.offset();
        if u32::from(pos) < new_edit_end {
            continue;
        }
        while candidates
            .get(next_candidate)
            .is_some_and(|(_, old)| shift(old.offset()) < pos)
        {
            next_candidate += 1;
        }
        let Some((old_idx, old_state)) = candidates.get(next_candidate).map(|c| (c.0, &c.1)) else {
            continue;
        };
        if shift(old_state.offset()) != pos || old_state.shifted(pos) != state {
            continue;
        }

        // Converged: the rest is the old tail, shifted
        let splice_at = tokens.len();
        if checkpoints.last().is_some_and(|(idx, _)| *idx == splice_at) {
            checkpoints.pop();
        }
        tokens.extend(previous.tokens[old_idx..].iter().map(|t| Token {
            kind: t.kind,
            range: TextRange::at(shift(t.range.start()), t.range.len()),
            value: t.value.clone(),
        }));
        checkpoints.extend(
            previous
                .checkpoints
                .iter()
                .filter(|(idx, _)| *idx >= old_idx)
                .map(|(idx, s)| (idx - old_idx + splice_at, s.shifted(shift(s.offset())))),
        );
        tracing::trace!(
            relexed,
            reused = previous.tokens.len() - old_idx,
            "relex converged"
        );
        return LexedText {
            tokens,
            checkpoints,
            text_len: TextSize::of(new_text),
        };
    }

    tracing::trace!(relexed, "relex ran to end of input");
    LexedText {
        tokens,
        checkpoints,
        text_len: TextSize::of(new_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn check(old: &str, edit: TextEdit) {
        let new = edit.apply(old).expect("valid edit");
        let previous = LexedText::new(old);
        let relexed = relex(&previous, &edit, &new);
        assert_eq!(relexed.tokens(), tokenize(&new).as_slice(), "edit {edit:?} on {old:?}");
        assert_eq!(relexed.text_len(), TextSize::of(new.as_str()));
    }

    fn long_source() -> String {
        (0..40)
            .map(|i| format!("let v{i} = `x${{v{i} + 1}}y`; // line {i}\n"))
            .collect()
    }

    #[test]
    fn test_relex_insert_in_identifier() {
        check("let abc = 1;", TextEdit::insert(TextSize::new(6), "x"));
    }

    #[test]
    fn test_relex_merge_adjacent_tokens() {
        check("a b", TextEdit::delete(TextRange::new(TextSize::new(1), TextSize::new(2))));
    }

    #[test]
    fn test_relex_open_block_comment_swallows_tail() {
        let source = long_source();
        check(&source, TextEdit::insert(TextSize::new(20), "/*"));
    }

    #[test]
    fn test_relex_close_template_changes_modes() {
        let source = long_source();
        check(&source, TextEdit::insert(TextSize::new(12), "`"));
    }

    #[test]
    fn test_relex_converges_after_local_edit() {
        let source = long_source();
        let previous = LexedText::new(&source);
        let edit = TextEdit::replace(TextRange::new(TextSize::new(4), TextSize::new(6)), "renamed");
        let new = edit.apply(&source).expect("valid edit");
        let relexed = relex(&previous, &edit, &new);
        assert_eq!(relexed.tokens(), tokenize(&new).as_slice());
        assert!(relexed.checkpoint_count() > 1);
    }

    #[test]
    fn test_relex_number_lookahead() {
        check("x = 1.", TextEdit::insert(TextSize::new(6), "5"));
        check("x = 1.5e+", TextEdit::insert(TextSize::new(9), "2"));
    }

    #[test]
    fn test_relex_inconsistent_edit_falls_back() {
        let previous = LexedText::new("let a = 1;");
        let edit = TextEdit::insert(TextSize::new(3), "zzz");
        let relexed = relex(&previous, &edit, "fn f() {}");
        assert_eq!(relexed.tokens(), tokenize("fn f() {}").as_slice());
    }

    #[test]
    fn test_edit_apply_rejects_split_char() {
        let edit = TextEdit::delete(TextRange::new(TextSize::new(1), TextSize::new(2)));
        assert_eq!(edit.apply("é"), None);
        assert_eq!(TextEdit::insert(TextSize::new(1), "b").apply("ac"), Some("abc".to_string()));
    }
}
