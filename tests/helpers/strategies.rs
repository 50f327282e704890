//! Proptest strategies.
//!
//! Plain arbitrary strings almost never hit the interesting lexer modes, so
//! [`weft_text`] glues together fragments that open and close comments,
//! strings, templates and interpolations, mixed with arbitrary characters.

use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "let ", "const ", "fn ", "directive ", "import ", "export ", "if ", "elif ", "else ", "for ",
    " in ", "end", "true", "null", "{", "}", "(", ")", "[", "]", ";", ",", ".", ":", "=", "==",
    "?", "??", "+", "-", "*", "**", "/", "%", "!", "|", "\"", "'", "`", "${", "$", "\\", "/*",
    "*/", "//", "\n", " ", "\t", "0", "1.", "1.5", "2e", "e+3", "x", "ab", "_", "é", "変数",
];

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(FRAGMENTS).prop_map(|s| s.to_string()),
        1 => "[a-z_]{1,4}",
        1 => any::<char>().prop_map(String::from),
    ]
}

/// Source-shaped text, up to a few dozen fragments long.
pub fn weft_text() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..48).prop_map(|parts| parts.concat())
}

/// A text and an edit on it: `(text, delete_start, delete_end, insert)`,
/// with both offsets on char boundaries.
pub fn text_with_edit() -> impl Strategy<Value = (String, usize, usize, String)> {
    (weft_text(), any::<prop::sample::Index>(), any::<prop::sample::Index>(), weft_text()).prop_map(
        |(text, a, b, insert)| {
            let boundaries: Vec<usize> = text
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .collect();
            let x = boundaries[a.index(boundaries.len())];
            let y = boundaries[b.index(boundaries.len())];
            let insert: String = insert.chars().take(6).collect();
            (text, x.min(y), x.max(y), insert)
        },
    )
}
