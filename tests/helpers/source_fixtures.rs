//! Common source code fixtures for tests.

// Declarations
pub const SIMPLE_LET: &str = "let a = 1;";
pub const SIMPLE_DIRECTIVE: &str = "directive foo { }";
pub const MEMBER_CALL: &str = "a.b(c)";

pub const EXPORTS: &str = r#"
export const version = "1.0";
export fn greet(name, greeting = "hi") {
    `${greeting}, ${name}!`;
}
"#;

// Nested structures
pub const NESTED_SCOPES: &str = r#"
directive layout(title: String) {
    let header = title;
    for item in items
        let row = item.name;
    end
    if header
        let banner = true;
    else
        let banner = false;
    end
}
"#;

pub const IMPORTS: &str = r#"
import std.text;
import std.collections.map as dict;
"#;

// Malformed input
pub const MISSING_INITIALIZER: &str = "let a = ; let b = 1;";
pub const STRAY_END: &str = "{ let a = 1; end }";
pub const UNCLOSED_BLOCK: &str = "directive d { let a = 1;";
pub const UNTERMINATED_STRING: &str = "let s = \"abc\nlet t = 2;";

/// Every fixture, for tests that only care about invariants.
pub const ALL: &[&str] = &[
    SIMPLE_LET,
    SIMPLE_DIRECTIVE,
    MEMBER_CALL,
    EXPORTS,
    NESTED_SCOPES,
    IMPORTS,
    MISSING_INITIALIZER,
    STRAY_END,
    UNCLOSED_BLOCK,
    UNTERMINATED_STRING,
];
