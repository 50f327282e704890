//! Grammar for weft parsing
//!
//! - `expressions` - Pratt expression parsing over a static precedence table
//! - `items` - Declarations, imports and paired block constructs
//!
//! The parsing functions are generic over a trait (`ExpressionParser` / `ItemParser`)
//! so they can be used with any parser implementation.

pub mod expressions;
pub mod items;

pub use expressions::{EXPR_FIRST, ExpressionParser, MAX_NESTING, infix_binding_power, parse_expression};
pub use items::{CLOSING_TOKENS, ItemParser, parse_item, parse_items, parse_source_file};
