//! Parser for definitions embedded in `/*QUAKED ... */` comments.
//!
//! ```text
//! /*QUAKED item_armor1 (0 .5 .8) (-16 -16 0) (16 16 32) - SUSPENDED
//! {
//!     model({ "path": ":progs/armor.mdl" });
//!     base("Item");
//! }
//! Green armor, 100 points of protection.
//! */
//! ```
//!
//! Text outside the comments is ignored. A header with a bounding box declares
//! a point class, one with `?` a brush class and a bare name a base class.

mod lexer;
mod parser;

pub use parser::DefParser;
