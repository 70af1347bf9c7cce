//! Parser for the bracket-based FGD format.
//!
//! ```text
//! @BaseClass = Appearflags [ spawnflags(Flags) = [ 256 : "Not on Easy" : 0 ] ]
//! @PointClass base(Appearflags) size(-16 -16 -24, 16 16 32) color(0 0 255)
//!     model({ "path": ":progs/player.mdl" }) = info_player_start : "Player start" []
//! ```

pub(crate) mod lexer;
mod parser;

pub use parser::FgdParser;
