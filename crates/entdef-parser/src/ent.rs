//! Parser for XML-based ENT documents.
//!
//! ```xml
//! <classes>
//!   <list name="style"><item name="Normal" value="0"/></list>
//!   <point name="light" color="0 1 0" box="-8 -8 -8 8 8 8">
//!     Non-displayed light.
//!     <integer key="light" name="Brightness" value="300"/>
//!     <style key="style" name="Appearance" value="0"/>
//!   </point>
//! </classes>
//! ```

mod parser;
mod xml;

pub use parser::EntParser;
