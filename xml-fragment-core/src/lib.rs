//! Ordered XML element trees plus the parse/write pair used to move them on
//! and off the wire.

pub mod parser;
pub mod tree;
pub mod writer;

pub use parser::{parse, parse_forest, ParseError};
pub use tree::{Element, Fragment};
pub use writer::{to_xml_string, write, write_forest, write_pretty, WriteError};
