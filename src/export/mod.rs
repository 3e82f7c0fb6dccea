//! XKT export.
//!
//! [`write_xkt_model`] serializes a finalized model; [`XktReader`] reads the
//! container back for inspection.

pub mod reader;
pub mod xkt;

pub use reader::XktReader;
pub use xkt::{
    escape_non_ascii, to_array_buffer, write_xkt_model, Section, WriteOptions, XktData,
    XKT_VERSION,
};
