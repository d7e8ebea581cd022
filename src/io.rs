//! Result output.
//!
//! The visualiser format is line oriented: every call to
//! [`VizElementsWriter::write_results`] appends one line holding the time and,
//! for each live element, its site count followed by its site indices.

mod viz_writer;

pub use viz_writer::*;
