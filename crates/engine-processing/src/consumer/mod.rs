pub mod writer;

pub use writer::BatchWriter;
