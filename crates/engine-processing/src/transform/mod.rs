pub mod band;
pub mod convert;
pub mod error;

pub use band::band_for;
pub use convert::convert;
pub use error::{ConvertError, Station};
