mod error;
mod pipeline;
mod profile;

pub use error::ConvertError;
pub use pipeline::{Conversion, Converter};
pub use profile::Profile;
