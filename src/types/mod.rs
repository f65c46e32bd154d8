mod hint;
mod resolved;
mod source;

pub use hint::*;
pub use resolved::*;
pub use source::*;
