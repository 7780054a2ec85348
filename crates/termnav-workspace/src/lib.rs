pub mod translate;

pub use translate::{translate, Translation};
