pub mod generics;
#[cfg(feature = "chumsky")]
pub mod parser;
pub mod types;
pub mod utils;
