pub mod canonical;
pub mod error;
pub mod parse;
pub mod step;
pub mod store;
pub mod validate;
pub mod vocab;
pub mod wasm;
