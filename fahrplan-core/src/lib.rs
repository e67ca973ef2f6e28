mod form;
mod generate;
mod models;
mod timeconv;

pub use form::*;
pub use generate::*;
pub use models::*;
pub use timeconv::*;
