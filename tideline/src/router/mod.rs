pub mod aggregate;
pub mod fetch;
pub mod settings;

pub mod util;
