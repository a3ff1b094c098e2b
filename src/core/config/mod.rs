pub mod settings;

pub use settings::{Credentials, Settings};
