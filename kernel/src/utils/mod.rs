pub use self::logger::*;

pub mod logger;
