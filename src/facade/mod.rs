pub mod host;

pub use host::Host;
