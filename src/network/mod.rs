pub mod stream;

pub use stream::Gateway;
