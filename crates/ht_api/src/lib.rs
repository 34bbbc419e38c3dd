pub mod client;

pub use client::ApiClient;

pub mod prelude {
    pub use crate::client::ApiClient;
    pub use ht_core::{NewsBackend, Result};
}
