pub mod app;
pub mod render;
pub mod state;

pub use app::App;
pub use state::{FeedState, UiState};

pub mod prelude {
    pub use crate::app::App;
    pub use crate::state::{FeedState, UiState};
    pub use ht_core::{NewsBackend, Result};
}
