pub mod error;
pub mod render;
pub mod state;

pub use error::{FreqError, Result};
pub use render::Renderer;
pub use state::{CoreId, CoreSeries, FrequencyRange, FrequencyReading, Snapshot, Strategy};
