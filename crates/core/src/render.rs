use crate::{error::Result, state::Snapshot};

/// Presentation layer fed by the sampling core.
///
/// A renderer only ever sees immutable [`Snapshot`]s; it owns whatever
/// display state it needs and never touches the sample history directly.
pub trait Renderer {
    /// Draw one frame. Called once per successful tick.
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
}
