pub mod inspect;
pub mod predict;
pub mod serve;

pub use inspect::inspect;
pub use predict::predict;
pub use serve::serve;
