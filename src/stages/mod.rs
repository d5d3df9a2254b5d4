mod align;
mod classify;

pub use align::AlignStage;
pub use classify::{ClassifyOutcome, ClassifyStage};
