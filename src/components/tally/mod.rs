mod actor;
mod handle;

pub use actor::TallyParams;
pub use handle::TallyHandle;
