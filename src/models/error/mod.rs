mod transfer;
pub use transfer::*;

mod verification;
pub use verification::*;

mod flow;
pub use flow::*;
