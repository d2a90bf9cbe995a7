pub mod alignment;
pub mod builder;
pub mod config;
pub mod error;
pub mod info;
pub mod paired;

pub use alignment::BestPctgCtgAlignment;
pub use builder::PctgBuilder;
pub use config::MergeConfig;
pub use error::{Outcome, PctgError, RejectReason, Rejection};
pub use info::{Assembly, ContigInPctgInfo};
pub use paired::PairedContig;
