pub mod block;
pub mod contig;

pub use block::{Block, Frame, Strand};
pub use contig::{Contig, IdType};
