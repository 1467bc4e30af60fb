//! Domain logic - pure release rules independent of git and the filesystem

pub mod branch;
pub mod commit;
pub mod tag;
pub mod version;

pub use branch::ReleaseBranch;
pub use commit::{filter_and_sort, CommitLine};
pub use tag::{release_tag, MessagePattern};
pub use version::Version;
