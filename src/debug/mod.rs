pub mod caps;
pub mod patch;
