pub mod bench;
pub mod curate;
