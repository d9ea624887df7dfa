//! Project documentation rendered by rustdoc.

pub mod terminology;
