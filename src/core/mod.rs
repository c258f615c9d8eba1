pub mod screening;
pub mod video;
