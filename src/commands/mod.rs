pub mod ask;
pub mod evaluate;
pub mod import;
