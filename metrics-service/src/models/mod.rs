pub mod book;
pub mod context;
pub mod responses;
pub mod source;
