pub mod presence;
pub mod push;
