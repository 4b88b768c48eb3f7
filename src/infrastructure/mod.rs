pub mod backend;
pub mod console;
pub mod gateway;
