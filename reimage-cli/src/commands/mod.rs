pub mod flow;
pub mod instance;
