pub mod overload;
pub mod scope;
pub mod types;
