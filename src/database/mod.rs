pub mod pool;
pub mod slot;
