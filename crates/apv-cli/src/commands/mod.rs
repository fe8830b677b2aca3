pub mod apv;
pub mod parity;
