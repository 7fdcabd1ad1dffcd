pub mod dividend;
pub mod projection;
