pub mod expint;

pub use expint::exp_integral_e1;
