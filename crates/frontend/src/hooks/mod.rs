pub mod use_auth_gate;

pub use use_auth_gate::use_auth_gate;
