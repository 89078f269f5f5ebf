pub mod gate;
pub mod policy;

pub use gate::InviteGate;
pub use policy::InviteMode;
