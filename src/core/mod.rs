pub mod gate;
pub mod gate_type;
pub mod terminal;
pub mod wire;
