mod compiler;

pub use compiler::{CompilerAgent, Node, RoundEvent};
