pub mod cysteines;
pub mod dock;
pub mod normalize;
pub mod prepare;
pub mod warheads;
