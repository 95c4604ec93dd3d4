//! Fixed-capacity storage shared between interrupt and loop context.

mod ring;

pub use ring::Ring;
