//! Reversible memory for backtracking search.
//!
//! The centerpiece is the [`Trail`]: a world stack plus an undo log that makes
//! state restoration after a failed decision an O(1)-amortized operation per
//! mutated cell. Search code allocates [`ReversibleInt`], [`ReversibleLong`]
//! and [`ReversibleBitSet`] cells through a shared [`Env`] handle; every
//! mutation registers at most one undo record per open world, and popping a
//! world replays those records in reverse.
//!
//! # Example
//!
//! ```
//! use treeline_core::Env;
//!
//! let env = Env::new();
//! let x = env.make_int(5);
//!
//! env.world_push();
//! x.set(9);
//! assert_eq!(x.get(), 9);
//!
//! env.world_pop();
//! assert_eq!(x.get(), 5);
//! ```

mod bitset;
mod cell;
mod trail;

pub use bitset::ReversibleBitSet;
pub use cell::{ReversibleInt, ReversibleLong};
pub use trail::{Env, Trail};
