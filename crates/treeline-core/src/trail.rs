//! The world stack and its undo log.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bitset::ReversibleBitSet;
use crate::cell::{ReversibleInt, ReversibleLong};

/// A single undo record.
///
/// Each record captures the previous value *and* the previous world stamp of
/// the mutated slot, so that popping a world restores both. Restoring the
/// stamp matters: world indices are reused after a pop, and a stale stamp
/// would make a later mutation in a re-opened world skip its undo record.
#[derive(Debug, Clone, Copy)]
enum Undo {
    Int { index: usize, value: i32, stamp: usize },
    Long { index: usize, value: i64, stamp: usize },
    Word { index: usize, word: usize, value: u64, stamp: usize },
}

#[derive(Debug, Clone, Copy)]
struct IntSlot {
    value: i32,
    stamp: usize,
}

#[derive(Debug, Clone, Copy)]
struct LongSlot {
    value: i64,
    stamp: usize,
}

/// Backing store of a reversible bitset: one stamp per 64-bit word.
#[derive(Debug, Clone)]
struct BitSetSlot {
    words: Vec<u64>,
    stamps: Vec<usize>,
}

/// Trailed memory: reversible slots, a linear undo log and a world stack.
///
/// Worlds are lazy checkpoints. `world_push` records nothing but the current
/// undo-log length; only slots actually mutated afterwards pay for their own
/// restoration. `world_pop` drains the log back to the matching mark, in
/// strict LIFO order.
///
/// Most callers go through the shared [`Env`] handle instead of holding the
/// `Trail` directly.
#[derive(Debug, Default)]
pub struct Trail {
    /// Current world index. World 0 is the root and can never be popped.
    world: usize,
    /// Undo-log length at each `world_push`.
    frames: Vec<usize>,
    /// The linear history of slot mutations.
    undo: Vec<Undo>,
    ints: Vec<IntSlot>,
    longs: Vec<LongSlot>,
    bitsets: Vec<BitSetSlot>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current world index.
    #[inline]
    pub fn world_index(&self) -> usize {
        self.world
    }

    /// Opens a new world on top of the current one.
    pub fn world_push(&mut self) {
        self.frames.push(self.undo.len());
        self.world += 1;
    }

    /// Closes the current world, undoing every mutation recorded since the
    /// matching `world_push`.
    ///
    /// # Panics
    ///
    /// Panics when called on the root world. Popping past the origin is a
    /// programming error in the caller's push/pop pairing, not a recoverable
    /// search event.
    pub fn world_pop(&mut self) {
        let mark = self
            .frames
            .pop()
            .expect("world stack underflow: cannot pop past the root world");
        while self.undo.len() > mark {
            let record = self.undo.pop().expect("undo log shorter than frame mark");
            match record {
                Undo::Int { index, value, stamp } => {
                    self.ints[index] = IntSlot { value, stamp };
                }
                Undo::Long { index, value, stamp } => {
                    self.longs[index] = LongSlot { value, stamp };
                }
                Undo::Word {
                    index,
                    word,
                    value,
                    stamp,
                } => {
                    let slot = &mut self.bitsets[index];
                    slot.words[word] = value;
                    slot.stamps[word] = stamp;
                }
            }
        }
        self.world -= 1;
    }

    /// Pops worlds until the index equals `world`. No-op if already there.
    pub fn world_pop_until(&mut self, world: usize) {
        tracing::trace!(from = self.world, to = world, "unwinding trail");
        while self.world > world {
            self.world_pop();
        }
    }

    fn make_int(&mut self, value: i32) -> usize {
        self.ints.push(IntSlot {
            value,
            stamp: self.world,
        });
        self.ints.len() - 1
    }

    fn make_long(&mut self, value: i64) -> usize {
        self.longs.push(LongSlot {
            value,
            stamp: self.world,
        });
        self.longs.len() - 1
    }

    fn make_bitset(&mut self, nbits: usize) -> usize {
        let words = nbits.div_ceil(64);
        self.bitsets.push(BitSetSlot {
            words: vec![0; words],
            stamps: vec![self.world; words],
        });
        self.bitsets.len() - 1
    }

    fn int(&self, index: usize) -> i32 {
        self.ints[index].value
    }

    fn set_int(&mut self, index: usize, value: i32) {
        let slot = self.ints[index];
        if slot.stamp != self.world {
            self.undo.push(Undo::Int {
                index,
                value: slot.value,
                stamp: slot.stamp,
            });
        }
        self.ints[index] = IntSlot {
            value,
            stamp: self.world,
        };
    }

    fn long(&self, index: usize) -> i64 {
        self.longs[index].value
    }

    fn set_long(&mut self, index: usize, value: i64) {
        let slot = self.longs[index];
        if slot.stamp != self.world {
            self.undo.push(Undo::Long {
                index,
                value: slot.value,
                stamp: slot.stamp,
            });
        }
        self.longs[index] = LongSlot {
            value,
            stamp: self.world,
        };
    }

    fn bit(&self, index: usize, bit: usize) -> bool {
        let slot = &self.bitsets[index];
        match slot.words.get(bit / 64) {
            Some(word) => word & (1u64 << (bit % 64)) != 0,
            None => false,
        }
    }

    fn write_bit(&mut self, index: usize, bit: usize, on: bool) {
        let world = self.world;
        let slot = &mut self.bitsets[index];
        let word = bit / 64;
        assert!(
            word < slot.words.len(),
            "bit {bit} out of range for bitset of {} words",
            slot.words.len()
        );
        let old = slot.words[word];
        let new = if on {
            old | 1u64 << (bit % 64)
        } else {
            old & !(1u64 << (bit % 64))
        };
        if new == old {
            return;
        }
        if slot.stamps[word] != world {
            let stamp = slot.stamps[word];
            self.undo.push(Undo::Word {
                index,
                word,
                value: old,
                stamp,
            });
            self.bitsets[index].stamps[word] = world;
        }
        self.bitsets[index].words[word] = new;
    }

    fn bit_count(&self, index: usize) -> u32 {
        self.bitsets[index].words.iter().map(|w| w.count_ones()).sum()
    }
}

/// Shared, single-threaded handle on a [`Trail`].
///
/// Cloning an `Env` is cheap and yields another handle on the same trail, so
/// the search loop, the moves and the model all mutate one reversible memory.
/// The handle is deliberately `!Send`: a trail belongs to exactly one solver
/// instance.
#[derive(Debug, Clone, Default)]
pub struct Env {
    trail: Rc<RefCell<Trail>>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a reversible integer bound to the current world.
    pub fn make_int(&self, value: i32) -> ReversibleInt {
        let index = self.trail.borrow_mut().make_int(value);
        ReversibleInt::new(self.clone(), index)
    }

    /// Allocates a reversible long bound to the current world.
    pub fn make_long(&self, value: i64) -> ReversibleLong {
        let index = self.trail.borrow_mut().make_long(value);
        ReversibleLong::new(self.clone(), index)
    }

    /// Allocates a reversible bitset of `nbits` bits, all clear, bound to the
    /// current world.
    pub fn make_bitset(&self, nbits: usize) -> ReversibleBitSet {
        let index = self.trail.borrow_mut().make_bitset(nbits);
        ReversibleBitSet::new(self.clone(), index, nbits)
    }

    pub fn world_index(&self) -> usize {
        self.trail.borrow().world_index()
    }

    pub fn world_push(&self) {
        self.trail.borrow_mut().world_push();
    }

    /// See [`Trail::world_pop`].
    pub fn world_pop(&self) {
        self.trail.borrow_mut().world_pop();
    }

    pub fn world_pop_until(&self, world: usize) {
        self.trail.borrow_mut().world_pop_until(world);
    }

    pub(crate) fn int(&self, index: usize) -> i32 {
        self.trail.borrow().int(index)
    }

    pub(crate) fn set_int(&self, index: usize, value: i32) {
        self.trail.borrow_mut().set_int(index, value);
    }

    pub(crate) fn long(&self, index: usize) -> i64 {
        self.trail.borrow().long(index)
    }

    pub(crate) fn set_long(&self, index: usize, value: i64) {
        self.trail.borrow_mut().set_long(index, value);
    }

    pub(crate) fn bit(&self, index: usize, bit: usize) -> bool {
        self.trail.borrow().bit(index, bit)
    }

    pub(crate) fn write_bit(&self, index: usize, bit: usize, on: bool) {
        self.trail.borrow_mut().write_bit(index, bit, on);
    }

    pub(crate) fn bit_count(&self, index: usize) -> u32 {
        self.trail.borrow().bit_count(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_index_round_trip() {
        let env = Env::new();
        assert_eq!(env.world_index(), 0);
        env.world_push();
        env.world_push();
        assert_eq!(env.world_index(), 2);
        env.world_pop();
        env.world_pop();
        assert_eq!(env.world_index(), 0);
    }

    #[test]
    fn int_round_trip() {
        let env = Env::new();
        let x = env.make_int(1);
        env.world_push();
        x.set(2);
        x.set(3);
        env.world_push();
        x.set(4);
        env.world_pop();
        assert_eq!(x.get(), 3);
        env.world_pop();
        assert_eq!(x.get(), 1);
    }

    #[test]
    fn long_round_trip() {
        let env = Env::new();
        let x = env.make_long(1 << 40);
        env.world_push();
        x.add(7);
        assert_eq!(x.get(), (1 << 40) + 7);
        env.world_pop();
        assert_eq!(x.get(), 1 << 40);
    }

    #[test]
    fn mixed_cells_scenario() {
        // push, int := 5, bit 3 := 1, push, int := 9, pop, pop
        let env = Env::new();
        let x = env.make_int(0);
        let bits = env.make_bitset(8);

        env.world_push();
        x.set(5);
        bits.set(3);
        env.world_push();
        x.set(9);

        env.world_pop();
        assert_eq!(x.get(), 5);
        assert!(bits.get(3));

        env.world_pop();
        assert_eq!(x.get(), 0);
        assert!(!bits.get(3));
    }

    #[test]
    fn stamp_restored_on_pop() {
        // A world index is reused after a pop; the slot must re-record its
        // undo data in the re-opened world.
        let env = Env::new();
        let x = env.make_int(0);
        env.world_push();
        x.set(1);
        env.world_pop();
        env.world_push();
        x.set(2);
        env.world_pop();
        assert_eq!(x.get(), 0);
    }

    #[test]
    fn mutation_in_root_world_is_permanent() {
        let env = Env::new();
        let x = env.make_int(0);
        x.set(42);
        env.world_push();
        env.world_pop();
        assert_eq!(x.get(), 42);
    }

    #[test]
    #[should_panic(expected = "world stack underflow")]
    fn pop_past_root_panics() {
        let env = Env::new();
        env.world_push();
        env.world_pop();
        env.world_pop();
    }
}
