//! Sequential composition of moves.

use treeline_core::{Env, ReversibleInt};

use crate::scope::SearchScope;
use crate::strategy::Strategy;

use super::{Move, SearchMove};

/// Runs moves one after the other down a single branch: when move `i` has no
/// decision left to take, move `i + 1` continues from the current node. The
/// active index is reversible, so backtracking into an earlier segment
/// reactivates the move that owns it.
#[derive(Debug)]
pub struct MoveSeq {
    moves: Vec<SearchMove>,
    index: ReversibleInt,
}

impl MoveSeq {
    pub fn new(env: &Env, moves: Vec<SearchMove>) -> Self {
        assert!(!moves.is_empty(), "a move sequence needs at least one move");
        Self {
            moves: moves,
            index: env.make_int(0),
        }
    }

    pub(crate) fn moves_mut(&mut self) -> &mut [SearchMove] {
        &mut self.moves
    }
}

impl Move for MoveSeq {
    fn init(&mut self, scope: &mut SearchScope) -> bool {
        let mut ok = true;
        for m in &mut self.moves {
            ok &= m.init(scope);
        }
        ok
    }

    fn extend(&mut self, scope: &mut SearchScope) -> bool {
        let mut i = self.index.get() as usize;
        let mut extended = self.moves[i].extend(scope);
        while !extended && i + 1 < self.moves.len() {
            i += 1;
            // the next segment starts at the current frontier and must not
            // rewind past it
            let frontier = scope.decision_path().len();
            self.moves[i].set_top_decision_position(frontier);
            extended = self.moves[i].extend(scope);
        }
        self.index.set(i as i32);
        extended
    }

    fn repair(&mut self, scope: &mut SearchScope) -> bool {
        let mut i = self.index.get() as usize;
        let mut repaired = self.moves[i].repair(scope);
        while !repaired && i > 0 {
            i -= 1;
            // the exhausted segment consumed one world more than the next
            // repair expects to pop
            scope.env().world_push();
            repaired = self.moves[i].repair(scope);
        }
        self.index.set(i as i32);
        repaired
    }

    fn strategy(&self) -> Option<&dyn Strategy> {
        None
    }

    fn set_strategy(&mut self, _strategy: Box<dyn Strategy>) {
        panic!("a move sequence does not own a strategy; set it on a child move");
    }

    fn child_moves(&self) -> &[SearchMove] {
        &self.moves
    }

    fn set_child_moves(&mut self, moves: Vec<SearchMove>) {
        assert!(!moves.is_empty(), "a move sequence needs at least one move");
        self.moves = moves;
    }

    fn top_decision_position(&self) -> usize {
        self.moves[0].top_decision_position()
    }

    fn set_top_decision_position(&mut self, position: usize) {
        for m in &mut self.moves {
            m.set_top_decision_position(position);
        }
    }
}
