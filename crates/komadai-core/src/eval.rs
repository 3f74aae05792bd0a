use crate::position::GameState;
use crate::types::Score;

/// Static evaluation from sente's point of view.
pub trait Evaluator {
    fn evaluate(&self, state: &GameState) -> Score;
}
