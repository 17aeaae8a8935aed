//!
//! 入力状態と状態遷移。
//!
//! 状態はすべて値で、キー入力ごとにStateMachineが新しいImeStateを作る。
//!
pub mod composing;
pub mod ime_state;
pub mod selecting;
pub mod special;
pub mod state_machine;

pub use composing::ComposingState;
pub use ime_state::{ImeState, InputMethodState, MarkedText};
pub use selecting::{PrevComposing, SelectingState};
pub use special::{RegisterState, SpecialState, UnregisterState};
pub use state_machine::{StateMachine, Transition};
