pub mod counter_state;
pub mod orb_state;

pub use counter_state::CounterState;
pub use orb_state::{OrbKind, OrbState};
