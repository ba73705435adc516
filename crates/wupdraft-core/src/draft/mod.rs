// Draft bookkeeping: positions, picks, the local roster and persisted state.

pub mod pick;
pub mod roster;
pub mod state;
