//! Boolean encoding of bounded-length Clifford circuits: bit-vector
//! tableau columns per timestep, gate selectors whose implications pin
//! the next step's columns to the selected gate's closed-form update.

mod instance;
mod state;
mod step;

pub use instance::CircuitEncoding;
pub(crate) use state::StateVars;
pub(crate) use step::EncodedStep;
