//! Pure, stateless analysis used by the journal and mood handlers.
//!
//! Nothing in here touches the database or the network; handlers load rows,
//! pass them in explicitly, and persist or render whatever comes back.

pub mod mood_series;
pub mod sentiment;
