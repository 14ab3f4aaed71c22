//! Port definitions — traits that adapters implement.

pub mod outlet;
pub mod probe;
pub mod storage;

pub use outlet::{OutletReply, OutletRequest, OutletTransport, TransportError};
pub use probe::TemperatureProbe;
pub use storage::ReadingStore;
