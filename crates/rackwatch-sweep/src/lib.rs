//! rackwatch-sweep — the health-check sweep engine.
//!
//! One sweep is a full pass over the inventory: fetch the sweep
//! projection, probe each record's primary address on TCP 80/443/22
//! (at most 10 probes in flight), and write back only the records whose
//! computed status differs from the stored one.
//!
//! # Architecture
//!
//! ```text
//! run_sweep(store, prober)
//!   ├── store.select_for_sweep()          (fatal on error)
//!   ├── per record: skip rule → probe     (Semaphore, 10 permits)
//!   ├── diff: outcome only when status changed
//!   └── sequential write-back in fetch order (fatal on first failure)
//! ```
//!
//! Both triggers (manual HTTP, twice-daily schedule) call [`run_sweep`]
//! and differ only in what they do with the [`SweepReport`].

pub mod error;
pub mod probe;
pub mod sweep;

pub use error::SweepError;
pub use probe::{Prober, TcpProber, PROBE_PORTS, PROBE_TIMEOUT};
pub use sweep::{run_sweep, SweepReport, MAX_IN_FLIGHT, MSG_COMPLETE, MSG_NO_SERVERS};
