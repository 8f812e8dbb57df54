//! # slot-engine
//!
//! Deterministic appointment availability for booking systems.
//!
//! Given a business's shifts per date, the periods already booked, and an
//! appointment length, the engine proposes every bookable start time in a
//! range, each with a heuristic priority. It is a pure function over
//! in-memory data: no I/O, no caching, no shared state between calls.
//!
//! ## Modules
//!
//! - [`wallclock`] — `HH:MM` wall-clock times, shifts, per-date schedules
//! - [`config`] — Engine configuration (breaks, slot-start policy, scoring toggles)
//! - [`dst`] — Resolving local wall-clock times across DST transitions
//! - [`slot_start`] — Legal slot-start instants within a window
//! - [`timeline`] — Merged busy timeline and gaps for one shift
//! - [`packer`] — Greedy estimate of further appointments fitting a gap
//! - [`scorer`] — Break filter and priority heuristic for one candidate
//! - [`engine`] — `find_available_slots`, composing all of the above
//! - [`schedule`] — RRULE-based recurring shifts → per-date schedule
//! - [`request`] — JSON request envelope used by the CLI and WASM bindings
//! - [`error`] — Error types

pub mod config;
pub mod dst;
pub mod engine;
pub mod error;
pub mod packer;
pub mod request;
pub mod schedule;
pub mod scorer;
pub mod slot_start;
pub mod timeline;
pub mod wallclock;

pub use config::{EngineConfiguration, SlotStart};
pub use dst::DstPolicy;
pub use engine::{find_available_slots, TimeSlot};
pub use error::SlotError;
pub use packer::{GapPacker, Packing};
pub use request::{slots_to_json, AvailabilityRequest};
pub use schedule::{expand_recurring_shifts, RecurringShift};
pub use scorer::{ScoredSlot, ShiftContext, SlotScorer, SHIFT_EDGE_TOLERANCE_MINUTES};
pub use slot_start::{candidate_starts, SlotStartPolicy};
pub use timeline::{build_timeline, Gap, Period};
pub use wallclock::{DaySchedule, Shift, WallClockTime};
