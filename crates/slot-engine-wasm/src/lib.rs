//! WASM bindings for slot-engine.
//!
//! Exposes slot finding and recurring-schedule expansion to JavaScript via
//! `wasm-bindgen`. All complex types cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use slot_engine::{expand_recurring_shifts, slots_to_json, AvailabilityRequest, RecurringShift};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Plain-Rust implementations (testable off wasm32)
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn find_slots_json(request_json: &str) -> Result<String, String> {
    let request = AvailabilityRequest::from_json(request_json).map_err(|e| e.to_string())?;
    let slots = request.run().map_err(|e| e.to_string())?;
    slots_to_json(&slots, false).map_err(|e| e.to_string())
}

fn expand_schedule_json(
    rules_json: &str,
    range_start: &str,
    range_end: &str,
    closed_json: Option<&str>,
) -> Result<String, String> {
    let rules: Vec<RecurringShift> =
        serde_json::from_str(rules_json).map_err(|e| format!("Invalid rules JSON: {}", e))?;
    let closed: Vec<NaiveDate> = match closed_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid closed dates JSON: {}", e))?
        }
        None => Vec::new(),
    };

    let schedule = expand_recurring_shifts(
        &rules,
        parse_date(range_start)?,
        parse_date(range_end)?,
        &closed,
    )
    .map_err(|e| e.to_string())?;

    serde_json::to_string(&schedule).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute available slots for a JSON availability request.
///
/// The request carries `start`, `end`, `duration`, `busy`, `schedule` and/or
/// `recurringShifts`, `config` and `serviceDurations`. Returns a JSON array of
/// `{startAt, endAt, duration, priority}` objects.
#[wasm_bindgen(js_name = "findAvailableSlots")]
pub fn find_available_slots(request_json: &str) -> Result<String, JsValue> {
    find_slots_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Expand recurring shift rules into a `{"YYYY-MM-DD": [{start, end}]}` schedule.
///
/// # Arguments
/// - `rules_json` -- JSON array of `{rrule, start, end}` objects
/// - `range_start` / `range_end` -- inclusive `YYYY-MM-DD` dates
/// - `closed_json` -- Optional JSON array of `YYYY-MM-DD` dates to leave closed
#[wasm_bindgen(js_name = "expandRecurringShifts")]
pub fn expand_recurring(
    rules_json: &str,
    range_start: &str,
    range_end: &str,
    closed_json: Option<String>,
) -> Result<String, JsValue> {
    expand_schedule_json(rules_json, range_start, range_end, closed_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}
