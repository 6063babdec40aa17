use tideline_core::{LoopModeEvent, TimeRange};

use super::at;

/// Automated delivery from the 11th to 00:05 on the 12th, resumed from 00:15
/// to noon. A stale "still active" event from the 11th is included too.
#[must_use]
pub fn events() -> Vec<LoopModeEvent> {
    vec![
        LoopModeEvent::automated(TimeRange::new(at(12, 0, 15), at(12, 12, 0))),
        LoopModeEvent::automated(TimeRange::open(at(11, 6, 0))),
        LoopModeEvent::automated(TimeRange::new(at(11, 0, 0), at(12, 0, 5))),
    ]
}
