//! Point and life effects of tapping a target

use super::state::TargetKind;

/// Points awarded for tapping a target
pub fn points_for(kind: TargetKind) -> i64 {
    match kind {
        TargetKind::Fizzi1
        | TargetKind::Fizzi2
        | TargetKind::Fizzi3
        | TargetKind::Fizzi4
        | TargetKind::Fizzi5 => 10,
        TargetKind::Bomb => -50,
        TargetKind::Diamond => 100,
    }
}

/// Lives gained (or lost) for tapping a target
pub fn life_delta_for(kind: TargetKind) -> i32 {
    if kind.is_hazard() { -1 } else { 0 }
}
