//! Property-based tests for the debounce filter and stick synthesis.

use padcore::input::debounce::{ButtonHistory, Debouncer};
use padcore::input::stick::{stick_scale, synthesize, OutputMode, StickIntent};
use padcore::input::{LogicalLine, NormalizedInputState, RawInputSnapshot, StickState};
use proptest::prelude::*;

fn directions(up: bool, down: bool, left: bool, right: bool) -> RawInputSnapshot {
    let mut snapshot = RawInputSnapshot::default();
    snapshot.set(LogicalLine::StickUp, up);
    snapshot.set(LogicalLine::StickDown, down);
    snapshot.set(LogicalLine::StickLeft, left);
    snapshot.set(LogicalLine::StickRight, right);
    snapshot
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// Accepted value changes at most once in any window shorter than the dwell.
    #[test]
    fn prop_debounce_holds_under_noise(
        dwell in 2u64..64,
        start in any::<u64>(),
        steps in proptest::collection::vec((any::<bool>(), 0u64..8), 1..200),
    ) {
        let debouncer = Debouncer::new(dwell);
        let mut history = ButtonHistory { state: false, tick: start };
        let mut now = start;
        let mut last_change: Option<u64> = None;
        let mut previous = false;

        for (raw, step) in steps {
            now = now.wrapping_add(step);
            let accepted = debouncer.debounce(raw, &mut history, now);
            if accepted != previous {
                if let Some(tick) = last_change {
                    prop_assert!(now.wrapping_sub(tick) >= dwell);
                }
                prop_assert!(now.wrapping_sub(start) >= dwell);
                last_change = Some(now);
                previous = accepted;
            }
        }
    }

    /// A value held for the dwell is accepted at the first tick reaching it.
    #[test]
    fn prop_debounce_tracks_held_value(
        dwell in 1u64..64,
        accepted_at in any::<u64>(),
        state in any::<bool>(),
    ) {
        let debouncer = Debouncer::new(dwell);
        let mut history = ButtonHistory { state, tick: accepted_at };

        for offset in 0..dwell {
            let now = accepted_at.wrapping_add(offset);
            prop_assert_eq!(debouncer.debounce(!state, &mut history, now), state);
        }

        let now = accepted_at.wrapping_add(dwell);
        prop_assert_eq!(debouncer.debounce(!state, &mut history, now), !state);
        prop_assert_eq!(history, ButtonHistory { state: !state, tick: now });
    }

    /// Opposing directions cancel regardless of the other axis.
    #[test]
    fn prop_socd_resolves_to_neutral(left in any::<bool>(), right in any::<bool>(), up in any::<bool>(), down in any::<bool>()) {
        let vertical = StickIntent::from_directions(true, true, left, right);
        prop_assert_eq!(vertical.vertical, 0);

        let horizontal = StickIntent::from_directions(up, down, true, true);
        prop_assert_eq!(horizontal.horizontal, 0);
    }

    /// Only the selected representation carries input.
    #[test]
    fn prop_modes_are_exclusive(
        up in any::<bool>(),
        down in any::<bool>(),
        left in any::<bool>(),
        right in any::<bool>(),
        mode_ls in any::<bool>(),
        mode_rs in any::<bool>(),
    ) {
        let mut snapshot = directions(up, down, left, right);
        snapshot.set(LogicalLine::ModeLs, mode_ls);
        snapshot.set(LogicalLine::ModeRs, mode_rs);
        let intent = StickIntent::from_directions(up, down, left, right);

        let mut out = NormalizedInputState::default();
        let mode = synthesize(&snapshot, &mut out);

        match mode {
            OutputMode::DigitalPad => {
                prop_assert!(!mode_ls && !mode_rs);
                prop_assert_eq!(out.dpad, intent.compass());
                prop_assert_eq!((out.left_stick_x, out.left_stick_y), (0x80, 0x80));
                prop_assert_eq!((out.right_stick_x, out.right_stick_y), (0x80, 0x80));
            }
            OutputMode::LeftStick => {
                prop_assert!(mode_ls);
                prop_assert_eq!(out.dpad, StickState::Neutral);
                prop_assert_eq!(out.left_stick_x, stick_scale(intent.horizontal));
                prop_assert_eq!(out.left_stick_y, stick_scale(intent.vertical));
                prop_assert_eq!((out.right_stick_x, out.right_stick_y), (0x80, 0x80));
            }
            OutputMode::RightStick => {
                prop_assert!(mode_rs && !mode_ls);
                prop_assert_eq!(out.dpad, StickState::Neutral);
                prop_assert_eq!((out.left_stick_x, out.left_stick_y), (0x80, 0x80));
                prop_assert_eq!(out.right_stick_x, stick_scale(intent.horizontal));
                prop_assert_eq!(out.right_stick_y, stick_scale(intent.vertical));
            }
        }
    }

    /// Intent components always stay within {-1, 0, 1}.
    #[test]
    fn prop_intent_is_unit(up in any::<bool>(), down in any::<bool>(), left in any::<bool>(), right in any::<bool>()) {
        let intent = StickIntent::from_directions(up, down, left, right);
        prop_assert!((-1..=1).contains(&intent.horizontal));
        prop_assert!((-1..=1).contains(&intent.vertical));
        prop_assert_eq!(intent.compass() == StickState::Neutral, intent == StickIntent::default());
    }
}
