//!
//! This module interprets a window's `_NET_WM_STATE` atom set. The set is always re-queried live from the server; nothing here caches per-window state.

use x11rb::protocol::xproto::Atom;

/// The resolved `_NET_WM_STATE` sub-state atoms, kept as plain values so the
/// scans below stay pure functions over a server-returned set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StateAtoms {
    pub fullscreen: Atom,
    pub above: Atom,
    pub below: Atom,
    pub hidden: Atom,
    pub skip_taskbar: Atom,
    pub maximized_horz: Atom,
    pub maximized_vert: Atom,
    pub demands_attention: Atom,
}

/// The flags accumulated by a single pass over a window's state set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WindowFlags {
    pub fullscreen: bool,
    pub hidden: bool,
    pub maximized: bool,
    pub demands_attention: bool,
    /// Cleared when the set carries skip-taskbar: the window should not show
    /// up in taskbar-like consumers at all.
    pub valid: bool,
}

impl StateAtoms {
    /// A window is maximized only when both the horizontal and the vertical
    /// maximize atoms are present.
    #[must_use]
    pub fn is_maximized(&self, states: &[Atom]) -> bool {
        states.contains(&self.maximized_horz) && states.contains(&self.maximized_vert)
    }

    /// Above and below are mutually exclusive; the first matching atom in the
    /// server-returned order wins. That order is not guaranteed stable across
    /// window managers.
    #[must_use]
    pub fn above_or_below(&self, states: &[Atom]) -> (bool, bool) {
        for state in states {
            if *state == self.above {
                return (true, false);
            }
            if *state == self.below {
                return (false, true);
            }
        }
        (false, false)
    }

    /// Accumulates all taskbar-relevant flags in one pass over the set.
    #[must_use]
    pub fn scan(&self, states: &[Atom]) -> WindowFlags {
        let mut flags = WindowFlags {
            fullscreen: false,
            hidden: false,
            maximized: false,
            demands_attention: false,
            valid: true,
        };
        let mut maximized_dimensions = 0;
        for state in states {
            if *state == self.fullscreen {
                flags.fullscreen = true;
            } else if *state == self.hidden {
                flags.hidden = true;
            } else if *state == self.maximized_horz || *state == self.maximized_vert {
                maximized_dimensions += 1;
                if maximized_dimensions == 2 {
                    flags.maximized = true;
                }
            } else if *state == self.demands_attention {
                flags.demands_attention = true;
            } else if *state == self.skip_taskbar {
                log::debug!("window carries skip-taskbar, dropping it from taskbar consumers");
                flags.valid = false;
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULLSCREEN: Atom = 101;
    const ABOVE: Atom = 102;
    const BELOW: Atom = 103;
    const HIDDEN: Atom = 104;
    const SKIP_TASKBAR: Atom = 105;
    const MAX_HORZ: Atom = 106;
    const MAX_VERT: Atom = 107;
    const ATTENTION: Atom = 108;

    fn atoms() -> StateAtoms {
        StateAtoms {
            fullscreen: FULLSCREEN,
            above: ABOVE,
            below: BELOW,
            hidden: HIDDEN,
            skip_taskbar: SKIP_TASKBAR,
            maximized_horz: MAX_HORZ,
            maximized_vert: MAX_VERT,
            demands_attention: ATTENTION,
        }
    }

    #[test]
    fn maximized_needs_both_dimensions() {
        let a = atoms();
        assert!(a.is_maximized(&[MAX_HORZ, MAX_VERT]));
        assert!(a.is_maximized(&[MAX_VERT, FULLSCREEN, MAX_HORZ]));
        assert!(!a.is_maximized(&[MAX_HORZ]));
        assert!(!a.is_maximized(&[MAX_VERT]));
        assert!(!a.is_maximized(&[]));
    }

    #[test]
    fn first_matching_stacking_atom_wins() {
        let a = atoms();
        assert_eq!(a.above_or_below(&[ABOVE, BELOW]), (true, false));
        assert_eq!(a.above_or_below(&[BELOW, ABOVE]), (false, true));
        assert_eq!(a.above_or_below(&[FULLSCREEN, BELOW]), (false, true));
        assert_eq!(a.above_or_below(&[FULLSCREEN]), (false, false));
        assert_eq!(a.above_or_below(&[]), (false, false));
    }

    #[test]
    fn scan_accumulates_all_flags() {
        let a = atoms();
        let flags = a.scan(&[FULLSCREEN, HIDDEN, MAX_HORZ, MAX_VERT, ATTENTION]);
        assert!(flags.fullscreen);
        assert!(flags.hidden);
        assert!(flags.maximized);
        assert!(flags.demands_attention);
        assert!(flags.valid);
    }

    #[test]
    fn scan_on_empty_set_yields_valid_defaults() {
        let flags = atoms().scan(&[]);
        assert_eq!(
            flags,
            WindowFlags {
                fullscreen: false,
                hidden: false,
                maximized: false,
                demands_attention: false,
                valid: true,
            }
        );
    }

    #[test]
    fn scan_half_maximized_is_not_maximized() {
        let flags = atoms().scan(&[MAX_HORZ]);
        assert!(!flags.maximized);
    }

    #[test]
    fn skip_taskbar_clears_validity() {
        let flags = atoms().scan(&[SKIP_TASKBAR, FULLSCREEN]);
        assert!(!flags.valid);
        assert!(flags.fullscreen);
    }
}
