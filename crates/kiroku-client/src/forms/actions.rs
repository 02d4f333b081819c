use std::sync::atomic::{AtomicU8, Ordering};

use super::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Update,
    Delete,
}

impl Action {
    fn bit(self) -> u8 {
        match self {
            Self::Submit => 0b001,
            Self::Update => 0b010,
            Self::Delete => 0b100,
        }
    }
}

/// Independent in-flight flags for a form's submit, update and delete actions.
#[derive(Debug, Default)]
pub struct ActionFlags {
    bits: AtomicU8,
}

impl ActionFlags {
    pub fn is_submitting(&self) -> bool {
        self.is_set(Action::Submit)
    }

    pub fn is_updating(&self) -> bool {
        self.is_set(Action::Update)
    }

    pub fn is_deleting(&self) -> bool {
        self.is_set(Action::Delete)
    }

    /// Inputs and buttons are disabled while any action runs.
    pub fn disabled(&self) -> bool {
        self.bits.load(Ordering::SeqCst) != 0
    }

    /// Marks `action` in flight until the returned guard drops.
    pub fn begin(&self, action: Action) -> Result<ActionGuard<'_>, FormError> {
        self.bits
            .compare_exchange(0, action.bit(), Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| FormError::Busy)?;
        Ok(ActionGuard {
            flags: self,
            action,
        })
    }

    fn is_set(&self, action: Action) -> bool {
        self.bits.load(Ordering::SeqCst) & action.bit() != 0
    }
}

#[derive(Debug)]
pub struct ActionGuard<'a> {
    flags: &'a ActionFlags,
    action: Action,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.flags
            .bits
            .fetch_and(!self.action.bit(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_action_at_a_time() {
        let flags = ActionFlags::default();
        assert!(!flags.disabled());

        let guard = flags.begin(Action::Delete).expect("begin");
        assert!(flags.is_deleting());
        assert!(!flags.is_submitting());
        assert!(flags.disabled());
        assert!(matches!(flags.begin(Action::Update), Err(FormError::Busy)));

        drop(guard);
        assert!(!flags.disabled());
        assert!(flags.begin(Action::Update).is_ok());
    }
}
