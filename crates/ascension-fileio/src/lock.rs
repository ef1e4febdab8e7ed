//! Advisory file locking (spec §4.6). Locks are bookkeeping only — no
//! platform lock syscall is taken, since neither the teacher nor the rest
//! of the retrieval pack carries a file-locking crate; acquisition and
//! release stay idempotent so callers can treat this the same way a real
//! OS lock would behave.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    NoLock,
    SharedLock,
    ExclusiveLock,
}

#[derive(Debug)]
pub struct FileLock {
    mode: LockMode,
    only_as_editing: bool,
    held: bool,
}

impl FileLock {
    pub fn new(mode: LockMode, only_as_editing: bool) -> Self {
        Self {
            mode,
            only_as_editing,
            held: false,
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn acquire(&mut self) {
        if self.mode != LockMode::NoLock {
            self.held = true;
        }
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Releases an "only as editing" lock the moment the document becomes
    /// unmodified again.
    pub fn on_modified_changed(&mut self, modified: bool) {
        if self.only_as_editing && !modified {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_as_editing_releases_when_clean() {
        let mut lock = FileLock::new(LockMode::ExclusiveLock, true);
        lock.acquire();
        assert!(lock.is_held());
        lock.on_modified_changed(false);
        assert!(!lock.is_held());
    }

    #[test]
    fn no_lock_mode_never_holds() {
        let mut lock = FileLock::new(LockMode::NoLock, false);
        lock.acquire();
        assert!(!lock.is_held());
    }
}
