/// Identifies one scheduled frame task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    id: u64,
    due_frame: u64,
}

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn due_frame(&self) -> u64 {
        self.due_frame
    }
}

/// A slot holding at most one pending frame task.
///
/// Scheduling replaces whatever was pending, so a task superseded by a newer one never fires.
/// The host calls [`Self::poll`] with its current frame number.
#[derive(Clone, Debug, Default)]
pub struct FrameSlot {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_frame: u64) -> FrameHandle {
        if let Some(_prev) = self.pending {
            atrace!(id = _prev.id, "frame task superseded");
        }
        let handle = FrameHandle {
            id: self.next_id,
            due_frame,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(handle);
        handle
    }

    /// Cancels `handle` if it is still the pending task.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn cancel_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending task if it is due at `frame`.
    pub fn poll(&mut self, frame: u64) -> Option<FrameHandle> {
        match self.pending {
            Some(handle) if handle.due_frame <= frame => self.pending.take(),
            _ => None,
        }
    }
}
