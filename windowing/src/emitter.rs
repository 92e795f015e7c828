use crate::ExtractRange;

/// Lets through indexes below `count` that are strictly above the last one let through.
///
/// The window runs every range extractor's output through this, and [`IndexEmitter`] applies it
/// on the extractor side.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AscendingIndexes {
    count: usize,
    last: Option<usize>,
}

impl AscendingIndexes {
    pub(crate) fn new(count: usize) -> Self {
        Self { count, last: None }
    }

    pub(crate) fn admit(&mut self, index: usize) -> bool {
        if index >= self.count {
            wwarn!(index, count = self.count, "extracted index out of bounds");
            debug_assert!(
                index < self.count,
                "extracted index out of bounds (i={index}, count={})",
                self.count
            );
            return false;
        }
        let Some(prev) = self.last else {
            self.last = Some(index);
            return true;
        };
        if index < prev {
            wwarn!(prev, next = index, "extracted indexes must ascend");
            debug_assert!(
                index > prev,
                "extracted indexes must ascend (prev={prev}, next={index})"
            );
        }
        if index <= prev {
            return false;
        }
        self.last = Some(index);
        true
    }
}

/// Building block for range extractors: forwards only indexes the window would accept.
///
/// Pinned rows (headers, sticky items) are emitted with [`Self::emit`] in order around the
/// visible span, e.g. a section header before [`Self::emit_overscanned`].
pub struct IndexEmitter<'a> {
    range: ExtractRange,
    filter: AscendingIndexes,
    emit: &'a mut dyn FnMut(usize),
}

impl<'a> IndexEmitter<'a> {
    pub fn new(range: ExtractRange, emit: &'a mut dyn FnMut(usize)) -> Self {
        Self {
            range,
            filter: AscendingIndexes::new(range.count),
            emit,
        }
    }

    pub fn range(&self) -> ExtractRange {
        self.range
    }

    /// The last index forwarded so far.
    pub fn last_emitted(&self) -> Option<usize> {
        self.filter.last
    }

    pub fn emit(&mut self, index: usize) {
        if self.filter.admit(index) {
            (self.emit)(index);
        }
    }

    /// Emits `start_index..end_index`, skipping anything at or below [`Self::last_emitted`].
    pub fn emit_span(&mut self, start_index: usize, end_index: usize) {
        let from = match self.filter.last {
            Some(last) => start_index.max(last + 1),
            None => start_index,
        };
        for i in from..end_index.min(self.range.count) {
            self.emit(i);
        }
    }

    pub fn emit_visible(&mut self) {
        self.emit_span(self.range.start_index, self.range.end_index);
    }

    pub fn emit_overscanned(&mut self) {
        let r = self.range;
        self.emit_span(
            r.start_index.saturating_sub(r.overscan),
            r.end_index.saturating_add(r.overscan),
        );
    }
}
