use std::collections::VecDeque;

use tracing::debug;

use crate::error::ReleaseFailure;
use crate::source::Source;
use crate::view::ByteView;

/// A source plus its position in feed order.
struct Slot<'s> {
  id: usize,
  source: Source<'s>,
}

/// The current source plus a FIFO of pending ones, consumed as one
/// logical input.
///
/// The chain never decides on its own that the input is over. It only
/// suspects a tail after the decoder reports that `current` holds no
/// complete value, and confirms it when nothing is pending:
///
/// ```text
///                     decode ok
///            ┌─────────────────────────────┐
///            ▼                             │
///   ┌─────────────────┐  incomplete  ┌─────┴──────────┐
///   │ may_be_at_tail  │ ───────────▶ │ may_be_at_tail │
///   │     = false     │              │     = true     │
///   └─────────────────┘              └───────┬────────┘
///            ▲                               │ is_at_true_end()
///            │    pending non-empty:         ├──────────────────▶ true
///            │    advance, carry bytes       │  pending empty
///            └───────────────────────────────┘
/// ```
///
/// On advance, bytes already buffered from the old source but not yet
/// consumed (the prefix of a value split across feeds) move to the front
/// of the new current source. The old source is then released if it
/// owns its stream; failures are kept and returned by
/// [`teardown`](Self::teardown).
pub struct SourceChain<'s> {
  current: Option<Slot<'s>>,
  pending: VecDeque<Slot<'s>>,
  may_be_at_tail: bool,
  next_id: usize,
  deferred: Vec<ReleaseFailure>,
}

impl<'s> SourceChain<'s> {
  #[must_use]
  pub fn new(source: Source<'s>) -> Self {
    Self {
      current: Some(Slot { id: 0, source }),
      pending: VecDeque::new(),
      may_be_at_tail: false,
      next_id: 1,
      deferred: Vec::new(),
    }
  }

  /// Queue `source` behind everything already fed. Returns its position
  /// in feed order.
  pub fn feed(&mut self, source: Source<'s>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    debug!(
      source_id = id,
      stream = source.is_stream(),
      owns_stream = source.owns_stream(),
      pending = self.pending.len() + 1,
      "source fed"
    );
    self.pending.push_back(Slot { id, source });
    id
  }

  /// Decide whether the input is really over.
  ///
  /// ```text
  /// ┌────────────────┬─────────────────┬────────────────────────────┐
  /// │ may_be_at_tail │ pending         │ Result                     │
  /// ├────────────────┼─────────────────┼────────────────────────────┤
  /// │ false          │ any             │ false                      │
  /// │ true           │ empty           │ true (confirmed tail)      │
  /// │ true           │ non-empty       │ advance, clear flag, false │
  /// └────────────────┴─────────────────┴────────────────────────────┘
  /// ```
  pub fn is_at_true_end(&mut self) -> bool {
    if !self.may_be_at_tail {
      return false;
    }
    if self.pending.is_empty() {
      debug!(source_id = self.current_id(), "tail confirmed");
      return true;
    }
    self.advance();
    self.may_be_at_tail = false;
    false
  }

  fn advance(&mut self) {
    let Some(mut next) = self.pending.pop_front() else {
      return;
    };
    let Some(mut old) = self.current.take() else {
      self.current = Some(next);
      return;
    };

    let carry = old.source.view_mut().take_buffered();
    next.source.view_mut().prepend(&carry);
    debug!(
      from = old.id,
      to = next.id,
      carried = carry.len(),
      pending = self.pending.len(),
      "advancing to next source"
    );

    let owns_stream = old.source.owns_stream();
    if let Err(error) = old.source.release() {
      debug!(source_id = old.id, %error, "release failed while advancing");
      self.deferred.push(ReleaseFailure {
        source_id: old.id,
        error,
      });
    } else if owns_stream {
      debug!(source_id = old.id, "released exhausted source");
    }
    self.current = Some(next);
  }

  /// Record that the decoder found no complete value in `current`.
  pub fn mark_tail(&mut self) {
    self.may_be_at_tail = true;
  }

  /// Record that the decoder produced a value.
  pub fn clear_tail(&mut self) {
    self.may_be_at_tail = false;
  }

  #[must_use]
  pub fn may_be_at_tail(&self) -> bool {
    self.may_be_at_tail
  }

  /// Byte view of the current source, `None` once torn down.
  pub fn current_view_mut(&mut self) -> Option<&mut ByteView<'s>> {
    self.current.as_mut().map(|slot| slot.source.view_mut())
  }

  /// Bytes buffered in the current source but not yet consumed.
  #[must_use]
  pub fn buffered_len(&self) -> usize {
    self.current.as_ref().map_or(0, |slot| slot.source.view().len())
  }

  /// Feed-order position of the current source.
  #[must_use]
  pub fn current_id(&self) -> Option<usize> {
    self.current.as_ref().map(|slot| slot.id)
  }

  /// The chain is usable while it still holds a current source.
  #[must_use]
  pub fn is_usable(&self) -> bool {
    self.current.is_some()
  }

  #[must_use]
  pub fn pending_len(&self) -> usize {
    self.pending.len()
  }

  /// Reserve buffer room in the current source.
  pub fn reserve_current(&mut self, additional: usize) {
    if let Some(view) = self.current_view_mut() {
      view.reserve(additional);
    }
  }

  /// Drop every source, releasing owned streams in feed order (current
  /// first, then pending). A failed release does not stop the others.
  ///
  /// Returns every failure, including those kept from earlier advances.
  /// After this the chain is unusable; a second call returns nothing.
  pub fn teardown(&mut self) -> Vec<ReleaseFailure> {
    let mut failures = std::mem::take(&mut self.deferred);
    let slots = self.current.take().into_iter().chain(self.pending.drain(..));
    for Slot { id, source } in slots {
      let owns_stream = source.owns_stream();
      match source.release() {
        Ok(()) if owns_stream => debug!(source_id = id, "released source"),
        Ok(()) => {}
        Err(error) => failures.push(ReleaseFailure {
          source_id: id,
          error,
        }),
      }
    }
    self.may_be_at_tail = false;
    failures
  }
}
