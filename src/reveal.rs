//! Frame-driven playback of a [`Layout`].
//!
//! The layout engine only produces delays; this queue replays them against the
//! caller's clock. It is polled once per animation frame instead of arming one
//! timer per token, so cancelling a stale layout is just dropping the queue.
use crate::layout::{Group, Layout};
use crate::tokens::{TokenPair, style_class_for};

/// Drawing surface for counting tokens.
pub trait RenderSink {
    /// Remove every token and row.
    fn clear(&mut self);
    /// Append a token to (`row`, `column`). `style` is the icon's CSS class.
    fn place(&mut self, row: u32, column: u32, group: Group, token: &str, style: &str);
    /// Gray out the token that was placed `index`-th.
    fn mark_removed(&mut self, index: usize);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reveal {
    Place { row: u32, column: u32, group: Group, token: &'static str },
    Remove { index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pending {
    due_ms: u64,
    reveal: Reveal,
}

#[derive(Debug, Default)]
pub struct RevealQueue {
    pending: Vec<Pending>,
    next: usize,
    started_at: f64,
    generation: u64,
}

impl RevealQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is queued with `layout`, timed from `now`.
    pub fn load(&mut self, layout: &Layout, tokens: TokenPair, now: f64) {
        self.cancel();
        let placed = layout.placements.iter().map(|p| Pending {
            due_ms: p.reveal_delay_ms,
            reveal: Reveal::Place { row: p.row, column: p.column, group: p.group, token: tokens.for_group(p.group) },
        });
        let removed = layout.removals.iter().map(|r| Pending {
            due_ms: r.reveal_delay_ms,
            reveal: Reveal::Remove { index: r.index },
        });
        self.pending = placed.chain(removed).collect();
        // stable: equal delays keep placement order, removals after placements
        self.pending.sort_by_key(|p| p.due_ms);
        self.started_at = now;
    }

    /// Drop every pending reveal. Anything loaded before this call will never render.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.next = 0;
        self.generation += 1;
    }

    /// Bumped by every `load` / `cancel`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        self.next >= self.pending.len()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len() - self.next
    }

    /// Reveals whose delay has elapsed at `now`, in delivery order.
    pub fn take_due(&mut self, now: f64) -> Vec<Reveal> {
        let elapsed = (now - self.started_at).max(0.0);
        let start = self.next;
        while let Some(p) = self.pending.get(self.next) {
            if p.due_ms as f64 > elapsed {
                break;
            }
            self.next += 1;
        }
        self.pending[start..self.next].iter().map(|p| p.reveal).collect()
    }

    /// Deliver due reveals to `sink`; returns how many were drawn.
    pub fn drain_due(&mut self, now: f64, sink: &mut dyn RenderSink) -> usize {
        let due = self.take_due(now);
        for reveal in &due {
            deliver(*reveal, sink);
        }
        due.len()
    }

    /// Deliver everything still pending at once, ignoring delays.
    pub fn flush(&mut self, sink: &mut dyn RenderSink) -> usize {
        let rest = &self.pending[self.next..];
        for p in rest {
            deliver(p.reveal, sink);
        }
        let n = rest.len();
        self.next = self.pending.len();
        n
    }
}

fn deliver(reveal: Reveal, sink: &mut dyn RenderSink) {
    match reveal {
        Reveal::Place { row, column, group, token } => sink.place(row, column, group, token, style_class_for(token)),
        Reveal::Remove { index } => sink.mark_removed(index),
    }
}
