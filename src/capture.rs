// Incremental polygon capture.
//
// Pointer clicks append vertices to an in-progress buffer; a click close to
// the first vertex (or an explicit finish) closes it. Loops with at least
// three vertices become `Polygon`s in drawing order, shorter ones are
// dropped silently.
//
// The capture owns all mutable drawing state. Anything that renders
// feedback subscribes to `CaptureEvent`s instead of being called directly.

use tracing::{debug, warn};

use crate::types::{Polygon, Vertex};

/// Default closing distance to the first vertex, in display pixels.
pub const CLOSE_THRESHOLD: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// No vertex buffered.
    Idle,
    /// At least one vertex buffered.
    Drawing,
}

/// Notification emitted after every mutation.
#[derive(Debug)]
pub enum CaptureEvent<'a> {
    /// A vertex was appended. `pending` is the whole in-progress buffer,
    /// enough to redraw the marker and the connecting edges.
    VertexAdded { vertex: Vertex, pending: &'a [Vertex] },
    /// A buffer was finalized. `label` is the 1-based position in the set.
    PolygonClosed { label: usize, polygon: &'a Polygon },
    /// A closure was attempted with fewer than three vertices.
    BufferDiscarded { vertices: usize },
    /// Everything was cleared.
    Reset,
}

/// What a pointer-down did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    VertexAdded,
    /// The buffer was closed; carries the new polygon's label if one was emitted.
    Closed(Option<usize>),
}

/// What a proximity close attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Buffer empty or point too far from the first vertex; nothing changed.
    NotClosed,
    /// The buffer was closed; carries the new polygon's label if one was
    /// emitted, `None` if it was discarded for having fewer than three vertices.
    Closed(Option<usize>),
}

/// Handle returned by [`Capture::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&CaptureEvent<'_>)>;

pub struct Capture {
    pending: Vec<Vertex>,
    polygons: Vec<Polygon>,
    close_threshold: f32,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl Default for Capture {
    fn default() -> Self {
        Self::new()
    }
}

impl Capture {
    pub fn new() -> Self {
        Self::with_threshold(CLOSE_THRESHOLD)
    }

    pub fn with_threshold(close_threshold: f32) -> Self {
        Self {
            pending: Vec::new(),
            polygons: Vec::new(),
            close_threshold,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.pending.is_empty() { CaptureState::Idle } else { CaptureState::Drawing }
    }

    /// In-progress vertices, in click order.
    pub fn pending(&self) -> &[Vertex] {
        &self.pending
    }

    /// Finalized polygons, in drawing order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Owned copy of the polygon set, for exports that must not observe
    /// later mutation.
    pub fn snapshot(&self) -> Vec<Polygon> {
        self.polygons.clone()
    }

    pub fn close_threshold(&self) -> f32 {
        self.close_threshold
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CaptureEvent<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Pointer-down: close if near the first vertex, otherwise append.
    pub fn click(&mut self, point: Vertex) -> ClickOutcome {
        match self.try_close(point) {
            CloseOutcome::Closed(label) => ClickOutcome::Closed(label),
            CloseOutcome::NotClosed => {
                self.add_vertex(point);
                ClickOutcome::VertexAdded
            }
        }
    }

    /// Append a vertex. Idle becomes Drawing on the first one.
    pub fn add_vertex(&mut self, point: Vertex) {
        self.pending.push(point);
        debug!(x = point.x, y = point.y, pending = self.pending.len(), "vertex added");
        let event = CaptureEvent::VertexAdded { vertex: point, pending: &self.pending };
        notify(&mut self.subscribers, &event);
    }

    /// Close the buffer if `point` is strictly within the threshold of the
    /// first vertex.
    pub fn try_close(&mut self, point: Vertex) -> CloseOutcome {
        match self.pending.first() {
            Some(first) if first.distance(point) < self.close_threshold => {
                CloseOutcome::Closed(self.finish())
            }
            _ => CloseOutcome::NotClosed,
        }
    }

    /// Close regardless of pointer position. Always returns to Idle.
    /// Returns the 1-based label of the emitted polygon, if any.
    pub fn finish(&mut self) -> Option<usize> {
        let vertices = std::mem::take(&mut self.pending);
        let count = vertices.len();
        match Polygon::new(vertices) {
            Some(polygon) => {
                self.polygons.push(polygon);
                let label = self.polygons.len();
                debug!(label, vertices = count, "polygon closed");
                let event = CaptureEvent::PolygonClosed { label, polygon: &self.polygons[label - 1] };
                notify(&mut self.subscribers, &event);
                Some(label)
            }
            None => {
                if count > 0 {
                    warn!(vertices = count, "closed with fewer than 3 vertices, buffer discarded");
                }
                notify(&mut self.subscribers, &CaptureEvent::BufferDiscarded { vertices: count });
                None
            }
        }
    }

    /// Drop the polygon set and the buffer.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.polygons.clear();
        debug!("capture reset");
        notify(&mut self.subscribers, &CaptureEvent::Reset);
    }
}

fn notify(subscribers: &mut [(SubscriptionId, Subscriber)], event: &CaptureEvent<'_>) {
    for (_, callback) in subscribers.iter_mut() {
        callback(event);
    }
}
