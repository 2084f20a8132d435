//! Generation-tagged request tickets used to discard stale completions.

#[derive(Debug, Clone, PartialEq, Eq)]
/// Marks one in-flight request together with the context it was issued for.
pub struct Ticket<C> {
    generation: u64,
    context: C,
}

impl<C> Ticket<C> {
    /// Generation the request was issued in.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Context the request was issued for.
    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }
}

#[derive(Debug)]
/// Issues tickets with a monotonically increasing generation.
///
/// A completion is admitted only if its ticket is the latest one issued and its context
/// still equals the current context.
pub struct RequestGate<C> {
    latest: u64,
    open: Option<C>,
}

impl<C> Default for RequestGate<C> {
    fn default() -> Self {
        Self {
            latest: 0,
            open: None,
        }
    }
}

impl<C: Clone + PartialEq> RequestGate<C> {
    /// Gate with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `context`, making every earlier ticket stale.
    pub fn issue(&mut self, context: C) -> Ticket<C> {
        self.latest = self.latest.saturating_add(1);
        self.open = Some(context.clone());
        Ticket {
            generation: self.latest,
            context,
        }
    }

    /// Make every issued ticket stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.saturating_add(1);
        self.open = None;
    }

    /// Whether a completion for `ticket` may be applied while `current` is the live context.
    ///
    /// An admitted ticket closes the gate, so a second completion for it is rejected.
    pub fn admit(&mut self, ticket: &Ticket<C>, current: &C) -> bool {
        let admitted = ticket.generation == self.latest
            && self.open.as_ref() == Some(&ticket.context)
            && ticket.context == *current;
        if admitted {
            self.open = None;
        }
        admitted
    }

    /// Whether the latest ticket is still awaiting its completion.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.open.is_some()
    }

    /// Generation of the latest ticket.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.latest
    }
}
