//! Typed subscriber channels
//!
//! Each channel keeps its callbacks in registration order. Registration
//! hands back a token; unsubscribing redeems the token, so callers never
//! need to keep a second handle to the closure itself.

/// Token returned by channel registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// An ordered callback list for one event payload type
pub struct SubscriberChannel<T> {
    name: &'static str,
    entries: Vec<(u64, Box<dyn FnMut(&T)>)>,
    next_token: u64,
}

impl<T> SubscriberChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            next_token: 1,
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let token = self.next_token;
        self.next_token += 1;
        self.entries.push((token, Box::new(callback)));
        Subscription(token)
    }

    /// Remove a callback by its token; returns whether anything was removed
    pub fn unsubscribe(&mut self, token: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != token.0);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Invoke every callback in registration order
    ///
    /// A panicking callback is caught and logged; the rest still run.
    pub fn emit(&mut self, payload: &T) {
        for (token, callback) in &mut self.entries {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(payload);
            }));
            if outcome.is_err() {
                log::error!(
                    "{} subscriber #{token} panicked; continuing fan-out",
                    self.name
                );
            }
        }
    }
}
