/// Ordered set of name/value string pairs attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventParams {
    pairs: Vec<(String, String)>,
}

impl EventParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair, keeping insertion order.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((name.into(), value.to_string()));
        self
    }

    /// Returns the first value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Receiver of render-system events.
pub trait RenderSystemListener {
    /// Invoked synchronously from `fire_event`.
    fn event_occurred(&mut self, name: &str, params: Option<&EventParams>);
}

/// Handle returned by `ListenerList::add`, used to remove the listener later.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// Multicast listener list.
///
/// Dispatch order is unspecified to callers. Listeners receive `&mut self`
/// only, so they cannot reach back into the list during dispatch.
#[derive(Default)]
pub struct ListenerList {
    listeners: Vec<(ListenerId, Box<dyn RenderSystemListener>)>,
    next_id: u64,
}

impl ListenerList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn RenderSystemListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    /// Removes and returns the listener; `None` if it was never added or already removed.
    pub fn remove(&mut self, id: ListenerId) -> Option<Box<dyn RenderSystemListener>> {
        let pos = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(pos).1)
    }

    pub fn fire(&mut self, name: &str, params: Option<&EventParams>) {
        log::trace!("event `{name}` -> {} listener(s)", self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener.event_occurred(name, params);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Sink(Rc<RefCell<Vec<String>>>);

    impl RenderSystemListener for Sink {
        fn event_occurred(&mut self, name: &str, params: Option<&EventParams>) {
            let n = params.map_or(0, EventParams::len);
            self.0.borrow_mut().push(format!("{name}:{n}"));
        }
    }

    #[test]
    fn params_keep_insertion_order() {
        let p = EventParams::new().with("b", 2).with("a", "x");
        let pairs: Vec<_> = p.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "x")]);
        assert_eq!(p.get("a"), Some("x"));
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn fire_reaches_every_listener() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ListenerList::new();
        list.add(Box::new(Sink(log.clone())));
        list.add(Box::new(Sink(log.clone())));

        list.fire("DeviceLost", Some(&EventParams::new().with("k", 1)));
        assert_eq!(*log.borrow(), vec!["DeviceLost:1", "DeviceLost:1"]);
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ListenerList::new();
        let id = list.add(Box::new(Sink(log.clone())));

        assert!(list.remove(id).is_some());
        assert!(list.remove(id).is_none());

        list.fire("Ping", None);
        assert!(log.borrow().is_empty());
        assert!(list.is_empty());
    }
}
