use tokio::sync::watch;

/// Port for the online/offline flag.
pub trait Connectivity: Send + Sync {
  fn is_online(&self) -> bool;

  /// Subscribes to changes. Dropping the subscription unsubscribes.
  fn subscribe(&self) -> ConnectivitySubscription;
}

/// Connectivity flag backed by a `watch` channel.
///
/// The host (UI shell, network monitor) owns the signal and calls
/// [`ConnectivitySignal::set_online`]; consumers either read the flag or
/// keep a [`ConnectivitySubscription`] for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct ConnectivitySignal {
  tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
  pub fn new(online: bool) -> Self {
    let (tx, _rx) = watch::channel(online);
    Self { tx }
  }

  pub fn set_online(&self, online: bool) {
    // send_if_modified avoids waking subscribers when nothing changed
    self.tx.send_if_modified(|current| {
      if *current == online {
        return false;
      }
      *current = online;
      true
    });
  }

  pub fn subscriber_count(&self) -> usize {
    self.tx.receiver_count()
  }
}

impl Default for ConnectivitySignal {
  fn default() -> Self {
    Self::new(true)
  }
}

impl Connectivity for ConnectivitySignal {
  fn is_online(&self) -> bool {
    *self.tx.borrow()
  }

  fn subscribe(&self) -> ConnectivitySubscription {
    ConnectivitySubscription { rx: self.tx.subscribe() }
  }
}

/// A live subscription to connectivity changes.
#[derive(Debug)]
pub struct ConnectivitySubscription {
  rx: watch::Receiver<bool>,
}

impl ConnectivitySubscription {
  /// Latest known value, without consuming a pending change.
  pub fn current(&self) -> bool {
    *self.rx.borrow()
  }

  /// Returns the new value if it changed since the last poll.
  pub fn poll_change(&mut self) -> Option<bool> {
    match self.rx.has_changed() {
      Ok(true) => Some(*self.rx.borrow_and_update()),
      // sender gone: no more changes will ever arrive
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subscription_sees_changes_once() {
    let signal = ConnectivitySignal::new(true);
    let mut sub = signal.subscribe();

    assert_eq!(sub.poll_change(), None);

    signal.set_online(false);
    assert_eq!(sub.poll_change(), Some(false));
    assert_eq!(sub.poll_change(), None);
    assert!(!signal.is_online());
  }

  #[test]
  fn same_value_is_not_a_change() {
    let signal = ConnectivitySignal::new(true);
    let mut sub = signal.subscribe();

    signal.set_online(true);
    assert_eq!(sub.poll_change(), None);
  }

  #[test]
  fn dropping_subscription_unsubscribes() {
    let signal = ConnectivitySignal::new(false);
    let sub = signal.subscribe();
    assert_eq!(signal.subscriber_count(), 1);

    drop(sub);
    assert_eq!(signal.subscriber_count(), 0);
  }
}
