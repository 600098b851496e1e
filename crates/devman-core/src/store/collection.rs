// ── Reactive device collection ──
//
// Ordered device list held in a `watch` channel. Every mutation goes
// through `send_modify` and runs to completion before subscribers are
// woken, so readers never observe a half-applied change.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Device, DeviceId, DeviceStatus};
use crate::stream::DeviceSnapshot;

pub(crate) struct DeviceCollection {
    snapshot: watch::Sender<DeviceSnapshot>,
}

impl DeviceCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole collection, keeping the given order.
    pub(crate) fn replace_all(&self, devices: Vec<Device>) {
        let devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(devices));
    }

    /// Insert at the front. An existing entry with the same id is dropped
    /// so ids stay unique.
    pub(crate) fn prepend(&self, device: Device) {
        let device = Arc::new(device);
        self.snapshot.send_modify(|snap| {
            let mut next = Vec::with_capacity(snap.len() + 1);
            next.extend(snap.iter().filter(|d| d.id != device.id).cloned());
            next.insert(0, device);
            *snap = Arc::new(next);
        });
    }

    /// Swap the entry matching `id` for `device`. Returns `false` (and
    /// leaves the collection untouched) when nothing matches.
    pub(crate) fn replace(&self, id: &DeviceId, device: Device) -> bool {
        let device = Arc::new(device);
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|d| d.id == *id) else {
                return false;
            };
            let mut next = snap.as_ref().clone();
            next[pos] = device;
            *snap = Arc::new(next);
            true
        })
    }

    /// Remove the entry matching `id`. Returns `true` if one was removed.
    pub(crate) fn remove(&self, id: &DeviceId) -> bool {
        self.snapshot.send_if_modified(|snap| {
            if !snap.iter().any(|d| d.id == *id) {
                return false;
            }
            let next: Vec<Arc<Device>> = snap.iter().filter(|d| d.id != *id).cloned().collect();
            *snap = Arc::new(next);
            true
        })
    }

    /// Patch only the status of the entry matching `id`.
    pub(crate) fn set_status(&self, id: &DeviceId, status: DeviceStatus) -> bool {
        self.snapshot.send_if_modified(|snap| {
            let Some(pos) = snap.iter().position(|d| d.id == *id) else {
                return false;
            };
            let mut patched = snap[pos].as_ref().clone();
            patched.status = status;
            let mut next = snap.as_ref().clone();
            next[pos] = Arc::new(patched);
            *snap = Arc::new(next);
            true
        })
    }

    pub(crate) fn get(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.snapshot.borrow().iter().find(|d| d.id == *id).cloned()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceType;

    fn device(id: &str, name: &str) -> Device {
        Device {
            id: DeviceId::from(id),
            name: name.into(),
            ip_address: "10.0.0.1".into(),
            device_type: DeviceType::Router,
            location: "Lab".into(),
            status: DeviceStatus::Online,
        }
    }

    fn names(col: &DeviceCollection) -> Vec<String> {
        col.snapshot().iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn replace_all_keeps_server_order() {
        let col = DeviceCollection::new();
        col.replace_all(vec![device("2", "b"), device("1", "a")]);
        assert_eq!(names(&col), vec!["b", "a"]);
    }

    #[test]
    fn prepend_puts_new_device_first_and_dedupes() {
        let col = DeviceCollection::new();
        col.replace_all(vec![device("1", "a"), device("2", "b")]);
        col.prepend(device("3", "c"));
        assert_eq!(names(&col), vec!["c", "a", "b"]);

        col.prepend(device("2", "b2"));
        assert_eq!(names(&col), vec!["b2", "c", "a"]);
    }

    #[test]
    fn replace_only_touches_target() {
        let col = DeviceCollection::new();
        col.replace_all(vec![device("1", "a"), device("2", "b"), device("3", "c")]);
        let before = col.snapshot();

        assert!(col.replace(&DeviceId::from("2"), device("2", "B")));
        let after = col.snapshot();

        assert_eq!(names(&col), vec!["a", "B", "c"]);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
    }

    #[test]
    fn replace_missing_id_is_a_no_op() {
        let col = DeviceCollection::new();
        col.replace_all(vec![device("1", "a")]);
        let mut rx = col.subscribe();

        assert!(!col.replace(&DeviceId::from("9"), device("9", "z")));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(names(&col), vec!["a"]);
    }

    #[test]
    fn remove_and_set_status() {
        let col = DeviceCollection::new();
        col.replace_all(vec![device("1", "a"), device("2", "b")]);

        assert!(col.set_status(&DeviceId::from("2"), DeviceStatus::Offline));
        assert_eq!(col.get(&DeviceId::from("2")).unwrap().status, DeviceStatus::Offline);
        assert_eq!(col.get(&DeviceId::from("2")).unwrap().name, "b");

        assert!(col.remove(&DeviceId::from("1")));
        assert!(!col.remove(&DeviceId::from("1")));
        assert_eq!(col.snapshot().len(), 1);
    }
}
