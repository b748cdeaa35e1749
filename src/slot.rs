use crate::types::PoseVector;
use parking_lot::Mutex;

/// A decoded pose plus the zero based cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Published {
    pub cycle: u64,
    pub pose: PoseVector,
}

#[derive(Default)]
struct Slot {
    latest: Option<Published>,
    dirty: bool,
}

/// Single slot handoff between the worker (writer) and the tick loop
/// (reader). A publish overwrites whatever was there, read or not.
#[derive(Default)]
pub struct PublishedPose {
    slot: Mutex<Slot>,
}

impl PublishedPose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, published: Published) {
        let mut slot = self.slot.lock();
        slot.latest = Some(published);
        slot.dirty = true;
    }

    /// Returns the pose only if it has not been taken yet, clearing the
    /// dirty flag.
    pub fn take(&self) -> Option<Published> {
        let mut slot = self.slot.lock();
        if !slot.dirty {
            return None;
        }
        slot.dirty = false;
        slot.latest
    }

    /// Most recent pose regardless of whether it was already taken.
    pub fn latest(&self) -> Option<Published> {
        self.slot.lock().latest
    }

    pub fn has_new(&self) -> bool {
        self.slot.lock().dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::POSE_LEN;

    fn published(cycle: u64) -> Published {
        Published {
            cycle,
            pose: PoseVector::new([cycle as f32; POSE_LEN]),
        }
    }

    #[test]
    fn take_clears_dirty() {
        let slot = PublishedPose::new();
        assert!(slot.take().is_none());
        slot.publish(published(0));
        assert!(slot.has_new());
        assert_eq!(slot.take(), Some(published(0)));
        assert!(slot.take().is_none());
        assert_eq!(slot.latest(), Some(published(0)));
    }

    #[test]
    fn publish_overwrites_unread() {
        let slot = PublishedPose::new();
        slot.publish(published(0));
        slot.publish(published(1));
        assert_eq!(slot.take().map(|p| p.cycle), Some(1));
        assert!(slot.take().is_none());
    }
}
