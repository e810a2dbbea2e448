//! Shared arena with a non-blocking read/write phase gate.
//!
//! Many systems may read the arena at once, or one system may write it,
//! never both. Acquisition never waits: a conflicting phase comes back as
//! a [`PhaseError`] naming the outstanding phase, so schedulers can order
//! themselves after it instead of blocking a worker thread.
//!
//! Each successful write opens a new phase; reads observe the phase of
//! the last write they follow.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use satchel_arena::ItemArena;
use satchel_core::{ChildEntry, Handle, Info, ItemReader, ItemType, PhaseError, TypeDef};

struct Inner {
    arena: RwLock<ItemArena>,
    phase: AtomicU64,
    last_read: AtomicU64,
    last_write: AtomicU64,
}

/// An [`ItemArena`] shared between systems behind a phase gate.
///
/// Cloning shares the same arena.
#[derive(Clone)]
pub struct SharedArena {
    inner: Arc<Inner>,
}

// Compile-time assertion: SharedArena must be Send + Sync.
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<SharedArena>();
    }
};

impl SharedArena {
    /// Wrap an arena. No phase has been opened yet.
    pub fn new(arena: ItemArena) -> Self {
        Self {
            inner: Arc::new(Inner {
                arena: RwLock::new(arena),
                phase: AtomicU64::new(0),
                last_read: AtomicU64::new(0),
                last_write: AtomicU64::new(0),
            }),
        }
    }

    /// Enter a read phase.
    ///
    /// Fails with [`PhaseError::WriterActive`] while a [`WriteTicket`] is
    /// outstanding.
    pub fn try_read(&self) -> Result<ReadTicket<'_>, PhaseError> {
        let guard = match self.inner.arena.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(PhaseError::WriterActive {
                    phase: self.inner.last_write.load(Ordering::Acquire),
                })
            }
            Err(TryLockError::Poisoned(_)) => return Err(PhaseError::Poisoned),
        };
        let phase = self.inner.phase.load(Ordering::Acquire);
        self.inner.last_read.store(phase, Ordering::Release);
        Ok(ReadTicket { guard, phase })
    }

    /// Enter a write phase, opening a new phase number.
    ///
    /// Fails with [`PhaseError::ReadersActive`] while any [`ReadTicket`]
    /// is outstanding, and with [`PhaseError::WriterActive`] while another
    /// writer holds the arena.
    pub fn try_write(&self) -> Result<WriteTicket<'_>, PhaseError> {
        let guard = match self.inner.arena.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(self.write_conflict()),
            Err(TryLockError::Poisoned(_)) => return Err(PhaseError::Poisoned),
        };
        let phase = self.inner.phase.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.last_write.store(phase, Ordering::Release);
        Ok(WriteTicket { guard, phase })
    }

    // A blocked writer cannot tell readers from another writer through
    // `try_write`, so probe with a read attempt.
    fn write_conflict(&self) -> PhaseError {
        match self.inner.arena.try_read() {
            Err(TryLockError::WouldBlock) => PhaseError::WriterActive {
                phase: self.inner.last_write.load(Ordering::Acquire),
            },
            Err(TryLockError::Poisoned(_)) => PhaseError::Poisoned,
            Ok(_) => PhaseError::ReadersActive {
                phase: self.inner.last_read.load(Ordering::Acquire),
            },
        }
    }

    /// Number of write phases opened so far.
    pub fn phase(&self) -> u64 {
        self.inner.phase.load(Ordering::Acquire)
    }

    /// Phase observed by the most recent reader.
    pub fn last_read_phase(&self) -> u64 {
        self.inner.last_read.load(Ordering::Acquire)
    }

    /// Phase opened by the most recent writer.
    pub fn last_write_phase(&self) -> u64 {
        self.inner.last_write.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SharedArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedArena")
            .field("phase", &self.phase())
            .field("last_read", &self.last_read_phase())
            .field("last_write", &self.last_write_phase())
            .finish_non_exhaustive()
    }
}

// ── Tickets ─────────────────────────────────────────────────────

/// Shared read access to the arena, released on drop.
#[derive(Debug)]
pub struct ReadTicket<'a> {
    guard: RwLockReadGuard<'a, ItemArena>,
    phase: u64,
}

impl ReadTicket<'_> {
    /// The write phase this read follows.
    pub fn phase(&self) -> u64 {
        self.phase
    }
}

impl Deref for ReadTicket<'_> {
    type Target = ItemArena;

    fn deref(&self) -> &ItemArena {
        &self.guard
    }
}

impl ItemReader for ReadTicket<'_> {
    fn try_get(&self, handle: Handle) -> Option<&Info> {
        ItemReader::try_get(&*self.guard, handle)
    }

    fn children(&self, handle: Handle) -> &[ChildEntry] {
        ItemReader::children(&*self.guard, handle)
    }

    fn type_def(&self, item_type: ItemType) -> Option<&TypeDef> {
        ItemReader::type_def(&*self.guard, item_type)
    }
}

/// Exclusive write access to the arena, released on drop.
#[derive(Debug)]
pub struct WriteTicket<'a> {
    guard: RwLockWriteGuard<'a, ItemArena>,
    phase: u64,
}

impl WriteTicket<'_> {
    /// The phase this write opened.
    pub fn phase(&self) -> u64 {
        self.phase
    }
}

impl Deref for WriteTicket<'_> {
    type Target = ItemArena;

    fn deref(&self) -> &ItemArena {
        &self.guard
    }
}

impl DerefMut for WriteTicket<'_> {
    fn deref_mut(&mut self) -> &mut ItemArena {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_arena::ArenaConfig;

    fn shared() -> SharedArena {
        let arena = ItemArena::from_defs(vec![TypeDef::stack(10)], ArenaConfig::default()).unwrap();
        SharedArena::new(arena)
    }

    #[test]
    fn readers_share() {
        let s = shared();
        let a = s.try_read().unwrap();
        let b = s.try_read().unwrap();
        assert_eq!(a.phase(), 0);
        assert_eq!(b.len(), 0);
    }

    #[test]
    fn writer_excludes_readers() {
        let s = shared();
        let w = s.try_write().unwrap();
        assert_eq!(w.phase(), 1);
        assert_eq!(s.try_read().unwrap_err(), PhaseError::WriterActive { phase: 1 });
        assert_eq!(s.try_write().unwrap_err(), PhaseError::WriterActive { phase: 1 });
        drop(w);
        assert_eq!(s.try_read().unwrap().phase(), 1);
    }

    #[test]
    fn readers_exclude_writer() {
        let s = shared();
        drop(s.try_write().unwrap());
        let r = s.try_read().unwrap();
        assert_eq!(s.try_write().unwrap_err(), PhaseError::ReadersActive { phase: 1 });
        drop(r);
        let w = s.try_write().unwrap();
        assert_eq!(w.phase(), 2);
        assert_eq!(s.last_read_phase(), 1);
        assert_eq!(s.last_write_phase(), 2);
    }

    #[test]
    fn writes_are_visible_to_clones() {
        let s = shared();
        let other = s.clone();
        {
            let mut w = s.try_write().unwrap();
            w.add_root(ItemType(0), 3).unwrap();
        }
        let r = other.try_read().unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(other.phase(), 1);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let s = shared();
        let clone = s.clone();
        let _ = std::thread::spawn(move || {
            let _w = clone.try_write().unwrap();
            panic!("poison");
        })
        .join();
        assert_eq!(s.try_read().unwrap_err(), PhaseError::Poisoned);
        assert_eq!(s.try_write().unwrap_err(), PhaseError::Poisoned);
    }
}
