//! The process-wide configuration.
//!
//! [`Registry`] loads at most one [`Gonfik`] and serves it from then on. The
//! check-then-create step runs under a mutex, so concurrent first callers
//! trigger exactly one load; the rest wait and receive the stored handle.
//!
//! A failed load stores no handle. Every caller that was already waiting when
//! the attempt finished gets that attempt's error (the same
//! [`GonfikError::InitFailed`] for all of them) instead of loading again. Only
//! a call that arrives after the failure starts a new attempt. There is no
//! teardown: a stored handle lives as long as the registry, which for
//! [`global`] is the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::GonfikError;
use crate::handle::Gonfik;

pub struct Registry {
    cell: OnceLock<Gonfik>,
    /// Error of the most recent failed attempt.
    init: Mutex<Option<Arc<GonfikError>>>,
    /// Number of failed attempts so far. Only written with `init` held.
    failures: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(None),
            failures: AtomicU64::new(0),
        }
    }

    /// The stored handle, without triggering a load.
    pub fn get(&self) -> Option<&Gonfik> {
        self.cell.get()
    }

    /// Return the stored handle, loading it with the default builder on the
    /// first successful call.
    ///
    /// The load applies `.env` override files to the process environment;
    /// see [`GonfikBuilder::load`](crate::GonfikBuilder::load) for the
    /// threading requirement that comes with it.
    pub fn get_or_init(&self) -> Result<&Gonfik, GonfikError> {
        self.get_or_try_init_with(|| Gonfik::builder().load())
    }

    /// Like [`get_or_init`](Self::get_or_init) with a caller-supplied loader.
    ///
    /// Once a handle is stored, `init` is never called again and no I/O or
    /// environment read happens. Errors are always
    /// [`GonfikError::InitFailed`], shared by every caller of one attempt.
    pub fn get_or_try_init_with<F>(&self, init: F) -> Result<&Gonfik, GonfikError>
    where
        F: FnOnce() -> Result<Gonfik, GonfikError>,
    {
        if let Some(handle) = self.cell.get() {
            return Ok(handle);
        }
        let seen = self.failures.load(Ordering::SeqCst);

        // A panicking loader poisons the lock but never leaves a handle behind.
        let mut last_error = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.cell.get() {
            return Ok(handle);
        }
        // An attempt failed while this caller was waiting.
        if self.failures.load(Ordering::SeqCst) != seen
            && let Some(err) = last_error.as_ref()
        {
            return Err(GonfikError::InitFailed(Arc::clone(err)));
        }

        match init() {
            Ok(handle) => {
                *last_error = None;
                Ok(self.cell.get_or_init(|| handle))
            }
            Err(e) => {
                let err = Arc::new(e);
                *last_error = Some(Arc::clone(&err));
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(GonfikError::InitFailed(err))
            }
        }
    }
}

static GLOBAL: Registry = Registry::new();

/// The process-wide configuration, loaded on first successful call.
///
/// The first call applies override files, selects the document from the
/// environment, and parses it. Later calls return the same handle without
/// touching the environment or the filesystem. On failure nothing is cached
/// and the error is returned; call again to retry.
///
/// The first call writes override variables into the process environment,
/// so it must not run while other threads read or write the environment
/// (see [`GonfikBuilder::load`](crate::GonfikBuilder::load)). Calling it
/// early in `main`, before spawning threads, satisfies this.
pub fn global() -> Result<&'static Gonfik, GonfikError> {
    GLOBAL.get_or_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{CwdGuard, SAMPLE_JSON, sample_tree};
    use serial_test::serial;
    use std::fs;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;

    const SELECTION_VARS: [&str; 4] = [
        "CONFIG_DIR",
        "CONFIG_IS_PROD",
        "CONFIG_PROD_FILE",
        "CONFIG_DEV_FILE",
    ];

    fn counting_loader(count: &AtomicUsize) -> Result<Gonfik, GonfikError> {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(Gonfik::new(sample_tree(), "sample.json"))
    }

    #[test]
    fn empty_registry_has_nothing() {
        let registry = Registry::new();
        assert!(registry.get().is_none());
    }

    #[test]
    fn second_call_returns_cached_handle() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);

        let first = registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .unwrap();
        let second = registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(second.config("test.foo.bar").as_deref(), Some("config"));
    }

    #[test]
    fn failure_is_not_cached() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);

        let result = registry.get_or_try_init_with(|| {
            loads.fetch_add(1, Ordering::SeqCst);
            Err(GonfikError::KeyNotFound("boom".into()))
        });
        match result {
            Err(GonfikError::InitFailed(inner)) => {
                assert!(matches!(*inner, GonfikError::KeyNotFound(_)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(registry.get().is_none());

        let handle = registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(std::ptr::eq(handle, registry.get().unwrap()));
    }

    #[test]
    fn cached_handle_ignores_later_loader() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);
        registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .unwrap();

        let again = registry.get_or_try_init_with(|| Err(GonfikError::KeyNotFound("x".into())));
        assert!(again.is_ok());
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);

        let handles: Vec<usize> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let handle = registry
                            .get_or_try_init_with(|| {
                                std::thread::sleep(Duration::from_millis(20));
                                counting_loader(&loads)
                            })
                            .unwrap();
                        handle as *const Gonfik as usize
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn concurrent_failed_load_is_shared_by_waiters() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);
        let start = Barrier::new(8);

        let errors: Vec<usize> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        start.wait();
                        let result = registry.get_or_try_init_with(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(200));
                            Err(GonfikError::KeyNotFound("database".into()))
                        });
                        match result {
                            Err(GonfikError::InitFailed(inner)) => Arc::as_ptr(&inner) as usize,
                            other => panic!("unexpected result: {other:?}"),
                        }
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(errors.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(registry.get().is_none());

        // A call after the failure starts a fresh attempt.
        assert!(registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_loader_leaves_registry_usable() {
        let registry = Registry::new();
        let loads = AtomicUsize::new(0);

        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = registry.get_or_try_init_with(|| panic!("loader failed"));
        }));
        assert!(panicked.is_err());
        assert!(registry.get().is_none());

        assert!(registry
            .get_or_try_init_with(|| counting_loader(&loads))
            .is_ok());
    }

    #[test]
    #[serial]
    fn default_loader_reads_working_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/application.json"), SAMPLE_JSON).unwrap();
        let _cwd = CwdGuard::new(dir.path());

        temp_env::with_vars_unset(SELECTION_VARS, || {
            let registry = Registry::new();
            let first = registry.get_or_init().unwrap();
            assert_eq!(first.config("test.foo.bar").as_deref(), Some("config"));

            // The cached handle survives the document disappearing.
            fs::remove_file(dir.path().join("config/application.json")).unwrap();
            let second = registry.get_or_init().unwrap();
            assert!(std::ptr::eq(first, second));
        });
    }

    #[test]
    #[serial]
    fn default_loader_failure_then_retry() {
        let dir = TempDir::new().unwrap();
        let _cwd = CwdGuard::new(dir.path());

        temp_env::with_vars_unset(SELECTION_VARS, || {
            let registry = Registry::new();
            let err = registry.get_or_init().unwrap_err();
            assert!(err.is_not_found());

            fs::create_dir_all(dir.path().join("config")).unwrap();
            fs::write(dir.path().join("config/application.json"), SAMPLE_JSON).unwrap();
            assert!(registry.get_or_init().is_ok());
        });
    }

    #[test]
    #[serial]
    fn global_is_initialized_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/application.json"), SAMPLE_JSON).unwrap();
        let _cwd = CwdGuard::new(dir.path());

        temp_env::with_vars_unset(SELECTION_VARS, || {
            let first = global().unwrap();
            let second = Gonfik::global().unwrap();
            assert!(std::ptr::eq(first, second));
            assert_eq!(first.config("test.foo.bar").as_deref(), Some("config"));
        });
    }
}
