use std::cell::{Cell, RefCell};

use super::JarStore;
use crate::errors::{JarError, Result};
use crate::models::Jar;

/// In-process store for tests. Can be told to fail saves.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) saved: RefCell<Vec<Jar>>,
    pub(crate) saves: Cell<usize>,
    pub(crate) fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub(crate) fn with(jars: Vec<Jar>) -> Self {
        Self {
            saved: RefCell::new(jars),
            ..Self::default()
        }
    }
}

impl JarStore for MemoryStore {
    fn load(&self) -> Vec<Jar> {
        self.saved.borrow().clone()
    }

    fn save(&self, jars: &[Jar]) -> Result<()> {
        if self.fail_saves.get() {
            return Err(JarError::Persistence("disk full".into()));
        }
        *self.saved.borrow_mut() = jars.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

impl<T: JarStore + ?Sized> JarStore for std::rc::Rc<T> {
    fn load(&self) -> Vec<Jar> {
        (**self).load()
    }

    fn save(&self, jars: &[Jar]) -> Result<()> {
        (**self).save(jars)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
