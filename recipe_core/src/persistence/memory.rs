use crate::persistence::PersistenceAdapter;
use crate::{Error, Result, StoreState};

/// Adapter that keeps the last saved state in memory
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    saved: Option<StoreState>,
    fail_next_save: bool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-saved state
    pub fn with_state(state: StoreState) -> Self {
        Self {
            saved: Some(state),
            fail_next_save: false,
        }
    }

    /// Last successfully saved state
    pub fn state(&self) -> Option<&StoreState> {
        self.saved.as_ref()
    }

    /// Make the next `save` fail without touching the saved state
    pub fn fail_next_save(&mut self) {
        self.fail_next_save = true;
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&mut self) -> Result<Option<StoreState>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        if std::mem::take(&mut self.fail_next_save) {
            return Err(Error::Persistence("simulated save failure".into()));
        }
        self.saved = Some(state.clone());
        Ok(())
    }
}
