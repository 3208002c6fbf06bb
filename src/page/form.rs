use std::sync::Arc;

use crate::client::GenerationApi;
use crate::error::{GenPixError, Result};
use crate::models::{FormValues, ImageResult};
use crate::page::slots::SlotAction;
use crate::page::{PageHost, SharedState, GENERIC_ERROR_MESSAGE};

pub struct FormController<G, H> {
    api: Arc<G>,
    host: Arc<H>,
    state: SharedState,
    slot_count: usize,
}

impl<G, H> FormController<G, H>
where
    G: GenerationApi,
    H: PageHost,
{
    pub fn new(api: Arc<G>, host: Arc<H>, state: SharedState, slot_count: usize) -> Self {
        Self {
            api,
            host,
            state,
            slot_count,
        }
    }

    /// Current contents of the form fields.
    pub fn values(&self) -> Result<FormValues> {
        Ok(self.state.lock()?.form.clone())
    }

    /// Stores edited field values without submitting them.
    pub fn set_values(&self, values: FormValues) -> Result<()> {
        self.state.lock()?.form = values;
        Ok(())
    }

    pub fn is_submitting(&self) -> Result<bool> {
        Ok(self.state.lock()?.submitting)
    }

    /// Sends `values` to the generation endpoint and replaces the displayed
    /// images with the result.
    ///
    /// Invalid values, and submissions made while another one is pending, are
    /// rejected before any request is made. A 403 from the endpoint opens the
    /// upsell prompt; every other failure shows a generic error. Once a request
    /// was attempted the host is always asked to refresh.
    pub async fn submit(&self, values: FormValues) -> Result<Vec<ImageResult>> {
        values.validate()?;

        {
            let mut state = self.state.lock()?;
            if state.submitting {
                return Err(GenPixError::GenerationBusy);
            }
            state.images.clear();
            state.submitting = true;
            state.board.apply(SlotAction::Reinitialize {
                count: self.slot_count,
            })?;
        }

        let outcome = self.api.generate(&values).await;
        let result = self.finish(outcome);
        self.host.refresh();
        result
    }

    fn finish(&self, outcome: Result<Vec<ImageResult>>) -> Result<Vec<ImageResult>> {
        let mut state = self.state.lock()?;
        state.submitting = false;

        match outcome {
            Ok(images) => {
                let count = images.len().max(self.slot_count);
                state.board.apply(SlotAction::Reinitialize { count })?;
                state.images = images.clone();
                state.form = FormValues::default();
                Ok(images)
            }
            Err(e) => {
                if e.status() == Some(403) {
                    log::warn!("⚠️  Generation refused: {}", e);
                    self.host.open_upsell();
                } else {
                    log::error!("❌ Generation failed: {}", e);
                    self.host.notify_error(GENERIC_ERROR_MESSAGE);
                }
                Err(e)
            }
        }
    }
}

impl<G, H> FormController<G, H> {
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }
}
