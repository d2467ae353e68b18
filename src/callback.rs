//! Training callbacks
//!
//! Generalizes a per-batch `action()` hook into a small event system:
//! callbacks observe batch and epoch boundaries and may ask the loop to
//! stop.

/// State handed to callbacks after each batch or epoch
#[derive(Clone, Debug)]
pub struct BatchContext {
    /// Completed epochs so far (0-indexed during the first epoch)
    pub epoch: usize,
    /// Batch index within the epoch
    pub step: usize,
    /// Batches in this epoch
    pub steps_per_epoch: usize,
    /// Samples in the batch just processed
    pub batch_len: usize,
    /// Loss on the batch just processed
    pub loss: f32,
    /// Accuracy on the batch just processed
    pub accuracy: f32,
    /// Current learning rate
    pub lr: f32,
}

impl Default for BatchContext {
    fn default() -> Self {
        Self {
            epoch: 0,
            step: 0,
            steps_per_epoch: 0,
            batch_len: 0,
            loss: 0.0,
            accuracy: 0.0,
            lr: 0.0,
        }
    }
}

/// Action requested by a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Keep going
    Continue,
    /// Abort the remainder of the epoch
    Stop,
}

/// Hooks into the training loop. All methods default to no-ops, so an
/// implementation only overrides the events it cares about.
pub trait TrainerCallback {
    /// Called before an epoch starts
    fn on_epoch_begin(&mut self, _ctx: &BatchContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after every training batch
    fn on_batch_end(&mut self, _ctx: &BatchContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called once per completed epoch
    fn on_epoch_end(&mut self, _ctx: &BatchContext) {}

    /// Called after an evaluation pass
    fn on_eval_end(&mut self, _ctx: &BatchContext) {}

    /// Callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}

/// Dispatches events to registered callbacks in order
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Register a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn on_epoch_begin(&mut self, ctx: &BatchContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_epoch_begin(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }

    pub fn on_batch_end(&mut self, ctx: &BatchContext) -> CallbackAction {
        for cb in &mut self.callbacks {
            if cb.on_batch_end(ctx) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }

    pub fn on_epoch_end(&mut self, ctx: &BatchContext) {
        for cb in &mut self.callbacks {
            cb.on_epoch_end(ctx);
        }
    }

    pub fn on_eval_end(&mut self, ctx: &BatchContext) {
        for cb in &mut self.callbacks {
            cb.on_eval_end(ctx);
        }
    }
}

/// Logs training progress through the `log` facade
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    log_interval: usize,
}

impl ProgressCallback {
    /// Log every `log_interval` batches
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_batch_end(&mut self, ctx: &BatchContext) -> CallbackAction {
        if (ctx.step + 1) % self.log_interval == 0 {
            log::info!(
                "epoch {} batch {}/{}: loss={:.4} acc={:.4}",
                ctx.epoch,
                ctx.step + 1,
                ctx.steps_per_epoch,
                ctx.loss,
                ctx.accuracy
            );
        }
        CallbackAction::Continue
    }

    fn on_epoch_end(&mut self, ctx: &BatchContext) {
        log::info!(
            "epoch {} done: loss={:.4} acc={:.4} (lr {:.2e})",
            ctx.epoch,
            ctx.loss,
            ctx.accuracy,
            ctx.lr
        );
    }

    fn on_eval_end(&mut self, ctx: &BatchContext) {
        log::info!("eval: loss={:.4} acc={:.4}", ctx.loss, ctx.accuracy);
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}
