//! Training configuration and metrics history

/// Knobs for the training loop
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Mini-batch size
    pub batchsize: usize,
    /// History capacity hint for the tracker (0 keeps everything)
    pub history_limit: usize,
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batchsize(mut self, batchsize: usize) -> Self {
        self.batchsize = batchsize;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batchsize: 100,
            history_limit: 0,
        }
    }
}

/// Running counters and per-epoch history
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    /// Completed training epochs
    pub epoch: usize,
    /// Optimizer steps taken across all epochs
    pub steps: usize,
    /// Epoch-average training losses
    pub train_losses: Vec<f32>,
    /// Epoch-average training accuracies
    pub train_accuracies: Vec<f32>,
    /// Evaluation losses, one per `evaluate` call
    pub eval_losses: Vec<f32>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one optimizer step
    pub fn increment_step(&mut self) {
        self.steps += 1;
    }

    /// Close out an epoch
    pub fn record_epoch(&mut self, loss: f32, accuracy: f32, limit: usize) {
        self.epoch += 1;
        self.train_losses.push(loss);
        self.train_accuracies.push(accuracy);
        if limit > 0 {
            Self::truncate_front(&mut self.train_losses, limit);
            Self::truncate_front(&mut self.train_accuracies, limit);
        }
    }

    /// Record an evaluation pass
    pub fn record_eval(&mut self, loss: f32, limit: usize) {
        self.eval_losses.push(loss);
        if limit > 0 {
            Self::truncate_front(&mut self.eval_losses, limit);
        }
    }

    /// Loss of the most recent epoch
    pub fn last_train_loss(&self) -> Option<f32> {
        self.train_losses.last().copied()
    }

    fn truncate_front(values: &mut Vec<f32>, limit: usize) {
        if values.len() > limit {
            let excess = values.len() - limit;
            values.drain(..excess);
        }
    }
}
