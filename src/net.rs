//! The training/evaluation wrapper
//!
//! [`Network`] sequences the framework calls for one training epoch or one
//! evaluation pass: shuffled mini-batches, zeroed gradients, forward, loss,
//! backward, optimizer step, and weighted loss/accuracy accumulation. The
//! forward computation itself is a late-bound closure installed with
//! [`Network::set_forward`]; layer introspection goes through
//! [`Network::set_output`].

use crate::autograd::backward;
use crate::callback::{BatchContext, CallbackAction, CallbackManager, TrainerCallback};
use crate::config::{MetricsTracker, TrainConfig};
use crate::data::{Batch, Dataset, MiniBatches};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::io;
use crate::loss::LossFn;
use crate::metrics::{Accuracy, Metric};
use crate::optim::Optimizer;
use crate::Tensor;
use rand::Rng;
use std::path::Path;

/// Forward computation: parameters and a batch of inputs to logits
pub type ForwardFn = dyn Fn(&[Tensor], &Tensor) -> Tensor;

/// Activation introspection: like forward, but stops at `layer`
pub type OutputFn = dyn Fn(&[Tensor], &Tensor, usize) -> Tensor;

/// Epoch-level averages, weighted by actual batch lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub loss: f32,
    pub accuracy: f32,
}

/// Wraps a parameter set and sequences training and evaluation over it.
///
/// The forward/output functions and the optimizer+loss binding are
/// late-bound; calling [`train_epoch`](Network::train_epoch) or
/// [`evaluate`](Network::evaluate) before they are installed yields
/// [`Error::ForwardNotSet`] / [`Error::OptimizerNotBound`] instead of the
/// usual dynamic-language attribute error.
pub struct Network {
    params: Vec<Tensor>,
    device: Device,
    config: TrainConfig,
    forward: Option<Box<ForwardFn>>,
    output: Option<Box<OutputFn>>,
    optimizer: Option<Box<dyn Optimizer>>,
    loss_fn: Option<Box<dyn LossFn>>,
    callbacks: CallbackManager,
    /// Counters and per-epoch history
    pub metrics: MetricsTracker,
}

impl Network {
    /// Wrap a parameter set targeting `device`
    pub fn new(params: Vec<Tensor>, device: Device, config: TrainConfig) -> Self {
        Self {
            params,
            device,
            config,
            forward: None,
            output: None,
            optimizer: None,
            loss_fn: None,
            callbacks: CallbackManager::new(),
            metrics: MetricsTracker::new(),
        }
    }

    /// Install (or replace) the forward function
    pub fn set_forward<F>(&mut self, f: F)
    where
        F: Fn(&[Tensor], &Tensor) -> Tensor + 'static,
    {
        self.forward = Some(Box::new(f));
    }

    /// Install (or replace) the activation-introspection function
    pub fn set_output<F>(&mut self, f: F)
    where
        F: Fn(&[Tensor], &Tensor, usize) -> Tensor + 'static,
    {
        self.output = Some(Box::new(f));
    }

    /// Bind the loss function and optimizer to this network's parameters.
    ///
    /// Must be called before [`train_epoch`](Network::train_epoch) or
    /// [`evaluate`](Network::evaluate). Fails when the configured device has
    /// no backend in this build.
    pub fn set_optimizer(
        &mut self,
        loss_fn: Box<dyn LossFn>,
        optimizer: Box<dyn Optimizer>,
    ) -> Result<()> {
        if !self.device.is_cpu() {
            return Err(Error::DeviceUnavailable(self.device.to_string()));
        }
        log::debug!(
            "binding {} with lr {:.2e} on {}",
            loss_fn.name(),
            optimizer.lr(),
            self.device
        );
        self.loss_fn = Some(loss_fn);
        self.optimizer = Some(optimizer);
        Ok(())
    }

    /// Register a training callback
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    pub fn params(&self) -> &[Tensor] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Current learning rate, 0.0 before an optimizer is bound
    pub fn lr(&self) -> f32 {
        self.optimizer.as_ref().map_or(0.0, |opt| opt.lr())
    }

    /// Adjust the learning rate of the bound optimizer
    pub fn set_lr(&mut self, lr: f32) -> Result<()> {
        match self.optimizer.as_mut() {
            Some(opt) => {
                opt.set_lr(lr);
                Ok(())
            }
            None => Err(Error::OptimizerNotBound),
        }
    }

    /// Run forward and loss on one batch.
    ///
    /// Returns the loss tensor and the batch accuracy. With `train: false`
    /// the loss is detached from the tape, so no backward pass can follow.
    pub fn validate(&self, batch: &Batch, train: bool) -> Result<(Tensor, f32)> {
        let forward = self.forward.as_ref().ok_or(Error::ForwardNotSet)?;
        let loss_fn = self.loss_fn.as_ref().ok_or(Error::OptimizerNotBound)?;

        let logits = forward(&self.params, &batch.inputs);
        let loss = loss_fn.forward(&logits, batch.labels.view());
        let accuracy = Accuracy.compute(&logits, batch.labels.view());

        let loss = if train { loss } else { loss.detach() };
        Ok((loss, accuracy))
    }

    /// One training epoch over `data` in shuffled mini-batches.
    ///
    /// Per batch: zero gradients, forward, loss, backward, optimizer step,
    /// then the `on_batch_end` callbacks. Every sample is visited exactly
    /// once. The returned stats are the loss/accuracy means weighted by the
    /// actual batch lengths, so a short final batch counts for what it is.
    pub fn train_epoch<R: Rng + ?Sized>(
        &mut self,
        data: &Dataset,
        rng: &mut R,
    ) -> Result<EpochStats> {
        if self.forward.is_none() {
            return Err(Error::ForwardNotSet);
        }
        if self.optimizer.is_none() || self.loss_fn.is_none() {
            return Err(Error::OptimizerNotBound);
        }

        let epoch = self.metrics.epoch;
        let batches: Vec<Vec<usize>> =
            MiniBatches::new(data.len(), self.config.batchsize, rng).collect();
        let steps_per_epoch = batches.len();

        let begin_ctx = BatchContext {
            epoch,
            steps_per_epoch,
            lr: self.lr(),
            ..Default::default()
        };
        if self.callbacks.on_epoch_begin(&begin_ctx) == CallbackAction::Stop {
            return Ok(EpochStats {
                loss: 0.0,
                accuracy: 0.0,
            });
        }

        let mut sum_loss = 0.0;
        let mut sum_accuracy = 0.0;
        let mut seen = 0usize;

        for (step, indices) in batches.into_iter().enumerate() {
            let batch = data.batch(&indices);
            let batch_len = batch.size();

            if let Some(opt) = self.optimizer.as_mut() {
                opt.zero_grad(&mut self.params);
            }

            let (loss, accuracy) = self.validate(&batch, true)?;
            backward(&loss);

            if let Some(opt) = self.optimizer.as_mut() {
                opt.step(&mut self.params);
            }

            let loss_val = loss.data()[[0, 0]];
            sum_loss += loss_val * batch_len as f32;
            sum_accuracy += accuracy * batch_len as f32;
            seen += batch_len;
            self.metrics.increment_step();

            let ctx = BatchContext {
                epoch,
                step,
                steps_per_epoch,
                batch_len,
                loss: loss_val,
                accuracy,
                lr: self.lr(),
            };
            if self.callbacks.on_batch_end(&ctx) == CallbackAction::Stop {
                log::debug!("epoch {epoch} stopped by callback at batch {step}");
                break;
            }
        }

        let stats = if seen > 0 {
            EpochStats {
                loss: sum_loss / seen as f32,
                accuracy: sum_accuracy / seen as f32,
            }
        } else {
            EpochStats {
                loss: 0.0,
                accuracy: 0.0,
            }
        };

        self.metrics
            .record_epoch(stats.loss, stats.accuracy, self.config.history_limit);

        let end_ctx = BatchContext {
            epoch,
            step: steps_per_epoch,
            steps_per_epoch,
            batch_len: seen,
            loss: stats.loss,
            accuracy: stats.accuracy,
            lr: self.lr(),
        };
        self.callbacks.on_epoch_end(&end_ctx);

        Ok(stats)
    }

    /// One evaluation pass over the whole dataset, without updates
    pub fn evaluate(&mut self, data: &Dataset) -> Result<EpochStats> {
        if self.forward.is_none() {
            return Err(Error::ForwardNotSet);
        }
        if self.loss_fn.is_none() {
            return Err(Error::OptimizerNotBound);
        }
        if data.is_empty() {
            return Ok(EpochStats {
                loss: 0.0,
                accuracy: 0.0,
            });
        }

        let batch = data.full_batch();
        let (loss, accuracy) = self.validate(&batch, false)?;
        let loss_val = loss.data()[[0, 0]];

        self.metrics.record_eval(loss_val, self.config.history_limit);

        let ctx = BatchContext {
            epoch: self.metrics.epoch,
            step: 0,
            steps_per_epoch: 1,
            batch_len: batch.size(),
            loss: loss_val,
            accuracy,
            lr: self.lr(),
        };
        self.callbacks.on_eval_end(&ctx);

        Ok(EpochStats {
            loss: loss_val,
            accuracy,
        })
    }

    /// Layer activations via the installed output function
    pub fn activations(&self, input: &Tensor, layer: usize) -> Result<Tensor> {
        let output = self.output.as_ref().ok_or(Error::OutputNotSet)?;
        Ok(output(&self.params, input, layer))
    }

    /// Write a flat parameter snapshot
    pub fn save_params(&self, path: impl AsRef<Path>) -> Result<()> {
        io::save_params(&self.params, path)
    }

    /// Restore parameters from a snapshot written by
    /// [`save_params`](Network::save_params)
    pub fn load_params(&mut self, path: impl AsRef<Path>) -> Result<()> {
        io::load_params(&mut self.params, path)
    }
}
