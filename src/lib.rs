//! Minimal supervised training loop library
//!
//! `adiestrar` wraps the mechanics of mini-batch training behind a small
//! [`Network`] type: late-bound forward/output functions, loss and accuracy
//! computation, one-epoch training over shuffled mini-batches, evaluation,
//! and flat parameter snapshots on disk.
//!
//! Numeric heavy lifting lives in the [`autograd`] module: a tape-based
//! gradient engine over `ndarray` 2-D tensors, with `affine` and `relu` as
//! the building blocks for classifier forward functions.
//!
//! # Example
//!
//! ```no_run
//! use adiestrar::ops::affine;
//! use adiestrar::{Adam, Dataset, Device, Network, SoftmaxCrossEntropy, Tensor, TrainConfig};
//! use ndarray::{arr1, arr2};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let params = vec![
//!     Tensor::zeros((2, 3), true), // weight
//!     Tensor::zeros((1, 3), true), // bias
//! ];
//! let mut net = Network::new(params, Device::Cpu, TrainConfig::default());
//! net.set_forward(|params, x| affine(x, &params[0], &params[1]));
//! net.set_optimizer(
//!     Box::new(SoftmaxCrossEntropy),
//!     Box::new(Adam::new(0.001, 0.9, 0.999, 1e-8)),
//! )
//! .unwrap();
//!
//! let data = Dataset::new(arr2(&[[0.0, 1.0], [1.0, 0.0]]), arr1(&[0, 1])).unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//! let stats = net.train_epoch(&data, &mut rng).unwrap();
//! println!("loss={:.4} acc={:.4}", stats.loss, stats.accuracy);
//! ```

pub mod autograd;
pub mod callback;
pub mod config;
pub mod data;
pub mod device;
pub mod error;
pub mod io;
pub mod loss;
pub mod metrics;
pub mod net;
pub mod optim;

pub use autograd::{backward, ops, BackwardOp, Tensor};
pub use callback::{
    BatchContext, CallbackAction, CallbackManager, ProgressCallback, TrainerCallback,
};
pub use config::{MetricsTracker, TrainConfig};
pub use data::{Batch, Dataset, MiniBatches};
pub use device::Device;
pub use error::{Error, Result};
pub use loss::{LossFn, SoftmaxCrossEntropy};
pub use metrics::{Accuracy, Metric};
pub use net::{EpochStats, Network};
pub use optim::{Adam, Optimizer, Sgd};
