//! Integration tests for the training loop

use adiestrar::ops::{affine, relu};
use adiestrar::{
    Accuracy, Adam, BatchContext, CallbackAction, Dataset, Device, Metric, MiniBatches, Network,
    ProgressCallback, Sgd, SoftmaxCrossEntropy, Tensor, TrainConfig, TrainerCallback,
};
use ndarray::{Array1, Array2};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two Gaussian-ish blobs, linearly separable
fn blobs(per_class: usize) -> Dataset {
    let n = per_class * 2;
    let mut inputs = Array2::zeros((n, 2));
    let mut labels = Array1::zeros(n);
    for i in 0..per_class {
        // class 0 around (1, 0); deterministic jitter
        let j = (i % 5) as f32 * 0.02;
        inputs[[i, 0]] = 1.0 + j;
        inputs[[i, 1]] = j;
        labels[i] = 0;
        // class 1 around (0, 1)
        inputs[[per_class + i, 0]] = j;
        inputs[[per_class + i, 1]] = 1.0 + j;
        labels[per_class + i] = 1;
    }
    Dataset::new(inputs, labels).expect("rows and labels line up")
}

fn mlp_params() -> Vec<Tensor> {
    // 2 -> 4 -> 2, weights at small fixed values so training has somewhere to go
    let w1 = Tensor::new(
        Array2::from_shape_fn((2, 4), |(i, j)| 0.1 * ((i + j) % 3) as f32 - 0.05),
        true,
    );
    let b1 = Tensor::zeros((1, 4), true);
    let w2 = Tensor::new(
        Array2::from_shape_fn((4, 2), |(i, j)| 0.05 * ((i * 2 + j) % 4) as f32 - 0.05),
        true,
    );
    let b2 = Tensor::zeros((1, 2), true);
    vec![w1, b1, w2, b2]
}

#[test]
fn test_linear_classifier_learns_blobs() {
    init_logs();
    let mut net = Network::new(
        vec![Tensor::zeros((2, 2), true), Tensor::zeros((1, 2), true)],
        Device::Cpu,
        TrainConfig::new().with_batchsize(8),
    );
    net.set_forward(|params, x| affine(x, &params[0], &params[1]));
    net.set_optimizer(Box::new(SoftmaxCrossEntropy), Box::new(Sgd::new(0.5, 0.0)))
        .expect("cpu device");
    net.add_callback(ProgressCallback::new(5));

    let data = blobs(20);
    let mut rng = StdRng::seed_from_u64(7);

    let before = net.evaluate(&data).expect("bound");
    for _ in 0..30 {
        net.train_epoch(&data, &mut rng).expect("bound");
    }
    let after = net.evaluate(&data).expect("bound");

    assert!(after.loss < before.loss);
    assert!(after.accuracy > 0.95);
    assert_eq!(net.metrics.epoch, 30);
    assert_eq!(net.metrics.train_losses.len(), 30);
}

#[test]
fn test_mlp_with_adam_learns_blobs() {
    let mut net = Network::new(
        mlp_params(),
        Device::Cpu,
        TrainConfig::new().with_batchsize(10),
    );
    net.set_forward(|params, x| {
        let hidden = relu(&affine(x, &params[0], &params[1]));
        affine(&hidden, &params[2], &params[3])
    });
    net.set_optimizer(
        Box::new(SoftmaxCrossEntropy),
        Box::new(Adam::new(0.05, 0.9, 0.999, 1e-8)),
    )
    .expect("cpu device");

    let data = blobs(25);
    let mut rng = StdRng::seed_from_u64(11);

    let before = net.evaluate(&data).expect("bound");
    for _ in 0..40 {
        net.train_epoch(&data, &mut rng).expect("bound");
    }
    let after = net.evaluate(&data).expect("bound");

    assert!(after.loss < before.loss);
    assert!(after.accuracy > 0.9);
}

#[test]
fn test_every_sample_visited_once_per_epoch() {
    struct Tally {
        samples: Rc<RefCell<usize>>,
    }
    impl TrainerCallback for Tally {
        fn on_batch_end(&mut self, ctx: &BatchContext) -> CallbackAction {
            *self.samples.borrow_mut() += ctx.batch_len;
            CallbackAction::Continue
        }
    }

    let mut net = Network::new(
        vec![Tensor::zeros((2, 2), true), Tensor::zeros((1, 2), true)],
        Device::Cpu,
        TrainConfig::new().with_batchsize(7), // does not divide 50 evenly
    );
    net.set_forward(|params, x| affine(x, &params[0], &params[1]));
    net.set_optimizer(Box::new(SoftmaxCrossEntropy), Box::new(Adam::default()))
        .expect("cpu device");

    let samples = Rc::new(RefCell::new(0));
    net.add_callback(Tally {
        samples: samples.clone(),
    });

    let data = blobs(25); // 50 samples
    let mut rng = StdRng::seed_from_u64(0);
    net.train_epoch(&data, &mut rng).expect("bound");

    assert_eq!(*samples.borrow(), 50);
    // ceil(50 / 7) optimizer steps
    assert_eq!(net.metrics.steps, 8);
}

#[test]
fn test_evaluate_does_not_change_parameters() {
    let mut net = Network::new(
        mlp_params(),
        Device::Cpu,
        TrainConfig::new().with_batchsize(10),
    );
    net.set_forward(|params, x| {
        let hidden = relu(&affine(x, &params[0], &params[1]));
        affine(&hidden, &params[2], &params[3])
    });
    net.set_optimizer(Box::new(SoftmaxCrossEntropy), Box::new(Adam::default()))
        .expect("cpu device");

    let before: Vec<f32> = adiestrar::io::flatten_params(net.params());
    net.evaluate(&blobs(10)).expect("bound");
    let after: Vec<f32> = adiestrar::io::flatten_params(net.params());

    assert_eq!(before, after);
    assert_eq!(net.metrics.steps, 0);
    assert_eq!(net.metrics.eval_losses.len(), 1);
}

#[test]
fn test_accuracy_metric_matches_manual_count() {
    let logits = Tensor::new(
        ndarray::arr2(&[[3.0, 1.0], [0.0, 2.0], [1.0, 5.0], [4.0, 0.0]]),
        false,
    );
    let labels = ndarray::arr1(&[0usize, 1, 0, 0]);
    let acc = Accuracy.compute(&logits, labels.view());
    assert!((acc - 0.75).abs() < 1e-6);
}

proptest! {
    /// The epoch permutation is a bijection over 0..n for any n and batchsize
    #[test]
    fn prop_minibatch_permutation_is_bijection(n in 0usize..200, batchsize in 1usize..64, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen: Vec<usize> = MiniBatches::new(n, batchsize, &mut rng).flatten().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    /// All chunks are full-sized except possibly the last
    #[test]
    fn prop_minibatch_chunk_sizes(n in 1usize..200, batchsize in 1usize..64, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let chunks: Vec<Vec<usize>> = MiniBatches::new(n, batchsize, &mut rng).collect();
        let count = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 < count {
                prop_assert_eq!(chunk.len(), batchsize.min(n));
            } else {
                prop_assert!(chunk.len() <= batchsize);
                prop_assert!(!chunk.is_empty());
            }
        }
    }

    /// Accuracy is always a valid fraction
    #[test]
    fn prop_accuracy_bounded(rows in 1usize..30, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        use rand::Rng;
        let logits = Tensor::new(
            Array2::from_shape_fn((rows, 3), |_| rng.gen_range(-5.0f32..5.0)),
            false,
        );
        let labels = Array1::from_iter((0..rows).map(|_| rng.gen_range(0usize..3)));
        let acc = Accuracy.compute(&logits, labels.view());
        prop_assert!((0.0..=1.0).contains(&acc));
        prop_assert!(acc.is_finite());
    }
}
