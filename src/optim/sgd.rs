//! Stochastic gradient descent

use super::Optimizer;
use crate::Tensor;
use ndarray::Array2;

/// SGD with optional momentum
pub struct Sgd {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array2<f32>>>,
}

impl Sgd {
    /// Create a new SGD optimizer; `momentum` of 0.0 gives plain SGD
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    fn ensure_state(&mut self, params: &[Tensor]) {
        if self.velocities.len() != params.len() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_state(params);

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                if self.momentum > 0.0 {
                    // v = momentum * v - lr * grad
                    let velocity = match &self.velocities[i] {
                        Some(v) => v * self.momentum - &grad * self.lr,
                        None => &grad * (-self.lr),
                    };
                    {
                        let mut data = param.data_mut();
                        *data = &*data + &velocity;
                    }
                    self.velocities[i] = Some(velocity);
                } else {
                    let mut data = param.data_mut();
                    *data = &*data - &(&grad * self.lr);
                }
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_plain_sgd_step() {
        let mut opt = Sgd::new(0.1, 0.0);
        let mut params = vec![Tensor::new(arr2(&[[1.0, 2.0]]), true)];
        params[0].set_grad(arr2(&[[0.5, 1.0]]));

        opt.step(&mut params);

        let data = params[0].data();
        assert_relative_eq!(data[[0, 0]], 0.95, epsilon = 1e-6);
        assert_relative_eq!(data[[0, 1]], 1.9, epsilon = 1e-6);
    }

    #[test]
    fn test_momentum_accumulates() {
        let mut opt = Sgd::new(0.1, 0.9);
        let mut params = vec![Tensor::new(arr2(&[[0.0]]), true)];

        // same gradient twice: second step moves further
        params[0].set_grad(arr2(&[[1.0]]));
        opt.step(&mut params);
        let after_first = params[0].data()[[0, 0]];

        params[0].set_grad(arr2(&[[1.0]]));
        opt.step(&mut params);
        let after_second = params[0].data()[[0, 0]];

        assert_relative_eq!(after_first, -0.1, epsilon = 1e-6);
        // v = 0.9 * (-0.1) - 0.1 = -0.19, so -0.29 total
        assert_relative_eq!(after_second, -0.29, epsilon = 1e-6);
    }

    #[test]
    fn test_state_resized_for_new_param_list() {
        let mut opt = Sgd::new(0.1, 0.9);
        let mut one = vec![Tensor::new(arr2(&[[0.0]]), true)];
        one[0].set_grad(arr2(&[[1.0]]));
        opt.step(&mut one);

        let mut two = vec![
            Tensor::new(arr2(&[[0.0]]), true),
            Tensor::new(arr2(&[[0.0]]), true),
        ];
        two[1].set_grad(arr2(&[[1.0]]));
        opt.step(&mut two);

        assert_relative_eq!(two[1].data()[[0, 0]], -0.1, epsilon = 1e-6);
    }
}
