//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array2;

/// Adam with bias-corrected first and second moment estimates
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: u64,
    m: Vec<Option<Array2<f32>>>,
    v: Vec<Option<Array2<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, eps: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            eps,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    fn ensure_state(&mut self, params: &[Tensor]) {
        if self.m.len() != params.len() {
            self.m = params.iter().map(|_| None).collect();
            self.v = params.iter().map(|_| None).collect();
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_state(params);
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                let m = match self.m[i].take() {
                    Some(prev) => prev * self.beta1 + &grad * (1.0 - self.beta1),
                    None => &grad * (1.0 - self.beta1),
                };
                let v = match self.v[i].take() {
                    Some(prev) => prev * self.beta2 + &grad.mapv(|g| g * g) * (1.0 - self.beta2),
                    None => grad.mapv(|g| g * g) * (1.0 - self.beta2),
                };

                {
                    let mut data = param.data_mut();
                    ndarray::Zip::from(&mut *data)
                        .and(&m)
                        .and(&v)
                        .for_each(|p, &m_i, &v_i| {
                            let m_hat = m_i / bias1;
                            let v_hat = v_i / bias2;
                            *p -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
                        });
                }

                self.m[i] = Some(m);
                self.v[i] = Some(v);
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
