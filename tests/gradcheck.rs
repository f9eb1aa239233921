use gru_unit::activations::{Activation, GruUnitAttrs};
use gru_unit::ops::cpu;
use gru_unit::tensors::{Ten64, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPSILON: f64 = 1e-6;
const TOLERANCE: f64 = 1e-5;

fn random_tensor(rng: &mut StdRng, shape: Vec<usize>, lo: f64, hi: f64) -> Ten64 {
    let len = shape.iter().product();
    let data = (0..len).map(|_| rng.random_range(lo..hi)).collect();
    Tensor::new(shape, data)
}

fn numeric_check(
    name: &str,
    param: &Ten64,
    analytic: &Ten64,
    mut eval: impl FnMut(&Ten64) -> f64,
) {
    for idx in 0..param.data.len() {
        let mut plus = param.clone();
        plus.data[idx] += EPSILON;
        let mut minus = param.clone();
        minus.data[idx] -= EPSILON;
        let numeric = (eval(&plus) - eval(&minus)) / (2.0 * EPSILON);
        let diff = (numeric - analytic.data[idx]).abs();
        assert!(
            diff < TOLERANCE,
            "{name}[{idx}]: numeric {numeric} vs analytic {} (diff {diff})",
            analytic.data[idx]
        );
    }
}

/// Central-difference check of every gradient the backward kernel produces,
/// using a random linear projection of the hidden state as the loss.
fn check_gradients(batch: usize, frame: usize, attrs: GruUnitAttrs, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let input = random_tensor(&mut rng, vec![batch, 3 * frame], -0.9, 0.9);
    let hidden_prev = random_tensor(&mut rng, vec![batch, frame], -0.9, 0.9);
    let weight = random_tensor(&mut rng, vec![frame, 3 * frame], -0.7, 0.7);
    let bias = random_tensor(&mut rng, vec![1, 3 * frame], -0.5, 0.5);
    let projection = random_tensor(&mut rng, vec![batch, frame], -1.0, 1.0);

    // analytic gradients from the fused backward kernel
    let mut gate = Ten64::zeros(vec![batch, 3 * frame]);
    let mut reset_hidden_prev = Ten64::zeros(vec![batch, frame]);
    let mut hidden = Ten64::zeros(vec![batch, frame]);
    cpu::gru_unit(
        &input,
        &hidden_prev,
        &weight,
        &bias,
        &mut gate,
        &mut reset_hidden_prev,
        &mut hidden,
        attrs,
    );

    let mut input_grad = Ten64::zeros(vec![batch, 3 * frame]);
    let mut hidden_prev_grad = Ten64::zeros(vec![batch, frame]);
    let mut weight_grad = Ten64::zeros(vec![frame, 3 * frame]);
    let mut bias_grad = Ten64::zeros(vec![1, 3 * frame]);
    cpu::gru_unit_grad(
        &hidden_prev,
        &weight,
        &gate,
        &reset_hidden_prev,
        &projection,
        &mut input_grad,
        &mut hidden_prev_grad,
        &mut weight_grad,
        &mut bias_grad,
        attrs,
    );

    let forward_loss = |input: &Ten64, hidden_prev: &Ten64, weight: &Ten64, bias: &Ten64| -> f64 {
        let mut gate = Ten64::zeros(vec![batch, 3 * frame]);
        let mut reset = Ten64::zeros(vec![batch, frame]);
        let mut hidden = Ten64::zeros(vec![batch, frame]);
        cpu::gru_unit(
            input,
            hidden_prev,
            weight,
            bias,
            &mut gate,
            &mut reset,
            &mut hidden,
            attrs,
        );
        hidden
            .data
            .iter()
            .zip(&projection.data)
            .map(|(h, p)| h * p)
            .sum()
    };

    numeric_check("input", &input, &input_grad, |t| {
        forward_loss(t, &hidden_prev, &weight, &bias)
    });
    numeric_check("hidden_prev", &hidden_prev, &hidden_prev_grad, |t| {
        forward_loss(&input, t, &weight, &bias)
    });
    numeric_check("weight", &weight, &weight_grad, |t| {
        forward_loss(&input, &hidden_prev, t, &bias)
    });
    numeric_check("bias", &bias, &bias_grad, |t| {
        forward_loss(&input, &hidden_prev, &weight, t)
    });
}

#[test]
fn test_gradcheck_default_attrs() {
    check_gradients(1, 1, GruUnitAttrs::default(), 7);
    check_gradients(3, 2, GruUnitAttrs::default(), 11);
}

#[test]
fn test_gradcheck_all_activation_pairs() {
    let kinds = [
        Activation::Identity,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
    ];
    let shapes = [(1, 1), (2, 3), (3, 2)];
    for (s, &(batch, frame)) in shapes.iter().enumerate() {
        for (i, &gate_activation) in kinds.iter().enumerate() {
            for (j, &state_activation) in kinds.iter().enumerate() {
                let attrs = GruUnitAttrs {
                    gate_activation,
                    state_activation,
                };
                check_gradients(batch, frame, attrs, 100 + (16 * s + 4 * i + j) as u64);
            }
        }
    }
}
