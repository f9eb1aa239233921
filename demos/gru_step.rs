use gru_unit::{
    activations::GruUnitAttrs,
    backprop::{gru_unit, mse_loss, sgd},
    paramio::{load_params, save_params, GruUnitParams},
    tensors::{Tensor, WithGrad},
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // training data: drive the next hidden state toward a fixed target
    let input = WithGrad::new(Tensor::new(
        vec![2, 6],
        vec![
            0.5, -0.3, 0.8, 0.1, -0.6, 0.4, -0.2, 0.7, 0.3, -0.5, 0.9, -0.1,
        ],
    ));
    let hidden_prev = WithGrad::new(Tensor::new(vec![2, 2], vec![0.2, -0.4, 0.6, 0.0]));
    let target = Tensor::new(vec![2, 2], vec![0.3, -0.2, 0.1, 0.4]);

    // initialize the weight with a small ramp and the bias at zero
    let mut weight = WithGrad::new(Tensor::new(
        vec![2, 6],
        (0..12).map(|i| 0.01 * i as f64).collect(),
    ));
    let mut bias = WithGrad::new(Tensor::new(vec![1, 6], vec![0.0; 6]));

    let attrs = GruUnitAttrs::default();
    let learning_rate = 0.1;
    let epochs = 1000;

    for epoch in 0..epochs {
        // forward: one fused GRU step
        let (hidden, back) = gru_unit(&input, &hidden_prev, &weight, &bias, attrs);
        let prediction = WithGrad::new(hidden);

        // compute loss and backprop closure
        let (loss, loss_back) = mse_loss(&prediction, &target);

        // backward pass: gradients for all four inputs in one call
        let grads = back(&loss_back(1.0));

        // accumulate gradients on the trained parameters
        for (g, wg) in grads.weight.data.iter().zip(&mut weight.grad.data) {
            *wg += *g;
        }
        for (g, bg) in grads.bias.data.iter().zip(&mut bias.grad.data) {
            *bg += *g;
        }

        sgd(&mut weight, learning_rate);
        sgd(&mut bias, learning_rate);

        if epoch % 100 == 0 {
            println!("Epoch {:4} Loss {:.6}", epoch, loss);
        }
    }

    // save parameters
    let params = GruUnitParams {
        weight: weight.value.clone(),
        bias: bias.value.clone(),
        attrs,
    };
    save_params("cell.grup", &params)?;

    // load parameters
    let restored = load_params("cell.grup")?;
    println!("Loaded weight: {:?}", restored.weight);

    Ok(())
}
