use crate::activations::GruUnitAttrs;
use crate::tensors::Ten64;

#[allow(clippy::too_many_arguments)]
pub fn cuda_gru_unit(
    input: &Ten64,
    hidden_prev: &Ten64,
    weight: &Ten64,
    bias: &Ten64,
    gate: &mut Ten64,
    reset_hidden_prev: &mut Ten64,
    hidden: &mut Ten64,
    attrs: GruUnitAttrs,
) -> bool {
    // TODO: implement using `cust` crate
    super::wgpu::wgpu_gru_unit(
        input,
        hidden_prev,
        weight,
        bias,
        gate,
        reset_hidden_prev,
        hidden,
        attrs,
    ) // wgpu fallback
}

#[allow(clippy::too_many_arguments)]
pub fn cuda_gru_unit_grad(
    hidden_prev: &Ten64,
    weight: &Ten64,
    gate: &Ten64,
    reset_hidden_prev: &Ten64,
    hidden_grad: &Ten64,
    input_grad: &mut Ten64,
    hidden_prev_grad: &mut Ten64,
    weight_grad: &mut Ten64,
    bias_grad: &mut Ten64,
    attrs: GruUnitAttrs,
) -> bool {
    // TODO: implement with a fused GPU kernel
    super::wgpu::wgpu_gru_unit_grad(
        hidden_prev,
        weight,
        gate,
        reset_hidden_prev,
        hidden_grad,
        input_grad,
        hidden_prev_grad,
        weight_grad,
        bias_grad,
        attrs,
    ) // wgpu fallback
}
