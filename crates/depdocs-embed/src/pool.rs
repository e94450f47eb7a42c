use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

const NORM_EPS: f64 = 1e-12;

/// Sentence embedding from token states: average the hidden vectors whose
/// attention mask is set, then scale each row to unit length.
///
/// `hidden` is `[batch, tokens, dim]`, `attention_mask` is `[batch, tokens]`
/// of any numeric dtype. A row with no unmasked token pools to zeros.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, dim) = match hidden.dims() {
        &[b, t, h] => (b, t, h),
        other => anyhow::bail!("token states must be [batch, tokens, dim], got {other:?}"),
    };
    ensure!(
        attention_mask.dims() == [batch, tokens].as_slice(),
        "attention mask {:?} does not match token states [{batch}, {tokens}]",
        attention_mask.dims()
    );

    let weights = attention_mask.to_device(hidden.device())?.to_dtype(DType::F32)?;
    let states = hidden.to_dtype(DType::F32)?;
    let summed = states.broadcast_mul(&weights.unsqueeze(2)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?.maximum(1.0)?;
    let mean = summed.broadcast_div(&counts)?;

    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(NORM_EPS)?;
    let pooled = mean.broadcast_div(&norms)?.to_dtype(hidden.dtype())?;
    ensure!(pooled.dims() == [batch, dim].as_slice(), "pooled shape {:?}", pooled.dims());
    Ok(pooled)
}
