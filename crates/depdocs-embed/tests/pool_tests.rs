use candle_core::{DType, Device, Tensor};
use depdocs_embed::masked_mean_l2;

fn pooled(hidden: &[f32], shape: (usize, usize, usize), mask: &[u32]) -> Vec<Vec<f32>> {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(hidden, shape, &dev).unwrap();
    let m = Tensor::from_slice(mask, (shape.0, shape.1), &dev).unwrap();
    masked_mean_l2(&h, &m).unwrap().to_vec2().unwrap()
}

#[test]
fn padding_tokens_are_ignored() {
    let out = pooled(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], (1, 2, 4), &[1, 0]);
    let norm = 30f32.sqrt();
    for (a, b) in out[0].iter().zip([1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm]) {
        assert!((a - b).abs() < 1e-5, "a={a} b={b}");
    }
}

#[test]
fn unmasked_tokens_are_averaged() {
    let out = pooled(&[2.0, 0.0, 0.0, 4.0], (1, 2, 2), &[1, 1]);
    // mean = [1, 2]
    let n = 5f32.sqrt();
    assert!((out[0][0] - 1.0 / n).abs() < 1e-5);
    assert!((out[0][1] - 2.0 / n).abs() < 1e-5);
}

#[test]
fn each_row_is_pooled_separately() {
    let out = pooled(&[3.0, 4.0, 9.0, 9.0, 0.0, 2.0, 0.0, 6.0], (2, 2, 2), &[1, 0, 1, 1]);
    assert!((out[0][0] - 0.6).abs() < 1e-5 && (out[0][1] - 0.8).abs() < 1e-5);
    assert!(out[1][0].abs() < 1e-6 && (out[1][1] - 1.0).abs() < 1e-5);
}

#[test]
fn fully_masked_row_pools_to_zeros() {
    let out = pooled(&[1.0, 1.0], (1, 1, 2), &[0]);
    assert!(out[0].iter().all(|x| x.abs() < 1e-6));
}

#[test]
fn rank_two_input_is_rejected() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    let mask = Tensor::ones((2, 1), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &mask).is_err());
}

#[test]
fn mismatched_mask_is_rejected() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((1, 3, 4), DType::F32, &dev).unwrap();
    let mask = Tensor::ones((1, 2), DType::U32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &mask).is_err());
}
