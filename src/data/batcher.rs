// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ImageSamples into
// one input tensor for the forward pass.
//
//   Input:  Vec of N ImageSamples, each with F input values
//   Output: ImageBatch with inputs of shape [N, F]
//
// True classes stay on the host as plain usizes; they are only
// needed again when pairing predictions with labels, so there
// is no reason to round-trip them through the device.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageSample;

/// A batch of validation examples ready for the model.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Flattened images — shape: [batch_size, features]
    pub inputs: Tensor<B, 2>,

    /// True class per row, same order as `inputs`
    pub true_classes: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let batch_size = items.len();
        let features   = items.first().map(|s| s.input.len()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.input.iter().copied())
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, features]);

        // ValidationSet::open rejects records without a label,
        // so the fallback is never taken for loaded data
        let true_classes = items
            .iter()
            .map(|s| s.true_class().unwrap_or(0))
            .collect();

        ImageBatch { inputs, true_classes }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_labels() {
        let device  = Default::default();
        let batcher = ImageBatcher::<NdArray>::new(device);
        let items = vec![
            ImageSample { input: vec![0.0, 0.1, 0.2], label: vec![0.0, 1.0], depth: None },
            ImageSample { input: vec![0.3, 0.4, 0.5], label: vec![1.0, 0.0], depth: None },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.inputs.dims(), [2, 3]);
        assert_eq!(batch.true_classes, vec![1, 0]);

        let values = batch.inputs.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
    }
}
