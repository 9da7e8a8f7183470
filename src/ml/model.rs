use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig2d, Relu,
    },
    prelude::*,
};

use crate::data::dataset::RecordShape;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
//
// Every field has a default, so a graph manifest only has to list
// what differs from the 28×28×1, 10-class MNIST LeNet.
#[derive(Config, Debug)]
pub struct LeNetConfig {
    /// Input image rows
    #[config(default = 28)]
    pub image_height:  usize,

    /// Input image columns
    #[config(default = 28)]
    pub image_width:   usize,

    /// Input image channels (1 = greyscale)
    #[config(default = 1)]
    pub image_depth:   usize,

    /// Feature maps produced by the first convolution
    #[config(default = 32)]
    pub conv1_filters: usize,

    /// Feature maps produced by the second convolution
    #[config(default = 64)]
    pub conv2_filters: usize,

    /// Side of the square convolution kernel.
    /// Must be odd: "same" padding is only defined for odd kernels.
    #[config(default = 5)]
    pub kernel_size:   usize,

    /// Width of the dense layer between the convolutions and the output
    #[config(default = 1024)]
    pub hidden_size:   usize,

    /// Number of output classes (width of the classifier tensor)
    #[config(default = 10)]
    pub num_classes:   usize,
}

impl LeNetConfig {
    /// Number of values in one flattened input image
    pub fn input_size(&self) -> usize {
        self.image_height * self.image_width * self.image_depth
    }

    /// Features entering the first dense layer: two 2×2 pools
    /// over a same-padded feature map
    pub fn flatten_size(&self) -> usize {
        (self.image_height / 4) * (self.image_width / 4) * self.conv2_filters
    }

    /// The record layout a validation set must have for this model
    pub fn record_shape(&self) -> RecordShape {
        RecordShape {
            input_len:   self.input_size(),
            num_classes: self.num_classes,
            depth:       self.image_depth,
        }
    }

    /// Reject architectures that `init` cannot build.
    ///
    /// Burn's conv layers panic on an even kernel with same padding,
    /// and a zero-sized dimension panics inside a reshape, so both are
    /// caught here where they can still become an error.
    pub fn check(&self) -> Result<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            bail!("kernel_size must be odd, got {}", self.kernel_size);
        }
        let sizes = [
            ("image_height",  self.image_height),
            ("image_width",   self.image_width),
            ("image_depth",   self.image_depth),
            ("conv1_filters", self.conv1_filters),
            ("conv2_filters", self.conv2_filters),
            ("hidden_size",   self.hidden_size),
            ("num_classes",   self.num_classes),
        ];
        for (name, value) in sizes {
            if value == 0 {
                bail!("{name} must be at least 1");
            }
        }
        // Two 2×2 pools need at least a 4×4 image to leave one feature
        if self.image_height < 4 || self.image_width < 4 {
            bail!(
                "image must be at least 4x4 for two pooling stages, got {}x{}",
                self.image_height, self.image_width,
            );
        }
        Ok(())
    }

    /// `hold_prob` is the dropout keep probability; 1.0 disables dropout.
    pub fn init<B: Backend>(&self, hold_prob: f64, device: &B::Device) -> LeNetModel<B> {
        let kernel = [self.kernel_size, self.kernel_size];
        let conv1 = Conv2dConfig::new([self.image_depth, self.conv1_filters], kernel)
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv2 = Conv2dConfig::new([self.conv1_filters, self.conv2_filters], kernel)
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
        let fc1 = LinearConfig::new(self.flatten_size(), self.hidden_size).init(device);
        let fc2 = LinearConfig::new(self.hidden_size, self.num_classes).init(device);
        let dropout = DropoutConfig::new((1.0 - hold_prob).clamp(0.0, 1.0)).init();

        LeNetModel {
            conv1, conv2, pool, fc1, fc2, dropout,
            activation:   Relu::new(),
            image_height: self.image_height,
            image_width:  self.image_width,
            image_depth:  self.image_depth,
        }
    }
}

/// conv → relu → pool → conv → relu → pool → dense → relu → dropout → dense
#[derive(Module, Debug)]
pub struct LeNetModel<B: Backend> {
    /// depth → conv1_filters, same padding
    pub conv1:        Conv2d<B>,

    /// conv1_filters → conv2_filters, same padding
    pub conv2:        Conv2d<B>,

    /// 2×2 max pool with stride 2, shared by both stages (no weights)
    pub pool:         MaxPool2d,

    /// flatten_size → hidden_size
    pub fc1:          Linear<B>,

    /// hidden_size → num_classes; its output is the classifier tensor
    pub fc2:          Linear<B>,

    /// Drops with probability 1 - hold_prob
    pub dropout:      Dropout,
    pub activation:   Relu,

    // Input geometry, needed to unflatten records in forward()
    pub image_height: usize,
    pub image_width:  usize,
    pub image_depth:  usize,
}

impl<B: Backend> LeNetModel<B> {
    /// images: [batch, height*width*depth] in HWC order → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, _] = images.dims();

        // Records store pixels channel-last; Conv2d wants [batch, channels, h, w]
        let x = images
            .reshape([batch_size, self.image_height, self.image_width, self.image_depth])
            .permute([0, 3, 1, 2]);

        let x = self.pool.forward(self.activation.forward(self.conv1.forward(x)));
        let x = self.pool.forward(self.activation.forward(self.conv2.forward(x)));

        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.dropout.forward(self.activation.forward(self.fc1.forward(x)));
        self.fc2.forward(x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn small_config() -> LeNetConfig {
        LeNetConfig::new()
            .with_image_height(8)
            .with_image_width(8)
            .with_conv1_filters(2)
            .with_conv2_filters(4)
            .with_kernel_size(3)
            .with_hidden_size(16)
            .with_num_classes(3)
    }

    #[test]
    fn test_default_config_is_mnist_lenet() {
        let cfg = LeNetConfig::new();
        assert_eq!(cfg.input_size(), 784);
        assert_eq!(cfg.flatten_size(), 7 * 7 * 64);
        assert_eq!(cfg.num_classes, 10);
    }

    #[test]
    fn test_record_shape_follows_architecture() {
        let shape = small_config().record_shape();
        assert_eq!(shape.input_len, 64);
        assert_eq!(shape.num_classes, 3);
        assert_eq!(shape.depth, 1);
    }

    #[test]
    fn test_check_accepts_defaults() {
        assert!(LeNetConfig::new().check().is_ok());
        assert!(small_config().check().is_ok());
    }

    #[test]
    fn test_check_rejects_even_kernel() {
        let err = LeNetConfig::new().with_kernel_size(4).check().unwrap_err();
        assert!(err.to_string().contains("kernel_size"));
        assert!(LeNetConfig::new().with_kernel_size(0).check().is_err());
    }

    #[test]
    fn test_check_rejects_zero_sizes_and_tiny_images() {
        assert!(LeNetConfig::new().with_num_classes(0).check().is_err());
        assert!(LeNetConfig::new().with_image_depth(0).check().is_err());
        assert!(LeNetConfig::new().with_image_width(3).check().is_err());
    }

    #[test]
    fn test_forward_output_shape() {
        let device = Default::default();
        let cfg    = small_config();
        let model: LeNetModel<NdArray> = cfg.init(1.0, &device);

        let images = Tensor::<NdArray, 2>::zeros([5, cfg.input_size()], &device);
        let logits = model.forward(images);
        assert_eq!(logits.dims(), [5, 3]);
    }
}
