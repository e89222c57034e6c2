//! Shape Inference - Padding and Output Extents for Windowed Operators
//!
//! Computes how much padding an auto-pad policy adds along each spatial axis
//! and how many window placements fit. Pooling and convolution share these
//! rules; dilated kernels enter through their effective extent
//! `(k - 1) * d + 1`.
//!
//! # Policies
//! - `VALID` and `NOTSET`: no implicit padding. Output extent is
//!   `ceil((in - (k - 1)) / s)` over the explicitly padded input.
//! - `SAME_UPPER` and `SAME_LOWER`: output extent is `ceil(in / s)` and the
//!   total padding is `(out - 1) * s + k - in`. An odd total puts the extra
//!   unit after the axis for `SAME_UPPER` and before it for `SAME_LOWER`.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;
use std::str::FromStr;

use crate::error::{OnnxError, OnnxResult};
use crate::proto::NodeProto;

// =============================================================================
// Auto-Pad Policy
// =============================================================================

/// The ONNX `auto_pad` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutoPad {
    /// Explicit `pads` are used.
    #[default]
    NotSet,
    /// No padding at all.
    Valid,
    /// Output tracks input; odd padding goes at the end.
    SameUpper,
    /// Output tracks input; odd padding goes at the start.
    SameLower,
}

impl AutoPad {
    /// Returns true for the `SAME_*` policies.
    pub fn is_same(self) -> bool {
        matches!(self, Self::SameUpper | Self::SameLower)
    }

    /// Returns the ONNX attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSet => "NOTSET",
            Self::Valid => "VALID",
            Self::SameUpper => "SAME_UPPER",
            Self::SameLower => "SAME_LOWER",
        }
    }
}

impl FromStr for AutoPad {
    type Err = OnnxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "NOTSET" => Ok(Self::NotSet),
            "VALID" => Ok(Self::Valid),
            "SAME_UPPER" => Ok(Self::SameUpper),
            "SAME_LOWER" => Ok(Self::SameLower),
            other => Err(OnnxError::InvalidAttribute(
                "auto_pad".to_string(),
                other.to_string(),
            )),
        }
    }
}

impl fmt::Display for AutoPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shape Arithmetic
// =============================================================================

/// Total padding per spatial axis implied by `auto_pad`.
///
/// `SAME_*` policies need `(out - 1) * s + k - in` cells so that `out` windows
/// fit; the result is clamped at zero. Every other policy pads nothing here
/// and leaves explicit pads to the caller.
pub fn pad_shape(
    auto_pad: AutoPad,
    input_spatial: &[usize],
    kernel_spatial: &[usize],
    strides_spatial: &[usize],
    output_spatial: &[usize],
) -> Vec<usize> {
    if !auto_pad.is_same() {
        return vec![0; input_spatial.len()];
    }

    input_spatial
        .iter()
        .zip(kernel_spatial)
        .zip(strides_spatial)
        .zip(output_spatial)
        .map(|(((&i, &k), &s), &o)| (o.saturating_sub(1) * s + k).saturating_sub(i))
        .collect()
}

/// Output extent per spatial axis.
///
/// For `VALID` and `NOTSET` the input is taken as already padded; an axis
/// shorter than the kernel yields zero placements.
pub fn output_shape(
    auto_pad: AutoPad,
    input_spatial: &[usize],
    kernel_spatial: &[usize],
    strides_spatial: &[usize],
) -> Vec<usize> {
    input_spatial
        .iter()
        .zip(kernel_spatial)
        .zip(strides_spatial)
        .map(|((&i, &k), &s)| {
            if auto_pad.is_same() {
                i.div_ceil(s)
            } else if i + 1 < k {
                0
            } else {
                (i + 1 - k).div_ceil(s)
            }
        })
        .collect()
}

/// Splits per-axis padding totals into `(begin, end)` halves.
pub fn split_pads(auto_pad: AutoPad, totals: &[usize]) -> (Vec<usize>, Vec<usize>) {
    totals
        .iter()
        .map(|&t| {
            let small = t / 2;
            let large = t - small;
            match auto_pad {
                AutoPad::SameLower => (large, small),
                _ => (small, large),
            }
        })
        .unzip()
}

// =============================================================================
// Spatial Configuration
// =============================================================================

/// Window geometry of a pooling or convolution node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialConfig {
    /// Kernel extent per spatial axis.
    pub kernel_shape: Vec<usize>,
    /// Window step per spatial axis.
    pub strides: Vec<usize>,
    /// Explicit padding before each spatial axis.
    pub pads_begin: Vec<usize>,
    /// Explicit padding after each spatial axis.
    pub pads_end: Vec<usize>,
    /// Kernel dilation per spatial axis.
    pub dilations: Vec<usize>,
    /// Auto-pad policy. When not `NOTSET`, explicit pads are ignored.
    pub auto_pad: AutoPad,
}

/// Concrete padding and output extents for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGeometry {
    /// Padding before each spatial axis.
    pub pads_begin: Vec<usize>,
    /// Padding after each spatial axis.
    pub pads_end: Vec<usize>,
    /// Output extent per spatial axis.
    pub output_shape: Vec<usize>,
}

impl ResolvedGeometry {
    /// Total padding per spatial axis.
    pub fn pad_totals(&self) -> Vec<usize> {
        self.pads_begin
            .iter()
            .zip(&self.pads_end)
            .map(|(b, e)| b + e)
            .collect()
    }
}

impl SpatialConfig {
    /// Creates a configuration with unit strides and dilations and no padding.
    pub fn new(kernel_shape: &[usize]) -> Self {
        let rank = kernel_shape.len();
        Self {
            kernel_shape: kernel_shape.to_vec(),
            strides: vec![1; rank],
            pads_begin: vec![0; rank],
            pads_end: vec![0; rank],
            dilations: vec![1; rank],
            auto_pad: AutoPad::NotSet,
        }
    }

    /// Sets the strides.
    pub fn with_strides(mut self, strides: &[usize]) -> Self {
        self.strides = strides.to_vec();
        self
    }

    /// Sets explicit pads in ONNX layout `[b_1, .., b_n, e_1, .., e_n]`.
    pub fn with_pads(mut self, pads: &[usize]) -> Self {
        let half = pads.len() / 2;
        self.pads_begin = pads[..half].to_vec();
        self.pads_end = pads[half..].to_vec();
        self
    }

    /// Sets the dilations.
    pub fn with_dilations(mut self, dilations: &[usize]) -> Self {
        self.dilations = dilations.to_vec();
        self
    }

    /// Sets the auto-pad policy.
    pub fn with_auto_pad(mut self, auto_pad: AutoPad) -> Self {
        self.auto_pad = auto_pad;
        self
    }

    /// Reads a pooling node's geometry. `kernel_shape` is required.
    pub fn from_node(node: &NodeProto, spatial_rank: usize) -> OnnxResult<Self> {
        let kernel = node
            .get_ints("kernel_shape")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| OnnxError::MissingAttribute("kernel_shape".to_string()))?;
        Self::parse(node, spatial_rank, kernel)
    }

    /// Reads a convolution node's geometry, falling back to the weight's
    /// spatial extents when `kernel_shape` is absent.
    pub fn from_node_with_kernel(node: &NodeProto, weight_kernel: &[usize]) -> OnnxResult<Self> {
        let fallback: Vec<i64> = weight_kernel.iter().map(|&k| k as i64).collect();
        let kernel = node
            .get_ints("kernel_shape")
            .filter(|k| !k.is_empty())
            .unwrap_or(fallback.as_slice());
        let config = Self::parse(node, weight_kernel.len(), kernel)?;
        if config.kernel_shape != weight_kernel {
            return Err(OnnxError::InvalidAttribute(
                "kernel_shape".to_string(),
                format!(
                    "{:?} disagrees with weight extents {:?}",
                    config.kernel_shape, weight_kernel
                ),
            ));
        }
        Ok(config)
    }

    fn parse(node: &NodeProto, spatial_rank: usize, kernel: &[i64]) -> OnnxResult<Self> {
        let auto_pad = node
            .get_string("auto_pad")
            .map_or(Ok(AutoPad::NotSet), |s| s.parse())?;

        let kernel_shape = positive("kernel_shape", kernel)?;
        let strides = match node.get_ints("strides").filter(|v| !v.is_empty()) {
            Some(v) => positive("strides", v)?,
            None => vec![1; spatial_rank],
        };
        let dilations = match node.get_ints("dilations").filter(|v| !v.is_empty()) {
            Some(v) => positive("dilations", v)?,
            None => vec![1; spatial_rank],
        };
        let pads = match node.get_ints("pads").filter(|v| !v.is_empty()) {
            Some(v) => non_negative("pads", v)?,
            None => vec![0; 2 * spatial_rank],
        };
        if pads.len() != 2 * spatial_rank {
            return Err(OnnxError::shape_mismatch("pads", 2 * spatial_rank, pads.len()));
        }

        let config = Self {
            kernel_shape,
            strides,
            pads_begin: pads[..spatial_rank].to_vec(),
            pads_end: pads[spatial_rank..].to_vec(),
            dilations,
            auto_pad,
        };
        config.validate(spatial_rank)?;
        Ok(config)
    }

    /// Checks that every vector has one entry per spatial axis.
    pub fn validate(&self, spatial_rank: usize) -> OnnxResult<()> {
        let checks = [
            ("kernel_shape", self.kernel_shape.len()),
            ("strides", self.strides.len()),
            ("pads", self.pads_begin.len()),
            ("pads", self.pads_end.len()),
            ("dilations", self.dilations.len()),
        ];
        for (what, len) in checks {
            if len != spatial_rank {
                return Err(OnnxError::shape_mismatch(what, spatial_rank, len));
            }
        }
        if self.strides.contains(&0) || self.kernel_shape.contains(&0) || self.dilations.contains(&0)
        {
            return Err(OnnxError::InvalidShape(
                "kernel, strides and dilations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Kernel extent per axis once dilation gaps are included.
    pub fn effective_kernel(&self) -> Vec<usize> {
        self.kernel_shape
            .iter()
            .zip(&self.dilations)
            .map(|(&k, &d)| (k - 1) * d + 1)
            .collect()
    }

    /// Resolves padding and output extents for an input's spatial shape.
    pub fn resolve(&self, input_spatial: &[usize]) -> OnnxResult<ResolvedGeometry> {
        self.validate(input_spatial.len())?;
        let kernel = self.effective_kernel();

        let (pads_begin, pads_end, out) = match self.auto_pad {
            AutoPad::SameUpper | AutoPad::SameLower => {
                let out = output_shape(self.auto_pad, input_spatial, &kernel, &self.strides);
                let totals = pad_shape(self.auto_pad, input_spatial, &kernel, &self.strides, &out);
                let (begin, end) = split_pads(self.auto_pad, &totals);
                (begin, end, out)
            }
            AutoPad::Valid => {
                let out = output_shape(AutoPad::Valid, input_spatial, &kernel, &self.strides);
                let zeros = vec![0; input_spatial.len()];
                (zeros.clone(), zeros, out)
            }
            AutoPad::NotSet => {
                let padded: Vec<usize> = input_spatial
                    .iter()
                    .zip(self.pads_begin.iter().zip(&self.pads_end))
                    .map(|(&i, (&b, &e))| i + b + e)
                    .collect();
                let out = output_shape(AutoPad::NotSet, &padded, &kernel, &self.strides);
                (self.pads_begin.clone(), self.pads_end.clone(), out)
            }
        };

        if out.contains(&0) {
            return Err(OnnxError::InvalidShape(format!(
                "kernel {:?} does not fit input {:?} with pads {:?}/{:?}",
                kernel, input_spatial, pads_begin, pads_end
            )));
        }

        Ok(ResolvedGeometry {
            pads_begin,
            pads_end,
            output_shape: out,
        })
    }
}

fn positive(name: &str, values: &[i64]) -> OnnxResult<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            usize::try_from(v)
                .ok()
                .filter(|&u| u > 0)
                .ok_or_else(|| OnnxError::InvalidAttribute(name.to_string(), format!("{values:?}")))
        })
        .collect()
}

fn non_negative(name: &str, values: &[i64]) -> OnnxResult<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            usize::try_from(v)
                .map_err(|_| OnnxError::InvalidAttribute(name.to_string(), format!("{values:?}")))
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_pad_parse() {
        assert_eq!("SAME_UPPER".parse::<AutoPad>().unwrap(), AutoPad::SameUpper);
        assert_eq!("".parse::<AutoPad>().unwrap(), AutoPad::NotSet);
        assert_eq!(AutoPad::SameLower.to_string(), "SAME_LOWER");
        assert!("SAME".parse::<AutoPad>().is_err());
    }

    #[test]
    fn test_output_shape_valid() {
        assert_eq!(output_shape(AutoPad::Valid, &[32, 32], &[2, 2], &[1, 1]), vec![31, 31]);
        assert_eq!(output_shape(AutoPad::Valid, &[32, 32], &[5, 5], &[3, 3]), vec![10, 10]);
        assert_eq!(output_shape(AutoPad::Valid, &[5, 5], &[2, 2], &[2, 2]), vec![2, 2]);
        assert_eq!(output_shape(AutoPad::Valid, &[2], &[5], &[1]), vec![0]);
    }

    #[test]
    fn test_output_shape_valid_formula() {
        for i in 1..20usize {
            for k in 1..=i {
                for s in 1..5usize {
                    let expected = ((i - (k - 1)) as f64 / s as f64).ceil() as usize;
                    assert_eq!(output_shape(AutoPad::Valid, &[i], &[k], &[s]), vec![expected]);
                }
            }
        }
    }

    #[test]
    fn test_output_shape_same_ignores_kernel() {
        for k in 1..7usize {
            assert_eq!(output_shape(AutoPad::SameUpper, &[32], &[k], &[1]), vec![32]);
            assert_eq!(output_shape(AutoPad::SameLower, &[5], &[k], &[2]), vec![3]);
        }
    }

    #[test]
    fn test_pad_shape() {
        assert_eq!(pad_shape(AutoPad::SameUpper, &[32, 32], &[2, 2], &[1, 1], &[32, 32]), vec![1, 1]);
        assert_eq!(pad_shape(AutoPad::SameUpper, &[5, 5], &[3, 3], &[2, 2], &[3, 3]), vec![2, 2]);
        assert_eq!(pad_shape(AutoPad::Valid, &[5, 5], &[3, 3], &[2, 2], &[2, 2]), vec![0, 0]);
        assert_eq!(pad_shape(AutoPad::NotSet, &[5], &[3], &[1], &[3]), vec![0]);
        // Never negative
        assert_eq!(pad_shape(AutoPad::SameUpper, &[6], &[1], &[2], &[3]), vec![0]);
    }

    #[test]
    fn test_split_pads() {
        assert_eq!(split_pads(AutoPad::SameUpper, &[1, 2]), (vec![0, 1], vec![1, 1]));
        assert_eq!(split_pads(AutoPad::SameLower, &[1, 2]), (vec![1, 1], vec![0, 1]));
    }

    #[test]
    fn test_from_node_defaults() {
        let node = NodeProto::new("MaxPool", &["x"], &["y"]).with_ints("kernel_shape", &[3, 3]);
        let config = SpatialConfig::from_node(&node, 2).unwrap();
        assert_eq!(config.strides, vec![1, 1]);
        assert_eq!(config.pads_begin, vec![0, 0]);
        assert_eq!(config.auto_pad, AutoPad::NotSet);
    }

    #[test]
    fn test_from_node_explicit_pads() {
        let node = NodeProto::new("Conv", &["x", "W"], &["y"])
            .with_ints("kernel_shape", &[3, 3])
            .with_ints("pads", &[1, 0, 1, 0])
            .with_ints("strides", &[2, 2]);
        let config = SpatialConfig::from_node(&node, 2).unwrap();
        assert_eq!(config.pads_begin, vec![1, 0]);
        assert_eq!(config.pads_end, vec![1, 0]);

        let geometry = config.resolve(&[7, 5]).unwrap();
        assert_eq!(geometry.output_shape, vec![4, 2]);
        assert_eq!(geometry.pad_totals(), vec![2, 0]);
    }

    #[test]
    fn test_from_node_rank_mismatch() {
        let node = NodeProto::new("MaxPool", &["x"], &["y"])
            .with_ints("kernel_shape", &[2, 2])
            .with_ints("strides", &[2]);
        let err = SpatialConfig::from_node(&node, 2).unwrap_err();
        assert!(matches!(
            err,
            OnnxError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));

        let node = NodeProto::new("MaxPool", &["x"], &["y"])
            .with_ints("kernel_shape", &[2, 2])
            .with_ints("pads", &[1, 1]);
        assert!(matches!(
            SpatialConfig::from_node(&node, 2),
            Err(OnnxError::ShapeMismatch { expected: 4, actual: 2, .. })
        ));
    }

    #[test]
    fn test_from_node_requires_kernel() {
        let node = NodeProto::new("AveragePool", &["x"], &["y"]);
        assert!(matches!(
            SpatialConfig::from_node(&node, 2),
            Err(OnnxError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_from_node_rejects_bad_values() {
        let node = NodeProto::new("MaxPool", &["x"], &["y"])
            .with_ints("kernel_shape", &[2, 0]);
        assert!(SpatialConfig::from_node(&node, 2).is_err());

        let node = NodeProto::new("MaxPool", &["x"], &["y"])
            .with_ints("kernel_shape", &[2, 2])
            .with_ints("pads", &[-1, 0, 0, 0]);
        assert!(SpatialConfig::from_node(&node, 2).is_err());

        let node = NodeProto::new("MaxPool", &["x"], &["y"])
            .with_ints("kernel_shape", &[2, 2])
            .with_string("auto_pad", "SAME_MIDDLE");
        assert!(SpatialConfig::from_node(&node, 2).is_err());
    }

    #[test]
    fn test_resolve_same_upper() {
        let config = SpatialConfig::new(&[3, 3])
            .with_strides(&[2, 2])
            .with_auto_pad(AutoPad::SameUpper);
        let geometry = config.resolve(&[5, 5]).unwrap();
        assert_eq!(geometry.output_shape, vec![3, 3]);
        assert_eq!(geometry.pads_begin, vec![1, 1]);
        assert_eq!(geometry.pads_end, vec![1, 1]);

        let config = SpatialConfig::new(&[2]).with_auto_pad(AutoPad::SameUpper);
        let geometry = config.resolve(&[4]).unwrap();
        assert_eq!((geometry.pads_begin[0], geometry.pads_end[0]), (0, 1));

        let config = SpatialConfig::new(&[2]).with_auto_pad(AutoPad::SameLower);
        let geometry = config.resolve(&[4]).unwrap();
        assert_eq!((geometry.pads_begin[0], geometry.pads_end[0]), (1, 0));
    }

    #[test]
    fn test_resolve_valid_ignores_pads() {
        let config = SpatialConfig::new(&[2, 2])
            .with_pads(&[1, 1, 1, 1])
            .with_auto_pad(AutoPad::Valid);
        let geometry = config.resolve(&[4, 4]).unwrap();
        assert_eq!(geometry.output_shape, vec![3, 3]);
        assert_eq!(geometry.pad_totals(), vec![0, 0]);
    }

    #[test]
    fn test_resolve_dilated() {
        let config = SpatialConfig::new(&[3]).with_dilations(&[2]);
        assert_eq!(config.effective_kernel(), vec![5]);
        assert_eq!(config.resolve(&[7]).unwrap().output_shape, vec![3]);
    }

    #[test]
    fn test_resolve_kernel_too_large() {
        let config = SpatialConfig::new(&[5, 5]);
        assert!(matches!(config.resolve(&[3, 3]), Err(OnnxError::InvalidShape(_))));
    }
}
