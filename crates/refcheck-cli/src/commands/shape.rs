//! Shape - Pooling Shape Inference Command
//!
//! Resolves the output extents and padding of one pooling or convolution
//! window configuration, given either as flags or as a JSON node descriptor.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use std::fs;

use refcheck_onnx::{AutoPad, NodeProto, SpatialConfig};
use tracing::debug;

use super::utils::{format_dims, print_header, print_kv};
use crate::cli::ShapeArgs;
use crate::error::{CliError, CliResult};

/// Execute the `shape` command
pub fn execute(args: ShapeArgs) -> CliResult<()> {
    let rank = args.input.len();
    let config = match &args.node {
        Some(path) => {
            let node = NodeProto::from_json(&fs::read_to_string(path)?)?;
            debug!(path = %path.display(), op = %node.op_type, "loaded node descriptor");
            SpatialConfig::from_node(&node, rank)?
        }
        None => config_from_flags(&args, rank)?,
    };

    let geometry = config.resolve(&args.input)?;

    print_header("Shape Inference");
    print_kv("auto_pad", config.auto_pad.as_str());
    print_kv("input", &format_dims(&args.input));
    print_kv("kernel", &format_dims(&config.kernel_shape));
    print_kv("strides", &format_dims(&config.strides));
    print_kv("output", &format_dims(&geometry.output_shape));
    print_kv("pad_shape", &format_dims(&geometry.pad_totals()));
    print_kv("pads_begin", &format_dims(&geometry.pads_begin));
    print_kv("pads_end", &format_dims(&geometry.pads_end));
    Ok(())
}

fn config_from_flags(args: &ShapeArgs, rank: usize) -> CliResult<SpatialConfig> {
    let auto_pad: AutoPad = args.auto_pad.as_deref().unwrap_or("NOTSET").parse()?;
    if args.kernel.len() != rank {
        return Err(CliError::InvalidArgument(format!(
            "kernel has {} extents for {rank} input axes",
            args.kernel.len()
        )));
    }

    let mut config = SpatialConfig::new(&args.kernel).with_auto_pad(auto_pad);
    if let Some(strides) = &args.strides {
        config = config.with_strides(strides);
    }
    if let Some(pads) = &args.pads {
        if pads.len() != 2 * rank {
            return Err(CliError::InvalidArgument(format!(
                "pads needs {} values (begins then ends), got {}",
                2 * rank,
                pads.len()
            )));
        }
        config = config.with_pads(pads);
    }
    Ok(config)
}
