//! CLI - Command Line Interface Definitions
//!
//! Defines the CLI structure using clap derive macros.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Refcheck - reference conformance checks for ONNX operator backends
#[derive(Parser, Debug)]
#[command(
    name = "refcheck",
    author = "AutomataNexus Development Team",
    version,
    about = "Check ONNX pooling, convolution and elementwise operators against closed-form references"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the conformance suite
    Run(RunArgs),

    /// List the conformance cases
    List(ListArgs),

    /// Infer pooling output and padding shapes
    Shape(ShapeArgs),
}

// =============================================================================
// Run Command Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run cases whose name contains this substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Decimal places outputs must agree to
    #[arg(short, long)]
    pub decimal: Option<u32>,

    /// Seed for random case inputs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Path to a refcheck.toml configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run cases in parallel
    #[arg(short, long)]
    pub parallel: bool,
}

// =============================================================================
// List Command Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list cases whose name contains this substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Write each listed case's node descriptor to `<DIR>/<case>.json`
    #[arg(short, long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

// =============================================================================
// Shape Command Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct ShapeArgs {
    /// Spatial input extents, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub input: Vec<usize>,

    /// Read window attributes from a JSON node descriptor
    #[arg(short, long, conflicts_with_all = ["auto_pad", "kernel", "strides", "pads"])]
    pub node: Option<PathBuf>,

    /// Padding policy: NOTSET, VALID, SAME_UPPER or SAME_LOWER (default NOTSET)
    #[arg(short, long)]
    pub auto_pad: Option<String>,

    /// Kernel extents, comma separated
    #[arg(short, long, value_delimiter = ',', required_unless_present = "node")]
    pub kernel: Vec<usize>,

    /// Strides, comma separated (defaults to 1 per axis)
    #[arg(short, long, value_delimiter = ',')]
    pub strides: Option<Vec<usize>>,

    /// Explicit pads in ONNX order (all begins, then all ends)
    #[arg(short, long, value_delimiter = ',')]
    pub pads: Option<Vec<usize>>,
}
