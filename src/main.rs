//! # sigmatch CLI
//!
//! Command-line interface for the signature matcher.
//!
//! ## Usage
//! ```bash
//! sigmatch compare reference.png candidate.jpg
//! sigmatch compare reference.png candidate.jpg --output json
//! sigmatch session --save-stages ./stages
//! ```

mod cli;

use signature_matcher::Result;

fn main() -> Result<()> {
    signature_matcher::init_tracing();
    cli::run()
}
