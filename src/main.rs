//! # phash-dedup CLI
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! phash-dedup --images-dir ~/Pictures --radius 4 --save-to dups.json
//! phash-dedup --images-dir ~/Pictures --save-to dups.json --remove-duplicates
//! ```

mod cli;

use phash_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
