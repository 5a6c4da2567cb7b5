use miette::Result;

use graven_core::config::GlobalConfig;
use graven_ops::ops_clean::{clean_cache, CleanResult};

pub fn exec() -> Result<()> {
    let config = GlobalConfig::load()?;
    for result in clean_cache(&config)? {
        match result {
            CleanResult::Removed(dir) => println!("Removed {}", dir.display()),
            CleanResult::NotFound(dir) => println!("Nothing to clean at {}", dir.display()),
        }
    }
    Ok(())
}
