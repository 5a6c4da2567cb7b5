use std::path::Path;

use miette::Result;

pub fn exec(path: &Path) -> Result<()> {
    let project_type = graven_ops::ops_detect::detect(path)?;
    println!("{}", project_type.name());
    println!("  command: {}", project_type.cmd().join(" "));
    println!("  image:   {}", project_type.image_template());
    Ok(())
}
