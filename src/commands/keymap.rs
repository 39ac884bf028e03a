//! Show the effective scan code table

use anyhow::Result;
use chatpad_driver::ChatpadConfig;
use chatpad_transport::Modifier;

pub fn show(config: &ChatpadConfig) -> Result<()> {
    let keymap = config.keymap()?;
    println!("Scan code  Key");
    println!("---------  ---");
    for (code, key) in keymap.iter() {
        match Modifier::from_id(code) {
            Some(modifier) => println!("{:>9}  {:?} ({})", code, key, modifier.display_name()),
            None => println!("{:>9}  {:?}", code, key),
        }
    }
    println!();
    println!(
        "{} entries ({} overridden by config)",
        keymap.len(),
        config.keymap.len()
    );
    Ok(())
}
