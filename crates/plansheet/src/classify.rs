//! `psh classify`: show how file names would be filed, without a database.

use plansheet_core::classify::{classify, display_name, extract_revision};

pub fn run_classify(names: &[String]) {
    for name in names {
        let c = classify(name);
        println!("{}", name);
        println!("  name:        {}", display_name(name));
        println!("  category:    {}", c.category);
        println!("  subcategory: {}", c.subcategory);
        println!(
            "  revision:    {}",
            extract_revision(name).as_deref().unwrap_or("-")
        );
    }
}
