//! # CRD Generator
//!
//! Prints the `Registry` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/registry.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use registry_operator::crd::Registry;

fn main() {
    let crd = match Registry::defaulted_crd() {
        Ok(crd) => crd,
        Err(e) => {
            eprintln!("Failed to build CRD: {e}");
            std::process::exit(1);
        }
    };

    match serde_yaml::to_string(&crd) {
        Ok(yaml) => {
            println!("# This file is auto-generated by crdgen");
            println!("# DO NOT EDIT THIS FILE MANUALLY");
            println!("# Change the Rust types in src/crd instead");
            println!("#");
            println!("---");
            print!("{yaml}");
        }
        Err(e) => {
            eprintln!("Failed to serialize CRD to YAML: {e}");
            std::process::exit(1);
        }
    }
}
