use std::collections::BTreeMap;
use std::env;
use std::fmt::Write;
use std::path::PathBuf;

fn main() {
    // (Variable, Type, Default value)
    let mut configs: BTreeMap<&str, (&str, &str)> = BTreeMap::from([
        ("RESPONSE_TIMEOUT_US", ("u32", "500_000")),
        ("MAX_MESSAGE_LEN", ("usize", "256")),
        ("KEY_STORE_CAPACITY", ("usize", "4")),
        ("MAX_OBSERVERS", ("usize", "4")),
    ]);

    println!("cargo:rerun-if-changed=build.rs");
    for name in configs.keys() {
        println!("cargo:rerun-if-env-changed=WPAN_AHI_{name}");
    }

    let mut data = String::new();

    for (var, value) in env::vars() {
        if let Some(name) = var.strip_prefix("WPAN_AHI_") {
            let Some((_, (ty, _))) = configs.remove_entry(name) else {
                panic!("Unknown configuration name WPAN_AHI_{name}");
            };

            writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
        }
    }

    for (name, (ty, value)) in configs.iter() {
        writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    std::fs::write(out_dir.join("config.rs"), data).unwrap();
}
