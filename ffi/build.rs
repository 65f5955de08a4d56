fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("GEOIP_FFI_H")
        .generate();

    match result {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/include/geoip.h"));
        }
        Err(err) => println!("cargo:warning=skipping C header generation: {err}"),
    }
}
