fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/supply_planner.proto"); // Rerun if .proto file changes
    println!("cargo:rerun-if-env-changed=PROTOC");

    // Use a system protoc when one is configured, the vendored binary otherwise.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .build_server(true) // Generate server code
        .build_client(true) // Generate client code for callers of the service
        .compile(
            &["proto/supply_planner.proto"], // Path to .proto files relative to engine crate root
            &["proto"], // Include path for .proto files
        )?;
    Ok(())
}
