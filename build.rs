fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `build_transport(false)` omits the generated `Client::connect` constructor,
    // which otherwise collides with the `Connect` RPC method (E0592). The wire
    // protocol and `Client::new` are unaffected.
    tonic_build::configure()
        .build_transport(false)
        .compile_protos(&["proto/delta.proto"], &["proto"])?;
    Ok(())
}
