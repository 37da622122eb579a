use vergen::{BuildBuilder, Emitter};

// only VERGEN_BUILD_TIMESTAMP is read at startup
fn main() {
    let Ok(build) = BuildBuilder::default().build_timestamp(true).build() else {
        return;
    };
    if let Ok(emitter) = Emitter::default().add_instructions(&build) {
        let _ = emitter.emit();
    }
}
