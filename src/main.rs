use dealflow::cli::run;
use dealflow::store::StoreError;

/// Store failures and failed setup steps (contexts starting with "Failed to")
fn is_internal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.downcast_ref::<StoreError>().is_some())
        || err.to_string().starts_with("Failed to")
}

fn main() {
    if let Err(e) = run() {
        if is_internal(&e) {
            eprintln!("Internal error: {}", e);
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                eprintln!("\nCaused by:");
                for (depth, cause) in causes.enumerate() {
                    eprintln!("{:indent$}  {}", "", cause, indent = depth + 1);
                }
            }
            std::process::exit(2);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
