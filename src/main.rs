use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match parapheur::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "Fatal server error");
            eprintln!("parapheur: {err}");
            ExitCode::FAILURE
        }
    }
}
