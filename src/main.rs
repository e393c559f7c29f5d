#[tokio::main]
async fn main() -> std::process::ExitCode {
    oauth_bootstrap_lib::run().await
}
