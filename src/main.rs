#[tokio::main]
async fn main() -> std::process::ExitCode {
    match boosty_dl::app::run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            std::process::ExitCode::from(boosty_dl::app::exit_code(&err) as u8)
        }
    }
}
