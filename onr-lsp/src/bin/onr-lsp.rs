use onr_lsp::{cli, OnrLanguageServer};
use std::process::ExitCode;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    match matches.subcommand() {
        Some(("format", sub)) => {
            let mut stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            match cli::run_format(sub, &mut stdin, &mut stdout) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("onr-lsp: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(("version", _)) => {
            println!("{}", cli::version_banner());
            ExitCode::SUCCESS
        }
        _ => {
            serve().await;
            ExitCode::SUCCESS
        }
    }
}

async fn serve() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(OnrLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
